//! Grid construction integration tests: validation, ordering, shape safety.

mod common;

use epochgrid::prelude::*;

fn sequential() -> BuildOptions {
    BuildOptions::default()
}

fn parallel(n_workers: usize) -> BuildOptions {
    BuildOptions::builder()
        .parallel(true)
        .n_workers(n_workers)
        .build()
        .expect("valid options")
}

// ============================================================================
// Build + validation
// ============================================================================

#[test]
fn build_produces_dense_time_by_channel_grid() {
    common::init_logging();
    let epochs = common::generate(10, 5, 2, 2, 7);
    let grid = build_grid(
        &epochs,
        &["channel0", "channel1"],
        "continuous + categorical",
        &sequential(),
    )
    .expect("build should succeed");

    assert_eq!(grid.shape(), (5, 2));
    assert_eq!(grid.times(), &[0, 1, 2, 3, 4]);
    assert_eq!(grid.channels(), &["channel0".to_string(), "channel1".to_string()]);
    assert_eq!(grid.epochs().len(), 10);
    assert_eq!(
        grid.term_names(),
        &[
            "(Intercept)".to_string(),
            "continuous".to_string(),
            "categorical[cat1]".to_string()
        ]
    );
    for t in 0..5 {
        for c in 0..2 {
            let fit = grid.cell(t, c);
            assert_eq!(fit.n_observations, 10);
            assert_eq!(fit.n_parameters, 3);
        }
    }
}

#[test]
fn epoch_with_divergent_time_index_is_named() {
    let mut table = TrialTable::new(vec![0, 0, 1, 1], vec![0, 1, 0, 2]).unwrap();
    table
        .insert_column("x", Column::Numeric(vec![0.0, 1.0, 2.0, 3.0]))
        .unwrap();
    table
        .insert_column("channel0", Column::Numeric(vec![0.0, 1.0, 2.0, 3.0]))
        .unwrap();

    let err = build_grid(&table, &["channel0"], "x", &sequential()).unwrap_err();
    assert!(matches!(err, GridError::EpochIndex(1)));
}

#[test]
fn time_with_divergent_epoch_index_is_named() {
    // each epoch sees times [0, 1], but the epoch order flips at time 1
    let mut table = TrialTable::new(vec![0, 1, 1, 0], vec![0, 0, 1, 1]).unwrap();
    table
        .insert_column("x", Column::Numeric(vec![0.0, 1.0, 2.0, 3.0]))
        .unwrap();
    table
        .insert_column("channel0", Column::Numeric(vec![0.0, 1.0, 2.0, 3.0]))
        .unwrap();

    let err = build_grid(&table, &["channel0"], "x", &sequential()).unwrap_err();
    assert!(matches!(err, GridError::TimeIndex(1)));
}

#[test]
fn empty_and_unknown_channel_lists_are_input_errors() {
    let epochs = common::generate(6, 2, 1, 2, 0);
    assert!(matches!(
        build_grid(&epochs, &[], "continuous", &sequential()).unwrap_err(),
        GridError::Input(_)
    ));
    assert!(matches!(
        build_grid(&epochs, &["ghost"], "continuous", &sequential()).unwrap_err(),
        GridError::Input(_)
    ));
    assert!(matches!(
        build_grid(&epochs, &["categorical"], "continuous", &sequential()).unwrap_err(),
        GridError::Input(_)
    ));
}

#[test]
fn missing_predictor_is_reported_by_name() {
    let epochs = common::generate(6, 2, 1, 2, 0);
    let err = build_grid(&epochs, &["channel0"], "continuous + ghost", &sequential())
        .unwrap_err();
    assert!(matches!(err, GridError::MissingColumn(name) if name == "ghost"));
}

#[test]
fn response_in_rhs_is_a_formula_error() {
    let epochs = common::generate(6, 2, 1, 2, 0);
    let err = build_grid(&epochs, &["channel0"], "channel0 ~ continuous", &sequential())
        .unwrap_err();
    assert!(matches!(err, GridError::Formula(_)));
}

#[test]
fn rank_deficient_cell_aborts_the_build_with_identity() {
    let mut table = TrialTable::new(
        vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4],
        vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
    )
    .unwrap();
    let x: Vec<f64> = (0..10).map(|i| (i / 2) as f64).collect();
    let doubled: Vec<f64> = x.iter().map(|v| 2.0 * v).collect();
    let y: Vec<f64> = x.iter().map(|v| 1.0 + v).collect();
    table.insert_column("x", Column::Numeric(x)).unwrap();
    table.insert_column("x2", Column::Numeric(doubled)).unwrap();
    table.insert_column("channel0", Column::Numeric(y)).unwrap();

    let err = build_grid(&table, &["channel0"], "x + x2", &sequential()).unwrap_err();
    match err {
        GridError::Fit {
            channel,
            time,
            source,
        } => {
            assert_eq!(channel, "channel0");
            assert_eq!(time, 0);
            assert!(matches!(source, FitError::RankDeficient { .. }));
        }
        other => panic!("expected a fit error, got {other:?}"),
    }
}

// ============================================================================
// Ordering guarantees
// ============================================================================

#[test]
fn channel_order_follows_declaration_not_completion() {
    let epochs = common::generate(10, 4, 2, 2, 11);

    let forward = build_grid(
        &epochs,
        &["channel0", "channel1"],
        "continuous + categorical",
        &sequential(),
    )
    .unwrap();
    let reversed = build_grid(
        &epochs,
        &["channel1", "channel0"],
        "continuous + categorical",
        &parallel(4),
    )
    .unwrap();

    assert_eq!(forward.channels()[0], "channel0");
    assert_eq!(reversed.channels()[1], "channel0");

    for t in 0..forward.n_times() {
        let a = forward.cell(t, 0);
        let b = reversed.cell(t, 1);
        for j in 0..a.coefficients.nrows() {
            assert_eq!(a.coefficients[j], b.coefficients[j]);
        }
    }
}

#[test]
fn parallel_and_sequential_builds_are_identical() {
    let epochs = common::generate(12, 3, 2, 2, 23);

    let seq = build_grid(
        &epochs,
        &["channel0", "channel1"],
        "continuous + categorical",
        &sequential(),
    )
    .unwrap();
    let par = build_grid(
        &epochs,
        &["channel0", "channel1"],
        "continuous + categorical",
        &parallel(3),
    )
    .unwrap();

    let seq_mse = seq.scalar(FitAttr::Mse);
    let par_mse = par.scalar(FitAttr::Mse);
    for t in 0..seq.n_times() {
        for c in 0..seq.n_channels() {
            assert_eq!(seq_mse[(t, c)], par_mse[(t, c)]);
        }
    }
}

// ============================================================================
// Projection contract
// ============================================================================

#[test]
fn full_grid_projection_keeps_the_grid_shape() {
    let epochs = common::generate(10, 5, 2, 2, 3);
    let grid = build_grid(
        &epochs,
        &["channel0", "channel1"],
        "continuous + categorical",
        &sequential(),
    )
    .unwrap();

    let r2 = grid.scalar(FitAttr::RSquared);
    assert_eq!((r2.nrows(), r2.ncols()), (5, 2));

    let residuals = grid.project(|fit| fit.residuals.clone());
    assert_eq!(residuals.shape(), (5, 2));
    assert_eq!(residuals.get(4, 1).nrows(), 10);

    // the full view behaves like the grid itself
    let via_view = grid.view().scalar(FitAttr::RSquared).unwrap();
    assert_eq!(via_view[(0, 0)], r2[(0, 0)]);
}

#[test]
fn slice_projection_is_refused_with_a_shape_error() {
    let epochs = common::generate(10, 5, 2, 2, 3);
    let grid = build_grid(
        &epochs,
        &["channel0", "channel1"],
        "continuous + categorical",
        &sequential(),
    )
    .unwrap();

    for view in [grid.row(0), grid.column(1)] {
        match view.scalar(FitAttr::Mse) {
            Err(GridError::Shape {
                expected_rows,
                expected_cols,
                ..
            }) => {
                assert_eq!((expected_rows, expected_cols), (5, 2));
            }
            other => panic!("expected a shape error, got {other:?}"),
        }
    }
    assert!(grid.row(2).project(|fit| fit.mse).is_err());
}

// ============================================================================
// Numerical ground truth
// ============================================================================

#[test]
fn noiseless_cells_recover_exact_coefficients() {
    use approx::assert_relative_eq;

    // channel0 = 1 + 2x + 0.5*[cat1] exactly, no bump
    let table = common::deterministic(10, 3, 0.0);
    let grid = build_grid(
        &table,
        &["channel0"],
        "continuous + categorical",
        &sequential(),
    )
    .unwrap();

    for t in 0..grid.n_times() {
        let fit = grid.cell(t, 0);
        assert_relative_eq!(fit.coefficients[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 1e-8);
        assert_relative_eq!(fit.coefficients[2], 0.5, epsilon = 1e-8);
    }
}

#[test]
fn mixed_scale_predictors_keep_their_coefficients() {
    use approx::assert_relative_eq;

    // channel0 = 3 + 7*small - 0.5*large; the predictors' norms differ by
    // four orders of magnitude, so the per-cell QR pivots the design
    let n_epochs = 10;
    let n_samples = 2;
    let n_rows = n_epochs * n_samples;
    let mut epochs = Vec::with_capacity(n_rows);
    let mut times = Vec::with_capacity(n_rows);
    let mut small = Vec::with_capacity(n_rows);
    let mut large = Vec::with_capacity(n_rows);
    let mut channel0 = Vec::with_capacity(n_rows);
    for epoch in 0..n_epochs {
        for time in 0..n_samples {
            epochs.push(epoch as i64);
            times.push(time as i64);
            let s = 0.01 * ((epoch % 5) as f64 + 0.3);
            let l = 100.0 * (epoch as f64 + 1.0);
            small.push(s);
            large.push(l);
            channel0.push(3.0 + 7.0 * s - 0.5 * l);
        }
    }
    let mut table = TrialTable::new(epochs, times).unwrap();
    table.insert_column("small", Column::Numeric(small)).unwrap();
    table.insert_column("large", Column::Numeric(large)).unwrap();
    table
        .insert_column("channel0", Column::Numeric(channel0))
        .unwrap();

    let grid = build_grid(&table, &["channel0"], "small + large", &sequential()).unwrap();

    assert_eq!(
        grid.term_names(),
        &[
            "(Intercept)".to_string(),
            "small".to_string(),
            "large".to_string()
        ]
    );
    for t in 0..grid.n_times() {
        let fit = grid.cell(t, 0);
        assert_relative_eq!(fit.coefficients[0], 3.0, epsilon = 1e-8);
        assert_relative_eq!(fit.coefficients[1], 7.0, epsilon = 1e-8);
        assert_relative_eq!(fit.coefficients[2], -0.5, epsilon = 1e-8);
    }
}
