//! Generic diagnostic extraction with threshold flagging.
//!
//! Extraction walks every grid cell, computes the requested influence
//! measure, and assembles a long-format table indexed by
//! (time, epoch, channel[, param]). The registry gates what may be
//! extracted: an unsupported diagnostic or a loop-gated one without the
//! loop flag fails loudly instead of returning a placeholder value.

use faer::{Col, Mat};
use log::debug;

use super::influence::Influence;
use super::registry::{diagnostic_spec, Computability};
use crate::core::GridError;
use crate::grid::FitGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Above,
    Below,
}

/// Critical-value policy for flagging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CritVal {
    /// No flagging; every row is returned unflagged.
    None,
    /// The statistics collaborator's recommended cutoff for this diagnostic.
    Default,
    Value(f64),
}

/// One row of the extracted long table.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticRow {
    pub time: i64,
    pub epoch: i64,
    pub channel: String,
    /// Design column name, present only for per-parameter diagnostics.
    pub param: Option<String>,
    pub value: f64,
}

/// Extracted values plus the metadata needed to interpret them.
#[derive(Debug)]
pub struct DiagnosticsResult {
    pub diagnostic: String,
    pub index_levels: Vec<&'static str>,
    /// The resolved critical value, if flagging was requested.
    pub crit_val: Option<f64>,
    /// Rows ordered by (time, epoch, channel[, param]).
    pub rows: Vec<DiagnosticRow>,
}

enum CellValues {
    PerObs(Col<f64>),
    PerParam(Mat<f64>),
}

/// Extract one diagnostic from every grid cell.
///
/// Returns the long table plus the indices of rows whose value lies
/// `direction` of the resolved critical value.
pub fn get_diagnostic(
    grid: &FitGrid,
    diagnostic: &str,
    direction: Direction,
    crit_val: CritVal,
    do_loo_loop: bool,
) -> Result<(DiagnosticsResult, Vec<usize>), GridError> {
    let spec = diagnostic_spec(diagnostic)
        .ok_or_else(|| GridError::UnknownDiagnostic(diagnostic.to_string()))?;

    match spec.computability {
        Computability::NotExtractable => {
            return Err(GridError::NotSupported(diagnostic.to_string()))
        }
        Computability::PerObservationLoop if !do_loo_loop => {
            return Err(GridError::LoopRequired(diagnostic.to_string()))
        }
        _ => {}
    }

    let (n_times, n_channels) = grid.shape();

    // per-cell extraction, cell order (time, channel)
    let mut values: Vec<CellValues> = Vec::with_capacity(n_times * n_channels);
    for t in 0..n_times {
        for c in 0..n_channels {
            let infl = Influence::new(grid.cell(t, c));
            // the tuple-valued diagnostics return (values, cutoff); only the
            // value component lands in the table
            let cell = match spec.name {
                "cooks_distance" => CellValues::PerObs(infl.cooks_distance().0),
                "dffits_internal" => CellValues::PerObs(infl.dffits_internal().0),
                "dffits" => CellValues::PerObs(infl.dffits()),
                "cov_ratio" => CellValues::PerObs(infl.cov_ratio()),
                "hat_matrix_diag" => CellValues::PerObs(infl.hat_matrix_diag()),
                "resid_press" => CellValues::PerObs(infl.resid_press()),
                "resid_std" => CellValues::PerObs(infl.resid_std()),
                "resid_studentized_external" => {
                    CellValues::PerObs(infl.resid_studentized_external())
                }
                "resid_studentized_internal" => {
                    CellValues::PerObs(infl.resid_studentized_internal())
                }
                "resid_var" => CellValues::PerObs(infl.resid_var()),
                "dfbeta" => CellValues::PerParam(infl.dfbeta()),
                "dfbetas" => CellValues::PerParam(infl.dfbetas()),
                other => return Err(GridError::NotSupported(other.to_string())),
            };
            values.push(cell);
        }
    }

    let crit = match crit_val {
        CritVal::None => None,
        CritVal::Value(v) => Some(v),
        CritVal::Default => {
            let f = spec.default_crit.ok_or_else(|| {
                GridError::Config(format!(
                    "diagnostic '{}' has no collaborator-default cutoff",
                    spec.name
                ))
            })?;
            let first = grid.cell(0, 0);
            Some(f(first.n_observations, first.n_parameters))
        }
    };
    debug!(
        "extracting '{}' over {}x{} grid, crit={:?}",
        spec.name, n_times, n_channels, crit
    );

    let mut rows: Vec<DiagnosticRow> = Vec::new();
    let mut flagged: Vec<usize> = Vec::new();
    let mut push = |rows: &mut Vec<DiagnosticRow>, row: DiagnosticRow| {
        if let Some(cv) = crit {
            let hit = match direction {
                Direction::Above => row.value > cv,
                Direction::Below => row.value < cv,
            };
            if hit {
                flagged.push(rows.len());
            }
        }
        rows.push(row);
    };

    for t in 0..n_times {
        for (i, &epoch) in grid.epochs().iter().enumerate() {
            for c in 0..n_channels {
                let channel = grid.channels()[c].clone();
                match &values[t * n_channels + c] {
                    CellValues::PerObs(col) => push(
                        &mut rows,
                        DiagnosticRow {
                            time: grid.times()[t],
                            epoch,
                            channel,
                            param: None,
                            value: col[i],
                        },
                    ),
                    CellValues::PerParam(mat) => {
                        for (j, name) in grid.term_names().iter().enumerate() {
                            push(
                                &mut rows,
                                DiagnosticRow {
                                    time: grid.times()[t],
                                    epoch,
                                    channel: channel.clone(),
                                    param: Some(name.clone()),
                                    value: mat[(i, j)],
                                },
                            );
                        }
                    }
                }
            }
        }
    }

    Ok((
        DiagnosticsResult {
            diagnostic: spec.name.to_string(),
            index_levels: spec.index_levels.to_vec(),
            crit_val: crit,
            rows,
        },
        flagged,
    ))
}
