//! Shared test utilities and synthetic epoch generators.

use epochgrid::{Column, TrialTable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Seeded synthetic epochs table with the schema the grid builder expects:
/// a `continuous` predictor, a `categorical` predictor, and numeric
/// `channel0..channelN` response columns. Rectangular by construction; the
/// categorical level is tied to the epoch id so every time group sees every
/// level.
pub fn generate(
    n_epochs: usize,
    n_samples: usize,
    n_channels: usize,
    n_categories: usize,
    seed: u64,
) -> TrialTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0).expect("valid normal parameters");

    let n_rows = n_epochs * n_samples;
    let mut epochs = Vec::with_capacity(n_rows);
    let mut times = Vec::with_capacity(n_rows);
    let mut continuous = Vec::with_capacity(n_rows);
    let mut categorical = Vec::with_capacity(n_rows);
    let mut channels: Vec<Vec<f64>> = vec![Vec::with_capacity(n_rows); n_channels];

    for epoch in 0..n_epochs {
        for time in 0..n_samples {
            epochs.push(epoch as i64);
            times.push(time as i64);
            let x: f64 = noise.sample(&mut rng);
            continuous.push(x);
            let category = epoch % n_categories;
            categorical.push(format!("cat{category}"));
            for (c, channel) in channels.iter_mut().enumerate() {
                let signal = 2.0 * x + 0.5 * category as f64 + c as f64;
                channel.push(signal + noise.sample(&mut rng));
            }
        }
    }

    let mut table = TrialTable::new(epochs, times).expect("index lengths match");
    table
        .insert_column("continuous", Column::Numeric(continuous))
        .expect("fresh column");
    table
        .insert_column("categorical", Column::Categorical(categorical))
        .expect("fresh column");
    for (c, values) in channels.into_iter().enumerate() {
        table
            .insert_column(format!("channel{c}"), Column::Numeric(values))
            .expect("fresh column");
    }
    table
}

/// Deterministic table for closed-form checks: `continuous` equals the epoch
/// id, `categorical` alternates with it, and `channel0` follows
/// 1 + 2x + 0.5*[cat1], plus `bump` added at (epoch, time) = (n_epochs-1, 0).
pub fn deterministic(n_epochs: usize, n_samples: usize, bump: f64) -> TrialTable {
    let n_rows = n_epochs * n_samples;
    let mut epochs = Vec::with_capacity(n_rows);
    let mut times = Vec::with_capacity(n_rows);
    let mut continuous = Vec::with_capacity(n_rows);
    let mut categorical = Vec::with_capacity(n_rows);
    let mut channel0 = Vec::with_capacity(n_rows);

    for epoch in 0..n_epochs {
        for time in 0..n_samples {
            epochs.push(epoch as i64);
            times.push(time as i64);
            let x = epoch as f64;
            continuous.push(x);
            categorical.push(format!("cat{}", epoch % 2));
            let mut y = 1.0 + 2.0 * x + 0.5 * (epoch % 2) as f64;
            if epoch == n_epochs - 1 && time == 0 {
                y += bump;
            }
            channel0.push(y);
        }
    }

    let mut table = TrialTable::new(epochs, times).expect("index lengths match");
    table
        .insert_column("continuous", Column::Numeric(continuous))
        .expect("fresh column");
    table
        .insert_column("categorical", Column::Categorical(categorical))
        .expect("fresh column");
    table
        .insert_column("channel0", Column::Numeric(channel0))
        .expect("fresh column");
    table
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
