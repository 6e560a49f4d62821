//! Fan-out/fan-in execution of parcels.
//!
//! Parcels are read-only and non-overlapping, so workers share nothing but
//! the fan-in collection, which rayon's join semantics guard. Results are
//! re-associated with the declaring channel by position, never by completion
//! order. The first failed cell aborts the whole build: in-flight parcels
//! are awaited, no new ones start, and no partial grid escapes.

use faer::Col;
use log::debug;
use rayon::prelude::*;

use super::parcel::Parcel;
use crate::core::{BuildOptions, Column, GridError};
use crate::solvers::{fit_ols, OlsFit};

/// Fit one parcel: one regression per time group, ascending time order.
/// Each fit covers all epochs observed at that time.
pub(crate) fn fit_parcel(
    parcel: &Parcel,
    options: &BuildOptions,
) -> Result<Vec<OlsFit>, GridError> {
    let design = parcel.formula.design(&parcel.table)?;
    let response = match parcel.table.column(&parcel.channel) {
        Some(Column::Numeric(values)) => values,
        _ => {
            return Err(GridError::Input(format!(
                "channel '{}' is not a numeric column of its parcel",
                parcel.channel
            )))
        }
    };

    parcel
        .table
        .sorted_time_groups()
        .iter()
        .map(|(time, rows)| {
            let x = design.take_rows(rows);
            let y = Col::from_fn(rows.len(), |i| response[rows[i]]);
            fit_ols(&x, &y, design.intercept, options.confidence_level).map_err(|source| {
                GridError::Fit {
                    channel: parcel.channel.clone(),
                    time: *time,
                    source,
                }
            })
        })
        .collect()
}

/// Execute all parcels, returning per-channel fit sequences in the same
/// order the parcels were declared.
pub(crate) fn run(
    parcels: &[Parcel],
    options: &BuildOptions,
) -> Result<Vec<Vec<OlsFit>>, GridError> {
    if options.parallel && options.n_workers > 1 {
        debug!(
            "dispatching {} parcels across {} workers",
            parcels.len(),
            options.n_workers
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.n_workers)
            .build()
            .map_err(|e| GridError::Pool(e.to_string()))?;
        // collect reassembles results in declaration order regardless of
        // completion order, and collecting into Result fails fast on the
        // first broken cell
        pool.install(|| {
            parcels
                .par_iter()
                .map(|parcel| fit_parcel(parcel, options))
                .collect()
        })
    } else {
        debug!("dispatching {} parcels sequentially", parcels.len());
        parcels
            .iter()
            .map(|parcel| fit_parcel(parcel, options))
            .collect()
    }
}
