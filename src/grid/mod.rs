//! Grid construction: validate, plan, dispatch, assemble.

mod container;
mod dispatch;
pub(crate) mod parcel;
mod validate;

pub use container::{FitAttr, FitGrid, GridArray, GridView};

use log::{debug, info};

use crate::core::{BuildOptions, Formula, GridError, TrialTable};

/// Build a dense (times x channels) grid of OLS fits.
///
/// For every declared channel and every time point, the channel's amplitude
/// across epochs is regressed on the right-hand-side predictors. The final
/// channel order always matches the declaration order, independent of which
/// worker finishes first; a single failed cell aborts the whole build.
pub fn build_grid(
    table: &TrialTable,
    channels: &[&str],
    rhs: &str,
    options: &BuildOptions,
) -> Result<FitGrid, GridError> {
    let formula = Formula::parse(rhs)?;
    if formula.response().is_some() {
        return Err(GridError::Formula(
            "the right-hand side must not declare a response; channels are the responses".into(),
        ));
    }

    validate::validate(table, channels)?;

    let parcels = parcel::plan_parcels(table, channels, &formula)?;
    debug!(
        "planned {} parcels over columns {:?}",
        parcels.len(),
        formula.referenced_columns()
    );

    let results = dispatch::run(&parcels, options)?;

    let groups = table.sorted_time_groups();
    let times: Vec<i64> = groups.iter().map(|(time, _)| *time).collect();
    let epochs: Vec<i64> = match groups.first() {
        Some((_, rows)) => rows.iter().map(|&r| table.epochs()[r]).collect(),
        None => Vec::new(),
    };
    let term_names = formula.design(table)?.full_names();

    let grid = FitGrid::assemble(
        results,
        times,
        channels.iter().map(|&c| c.to_string()).collect(),
        epochs,
        term_names,
    )?;
    info!(
        "assembled fit grid: {} times x {} channels",
        grid.n_times(),
        grid.n_channels()
    );
    Ok(grid)
}
