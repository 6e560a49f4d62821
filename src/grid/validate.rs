//! Structural validation of trial tables before any fitting begins.
//!
//! A dense grid needs a rectangular table: every epoch must carry the same
//! ordered time index (Invariant A) and every time point the same ordered
//! epoch index (Invariant B). Both are checked; A alone cannot catch an
//! epoch index whose ordering drifts between time points.

use crate::core::{Column, GridError, TrialTable};

pub(crate) fn validate(table: &TrialTable, channels: &[&str]) -> Result<(), GridError> {
    if table.n_rows() == 0 {
        return Err(GridError::Input("trial table has no rows".into()));
    }
    if channels.is_empty() {
        return Err(GridError::Input("channel list is empty".into()));
    }
    for &channel in channels {
        match table.column(channel) {
            None => {
                return Err(GridError::Input(format!(
                    "channel '{channel}' is not a column of the table"
                )))
            }
            Some(Column::Categorical(_)) => {
                return Err(GridError::Input(format!(
                    "channel '{channel}' must be a numeric column"
                )))
            }
            Some(Column::Numeric(_)) => {}
        }
    }

    // Invariant A: every epoch carries the same ordered time index
    if let Some(epoch) = first_index_mismatch(&table.group_rows_by_epoch(), table.times()) {
        return Err(GridError::EpochIndex(epoch));
    }

    // Invariant B: every time point carries the same ordered epoch index
    if let Some(time) = first_index_mismatch(&table.group_rows_by_time(), table.epochs()) {
        return Err(GridError::TimeIndex(time));
    }

    Ok(())
}

/// Compare each group's index values against the immediately preceding
/// group's; by transitivity one linear pass covers all pairs. Returns the
/// key of the first group that differs.
fn first_index_mismatch(groups: &[(i64, Vec<usize>)], index: &[i64]) -> Option<i64> {
    let mut prev: Option<&[usize]> = None;
    for (key, rows) in groups {
        if let Some(prev_rows) = prev {
            let matches = prev_rows.len() == rows.len()
                && prev_rows
                    .iter()
                    .zip(rows.iter())
                    .all(|(&a, &b)| index[a] == index[b]);
            if !matches {
                return Some(*key);
            }
        }
        prev = Some(rows);
    }
    None
}
