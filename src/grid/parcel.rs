//! Per-channel work parcels.

use crate::core::{Formula, GridError, TrialTable};

/// One unit of fitting work: a channel, the column-projected table its
/// formula needs, and the formula with that channel as response. Created
/// once, consumed by exactly one worker.
#[derive(Debug, Clone)]
pub(crate) struct Parcel {
    pub channel: String,
    pub table: TrialTable,
    pub formula: Formula,
}

/// Build one parcel per declared channel. A scout dry run discovers the
/// minimal predictor projection so workers never receive unrelated channels;
/// unknown predictors surface here, before any copies are made.
pub(crate) fn plan_parcels(
    table: &TrialTable,
    channels: &[&str],
    rhs: &Formula,
) -> Result<Vec<Parcel>, GridError> {
    let referenced = rhs.referenced_columns();
    for name in &referenced {
        if table.column(name).is_none() {
            return Err(GridError::MissingColumn(name.clone()));
        }
    }

    channels
        .iter()
        .map(|&channel| {
            let mut keep = referenced.clone();
            keep.insert(channel.to_string());
            Ok(Parcel {
                channel: channel.to_string(),
                table: table.select(&keep)?,
                formula: rhs.with_response(channel),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;

    fn table() -> TrialTable {
        let mut table = TrialTable::new(vec![0, 0, 1, 1], vec![0, 1, 0, 1]).unwrap();
        for name in ["continuous", "ch0", "ch1"] {
            table
                .insert_column(name, Column::Numeric(vec![1.0, 2.0, 3.0, 4.0]))
                .unwrap();
        }
        table
    }

    #[test]
    fn parcels_carry_minimal_projection() {
        let rhs = Formula::parse("continuous").unwrap();
        let parcels = plan_parcels(&table(), &["ch0", "ch1"], &rhs).unwrap();

        assert_eq!(parcels.len(), 2);
        let first = &parcels[0];
        assert_eq!(first.channel, "ch0");
        assert_eq!(first.formula.response(), Some("ch0"));
        assert!(first.table.column("continuous").is_some());
        assert!(first.table.column("ch0").is_some());
        // the other channel never ships with this parcel
        assert!(first.table.column("ch1").is_none());
    }

    #[test]
    fn unknown_predictor_fails_before_copying() {
        let rhs = Formula::parse("continuous + ghost").unwrap();
        let err = plan_parcels(&table(), &["ch0"], &rhs).unwrap_err();
        assert!(matches!(err, GridError::MissingColumn(name) if name == "ghost"));
    }
}
