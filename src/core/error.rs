//! Error taxonomy for grid building and diagnostics extraction.

use thiserror::Error;

use crate::solvers::FitError;

/// Errors surfaced by grid construction, projection, and extraction.
///
/// Every failure propagates to the caller; no variant is ever downgraded to
/// a default or placeholder value.
#[derive(Debug, Error)]
pub enum GridError {
    /// Malformed inputs: empty channel lists, non-numeric channels, ragged
    /// columns, empty tables.
    #[error("input error: {0}")]
    Input(String),

    /// Invariant violation: this epoch's time index differs from the
    /// previous epoch's.
    #[error("epoch {0} differs from the previous epoch in its time index")]
    EpochIndex(i64),

    /// Invariant violation: this time point's epoch index differs from the
    /// previous time point's.
    #[error("time {0} differs from the previous time point in its epoch index")]
    TimeIndex(i64),

    /// The formula references a column the table does not have.
    #[error("formula references column '{0}', which is not in the table")]
    MissingColumn(String),

    /// The formula string could not be parsed.
    #[error("formula error: {0}")]
    Formula(String),

    /// Attribute projection was invoked on a view that is not the full grid.
    #[error(
        "projection requires the full {expected_rows}x{expected_cols} grid, \
         got a {got_rows}x{got_cols} view"
    )]
    Shape {
        expected_rows: usize,
        expected_cols: usize,
        got_rows: usize,
        got_cols: usize,
    },

    /// The requested diagnostic is not in the registry.
    #[error("unknown diagnostic '{0}'")]
    UnknownDiagnostic(String),

    /// The diagnostic cannot be decomposed per grid cell.
    #[error("diagnostic '{0}' is not extractable per grid cell")]
    NotSupported(String),

    /// A loop-gated diagnostic was requested without enabling the
    /// leave-one-out refit loop.
    #[error("diagnostic '{0}' requires the leave-one-out refit loop; pass do_loo_loop = true")]
    LoopRequired(String),

    /// Extraction configuration that cannot be honored.
    #[error("config error: {0}")]
    Config(String),

    /// A per-cell regression failed. The whole build aborts; there is no
    /// partial grid.
    #[error("fit failed for channel '{channel}' at time {time}: {source}")]
    Fit {
        channel: String,
        time: i64,
        #[source]
        source: FitError,
    },

    /// The worker pool could not be constructed.
    #[error("worker pool error: {0}")]
    Pool(String),
}
