//! Regression diagnostics over fit grids.
//!
//! - **Registry**: a static table declaring, per diagnostic, whether and how
//!   it can be extracted per grid cell.
//! - **Influence**: per-fit measures (Cook's distance, DFFITS, studentized
//!   residuals, dfbetas).
//! - **Extraction**: walks the grid, assembles a long-format table, and
//!   optionally flags rows against a critical value.
//! - **VIF**: per-predictor multicollinearity, independent of any grid.

mod extract;
mod influence;
mod registry;
mod vif;

pub use extract::{get_diagnostic, CritVal, DiagnosticRow, DiagnosticsResult, Direction};
pub use influence::Influence;
pub use registry::{
    diagnostic_spec, list_diagnostics, Computability, DiagnosticSpec, ValueType, DIAGNOSTICS,
};
pub use vif::get_vifs;
