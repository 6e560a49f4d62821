//! Mass-univariate regression grids over epoched, multi-channel data.
//!
//! For every (time, channel) cell of an epoched recording, this library fits
//! an ordinary least squares model relating that channel's amplitude across
//! epochs to a declared set of predictors, and exposes the dense grid of
//! fits together with per-cell regression diagnostics (influence measures,
//! Cook's distance, DFFITS, variance inflation factors) and threshold-based
//! outlier flagging.
//!
//! # Example
//!
//! ```rust,ignore
//! use epochgrid::prelude::*;
//!
//! // epochs: a TrialTable with an (epoch, time) row index, predictor
//! // columns, and one numeric column per channel
//! let options = BuildOptions::builder().parallel(true).n_workers(4).build()?;
//! let grid = build_grid(&epochs, &["channel0", "channel1"],
//!                       "continuous + categorical", &options)?;
//!
//! // same-shaped scalar projection
//! let r2 = grid.scalar(FitAttr::RSquared);
//!
//! // influential epochs by Cook's distance
//! let (table, flagged) = get_diagnostic(
//!     &grid, "cooks_distance", Direction::Above, CritVal::Default, false)?;
//! ```

pub mod core;
pub mod diagnostics;
pub mod grid;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        BuildOptions, BuildOptionsBuilder, Column, ColumnSource, Design, Formula, GridError,
        Scout, TrialTable,
    };
    pub use crate::diagnostics::{
        diagnostic_spec, get_diagnostic, get_vifs, list_diagnostics, Computability, CritVal,
        DiagnosticRow, DiagnosticSpec, DiagnosticsResult, Direction, Influence, ValueType,
    };
    pub use crate::grid::{build_grid, FitAttr, FitGrid, GridArray, GridView};
    pub use crate::solvers::{fit_ols, FitError, OlsFit};
}

pub use crate::core::{BuildOptions, Column, Formula, GridError, TrialTable};
pub use crate::diagnostics::{get_diagnostic, get_vifs, list_diagnostics, CritVal, Direction};
pub use crate::grid::{build_grid, FitAttr, FitGrid};
