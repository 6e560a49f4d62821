//! Core data model: tables, formulas, options, and the error taxonomy.

pub mod error;
pub mod formula;
pub mod options;
pub mod table;

pub use error::GridError;
pub use formula::{ColumnSource, Design, Formula, Scout};
pub use options::{BuildOptions, BuildOptionsBuilder};
pub use table::{Column, TrialTable};
