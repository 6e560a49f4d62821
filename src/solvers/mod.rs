//! Least-squares solving for grid cells.

mod ols;

pub use ols::{fit_ols, FitError, OlsFit};
