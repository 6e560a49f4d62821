//! Per-cell ordinary least squares.
//!
//! One grid cell holds one [`OlsFit`]: the regression of a channel's
//! amplitudes across epochs on the design at a single time point. Solving
//! uses QR decomposition with column pivoting; a rank-deficient design is a
//! hard error so a bad cell aborts the whole build instead of silently
//! aliasing coefficients.

use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

const RANK_TOLERANCE: f64 = 1e-10;

/// Errors from a single cell's regression fit.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: {params} parameters need more than {params} rows, got {got}")]
    InsufficientObservations { params: usize, got: usize },

    #[error("design matrix is rank deficient: rank {rank} with {params} parameters")]
    RankDeficient { rank: usize, params: usize },

    #[error("numerical error: {0}")]
    Numerical(String),
}

/// The result of one regression at one grid cell.
///
/// Coefficients run over the full design columns, intercept first when the
/// formula keeps one.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Col<f64>,
    pub std_errors: Col<f64>,
    pub t_statistics: Col<f64>,
    pub p_values: Col<f64>,
    pub conf_lower: Col<f64>,
    pub conf_upper: Col<f64>,
    pub residuals: Col<f64>,
    pub fitted_values: Col<f64>,
    /// Diagonal of the hat matrix H = X(X'X)⁻¹X'.
    pub leverage: Col<f64>,
    /// Full design matrix, intercept column included.
    pub design: Mat<f64>,
    /// (X'X)⁻¹ over the full design.
    pub xtx_inverse: Mat<f64>,
    pub mse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub n_observations: usize,
    pub n_parameters: usize,
}

impl OlsFit {
    pub fn df_resid(&self) -> f64 {
        (self.n_observations - self.n_parameters) as f64
    }
}

/// Fit a least-squares regression of `y` on `x`, optionally with an
/// intercept column prepended to the design.
pub fn fit_ols(
    x: &Mat<f64>,
    y: &Col<f64>,
    intercept: bool,
    confidence_level: f64,
) -> Result<OlsFit, FitError> {
    let n = x.nrows();
    if n != y.nrows() {
        return Err(FitError::DimensionMismatch {
            x_rows: n,
            y_len: y.nrows(),
        });
    }

    let p = x.ncols() + usize::from(intercept);
    let design = if intercept {
        Mat::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { x[(i, j - 1)] })
    } else {
        x.to_owned()
    };

    // need at least one residual degree of freedom
    if n <= p {
        return Err(FitError::InsufficientObservations { params: p, got: n });
    }

    let coefficients = solve_with_qr(&design, y)?;

    let mut fitted_values = Col::zeros(n);
    let mut residuals = Col::zeros(n);
    for i in 0..n {
        let mut pred = 0.0;
        for j in 0..p {
            pred += design[(i, j)] * coefficients[j];
        }
        fitted_values[i] = pred;
        residuals[i] = y[i] - pred;
    }

    let y_mean: f64 = y.iter().sum::<f64>() / n as f64;
    let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
    let rss: f64 = residuals.iter().map(|&r| r.powi(2)).sum();

    let r_squared = if tss > 0.0 {
        (1.0 - rss / tss).clamp(0.0, 1.0)
    } else if rss < 1e-10 {
        1.0
    } else {
        0.0
    };
    let df_total = (n - 1) as f64;
    let df_resid = (n - p) as f64;
    let adj_r_squared = if df_total > 0.0 {
        1.0 - (1.0 - r_squared) * df_total / df_resid
    } else {
        f64::NAN
    };
    let mse = rss / df_resid;
    let rmse = mse.sqrt();

    let xtx = design.transpose() * design.as_ref();
    let xtx_inverse = compute_xtx_inverse(&xtx);

    let leverage = Col::from_fn(n, |i| {
        let row: Vec<f64> = (0..p).map(|j| design[(i, j)]).collect();
        single_leverage(&row, &xtx_inverse)
    });

    let mut std_errors = Col::zeros(p);
    for j in 0..p {
        let var = mse * xtx_inverse[(j, j)];
        std_errors[j] = if var >= 0.0 { var.sqrt() } else { f64::NAN };
    }

    let t_statistics = Col::from_fn(p, |j| {
        if std_errors[j].is_nan() || std_errors[j] == 0.0 {
            f64::NAN
        } else {
            coefficients[j] / std_errors[j]
        }
    });

    let t_dist = StudentsT::new(0.0, 1.0, df_resid).expect("valid t-distribution parameters");
    let p_values = Col::from_fn(p, |j| {
        if t_statistics[j].is_nan() {
            f64::NAN
        } else {
            2.0 * (1.0 - t_dist.cdf(t_statistics[j].abs()))
        }
    });

    let alpha = 1.0 - confidence_level;
    let t_crit = t_dist.inverse_cdf(1.0 - alpha / 2.0);
    let mut conf_lower = Col::zeros(p);
    let mut conf_upper = Col::zeros(p);
    for j in 0..p {
        if std_errors[j].is_nan() {
            conf_lower[j] = f64::NAN;
            conf_upper[j] = f64::NAN;
        } else {
            let margin = t_crit * std_errors[j];
            conf_lower[j] = coefficients[j] - margin;
            conf_upper[j] = coefficients[j] + margin;
        }
    }

    Ok(OlsFit {
        coefficients,
        std_errors,
        t_statistics,
        p_values,
        conf_lower,
        conf_upper,
        residuals,
        fitted_values,
        leverage,
        design,
        xtx_inverse,
        mse,
        rmse,
        r_squared,
        adj_r_squared,
        n_observations: n,
        n_parameters: p,
    })
}

/// Solve the least-squares problem via column-pivoted QR. Errors out when
/// the numerical rank falls short of the column count.
fn solve_with_qr(design: &Mat<f64>, y: &Col<f64>) -> Result<Col<f64>, FitError> {
    let n = design.nrows();
    let p = design.ncols();

    let qr = design.col_piv_qr();
    let q = qr.compute_q();
    let r = qr.compute_thin_r();
    let perm = qr.col_permutation();

    // arrays() is (forward, inverse); mapping each original column j to the
    // pivoted slot holding its coefficient needs the inverse
    let perm_inv = perm.arrays().1;

    let mut rank = 0;
    for i in 0..p.min(n) {
        if r[(i, i)].abs() > RANK_TOLERANCE {
            rank += 1;
        } else {
            break;
        }
    }
    if rank < p {
        return Err(FitError::RankDeficient { rank, params: p });
    }

    // back-substitution for R * beta_perm = Q' * y
    let qty = q.transpose() * y;
    let mut beta_perm = Col::zeros(p);
    for i in (0..p).rev() {
        let mut sum = qty[i];
        for j in (i + 1)..p {
            sum -= r[(i, j)] * beta_perm[j];
        }
        beta_perm[i] = sum / r[(i, i)];
    }

    Ok(Col::from_fn(p, |j| beta_perm[perm_inv[j]]))
}

/// Compute (X'X)⁻¹ using QR decomposition with back-substitution.
fn compute_xtx_inverse(xtx: &Mat<f64>) -> Mat<f64> {
    let p = xtx.nrows();
    let qr = xtx.qr();
    let q = qr.compute_q();
    let r = qr.compute_r();
    let qt = q.transpose().to_owned();

    let mut inv = Mat::zeros(p, p);
    for col in 0..p {
        let solution = solve_triangular_column(&r, &qt, col, p);
        for row in 0..p {
            inv[(row, col)] = solution[row];
        }
    }
    inv
}

fn solve_triangular_column(r: &Mat<f64>, qt: &Mat<f64>, col: usize, p: usize) -> Vec<f64> {
    let mut solution = vec![0.0; p];
    for i in (0..p).rev() {
        if r[(i, i)].abs() < 1e-14 {
            continue;
        }
        let mut sum = qt[(i, col)];
        for j in (i + 1)..p {
            sum -= r[(i, j)] * solution[j];
        }
        solution[i] = sum / r[(i, i)];
    }
    solution
}

fn single_leverage(design_row: &[f64], xtx_inv: &Mat<f64>) -> f64 {
    let p = design_row.len();
    let mut h_ii = 0.0;
    for j in 0..p {
        for k in 0..p {
            h_ii += design_row[j] * xtx_inv[(j, k)] * design_row[k];
        }
    }
    h_ii.clamp(0.0, 1.0)
}
