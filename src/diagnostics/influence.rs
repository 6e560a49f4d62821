//! Per-fit influence measures.
//!
//! All leave-one-out quantities use the exact rank-one update
//! RSS₍ᵢ₎ = RSS − eᵢ²/(1 − hᵢᵢ), so no literal refit is performed even for
//! the loop-gated diagnostics; the gate exists because the non-loop value
//! for those quantities would be a wrong number, and the extraction contract
//! is to fail rather than return one.

use faer::{Col, Mat};

use crate::solvers::OlsFit;

const MIN_ONE_MINUS_H: f64 = 1e-14;

/// Influence-measure access for one cell's fit.
pub struct Influence<'a> {
    fit: &'a OlsFit,
}

impl<'a> Influence<'a> {
    pub fn new(fit: &'a OlsFit) -> Self {
        Self { fit }
    }

    fn n(&self) -> usize {
        self.fit.n_observations
    }

    fn p(&self) -> usize {
        self.fit.n_parameters
    }

    /// Diagonal of the hat matrix.
    pub fn hat_matrix_diag(&self) -> Col<f64> {
        self.fit.leverage.clone()
    }

    /// PRESS (prediction) residuals: e_i / (1 - h_ii).
    pub fn resid_press(&self) -> Col<f64> {
        Col::from_fn(self.n(), |i| {
            self.fit.residuals[i] / (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H)
        })
    }

    /// Residuals scaled by the residual standard error: e_i / s.
    pub fn resid_std(&self) -> Col<f64> {
        let mse = self.fit.mse;
        if mse <= 0.0 || !mse.is_finite() {
            return Col::from_fn(self.n(), |_| f64::NAN);
        }
        let s = mse.sqrt();
        Col::from_fn(self.n(), |i| self.fit.residuals[i] / s)
    }

    /// Per-observation residual variance: mse * (1 - h_ii).
    pub fn resid_var(&self) -> Col<f64> {
        Col::from_fn(self.n(), |i| self.fit.mse * (1.0 - self.fit.leverage[i]))
    }

    /// Internally studentized residuals: e_i / (s * sqrt(1 - h_ii)).
    pub fn resid_studentized_internal(&self) -> Col<f64> {
        let mse = self.fit.mse;
        if mse <= 0.0 || !mse.is_finite() {
            return Col::from_fn(self.n(), |_| f64::NAN);
        }
        let s = mse.sqrt();
        Col::from_fn(self.n(), |i| {
            let denom = s * (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H).sqrt();
            self.fit.residuals[i] / denom
        })
    }

    /// Externally studentized residuals: e_i / (s₍ᵢ₎ * sqrt(1 - h_ii)).
    pub fn resid_studentized_external(&self) -> Col<f64> {
        let mse_loo = self.mse_loo();
        Col::from_fn(self.n(), |i| {
            let one_minus_h = (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H);
            if mse_loo[i] <= 0.0 || !mse_loo[i].is_finite() {
                return f64::NAN;
            }
            self.fit.residuals[i] / (mse_loo[i].sqrt() * one_minus_h.sqrt())
        })
    }

    /// Cook's distance, paired with the conventional 4/n cutoff.
    ///
    /// D_i = (e_i² / (p * MSE)) * (h_ii / (1 - h_ii)²)
    pub fn cooks_distance(&self) -> (Col<f64>, f64) {
        let n = self.n();
        let p = self.p();
        let mse = self.fit.mse;
        let values = if mse <= 0.0 || !mse.is_finite() {
            Col::from_fn(n, |_| f64::NAN)
        } else {
            Col::from_fn(n, |i| {
                let e_i = self.fit.residuals[i];
                let h_ii = self.fit.leverage[i];
                let one_minus_h = (1.0 - h_ii).max(MIN_ONE_MINUS_H);
                let d_i =
                    (e_i * e_i / (p as f64 * mse)) * (h_ii / (one_minus_h * one_minus_h));
                if d_i.is_finite() {
                    d_i.max(0.0)
                } else {
                    f64::NAN
                }
            })
        };
        (values, 4.0 / n as f64)
    }

    /// Internally studentized DFFITS, paired with the 2*sqrt(p/n) cutoff.
    ///
    /// DFFITS_internal_i = r_i * sqrt(h_ii / (1 - h_ii)) with r_i the
    /// internally studentized residual.
    pub fn dffits_internal(&self) -> (Col<f64>, f64) {
        let n = self.n();
        let p = self.p();
        let r = self.resid_studentized_internal();
        let values = Col::from_fn(n, |i| {
            let one_minus_h = (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H);
            r[i] * (self.fit.leverage[i] / one_minus_h).sqrt()
        });
        (values, 2.0 * (p as f64 / n as f64).sqrt())
    }

    /// Externally studentized DFFITS: r*_i * sqrt(h_ii / (1 - h_ii)).
    pub fn dffits(&self) -> Col<f64> {
        let r_star = self.resid_studentized_external();
        Col::from_fn(self.n(), |i| {
            let one_minus_h = (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H);
            r_star[i] * (self.fit.leverage[i] / one_minus_h).sqrt()
        })
    }

    /// Covariance ratio: (MSE₍ᵢ₎ / MSE)^p / (1 - h_ii).
    pub fn cov_ratio(&self) -> Col<f64> {
        let mse = self.fit.mse;
        let mse_loo = self.mse_loo();
        let p = self.p() as i32;
        Col::from_fn(self.n(), |i| {
            if mse <= 0.0 || mse_loo[i] <= 0.0 || !mse_loo[i].is_finite() {
                return f64::NAN;
            }
            let one_minus_h = (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H);
            (mse_loo[i] / mse).powi(p) / one_minus_h
        })
    }

    /// Coefficient change when observation i is deleted, one row per
    /// observation, one column per design column:
    /// dfbeta_i = (X'X)⁻¹ x_i e_i / (1 - h_ii).
    pub fn dfbeta(&self) -> Mat<f64> {
        let n = self.n();
        let p = self.p();
        Mat::from_fn(n, p, |i, j| {
            let mut v = 0.0;
            for k in 0..p {
                v += self.fit.xtx_inverse[(j, k)] * self.fit.design[(i, k)];
            }
            let one_minus_h = (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H);
            v * self.fit.residuals[i] / one_minus_h
        })
    }

    /// dfbeta scaled by the leave-one-out coefficient standard errors:
    /// dfbetas_ij = dfbeta_ij / (s₍ᵢ₎ * sqrt((X'X)⁻¹_jj)).
    pub fn dfbetas(&self) -> Mat<f64> {
        let raw = self.dfbeta();
        let mse_loo = self.mse_loo();
        Mat::from_fn(self.n(), self.p(), |i, j| {
            let scale = mse_loo[i].sqrt() * self.fit.xtx_inverse[(j, j)].max(0.0).sqrt();
            if scale > 0.0 && scale.is_finite() {
                raw[(i, j)] / scale
            } else {
                f64::NAN
            }
        })
    }

    /// Leave-one-out residual mean square per observation.
    fn mse_loo(&self) -> Col<f64> {
        let n = self.n();
        let df_resid = n - self.p();
        let mse = self.fit.mse;
        if df_resid <= 1 || mse <= 0.0 || !mse.is_finite() {
            return Col::from_fn(n, |_| f64::NAN);
        }
        let rss = mse * df_resid as f64;
        let df_loo = (df_resid - 1) as f64;
        Col::from_fn(n, |i| {
            let e_i = self.fit.residuals[i];
            let one_minus_h = (1.0 - self.fit.leverage[i]).max(MIN_ONE_MINUS_H);
            let rss_loo = rss - e_i * e_i / one_minus_h;
            if rss_loo <= 0.0 {
                return f64::NAN;
            }
            rss_loo / df_loo
        })
    }
}
