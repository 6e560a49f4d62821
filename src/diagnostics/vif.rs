//! Variance inflation factors for multicollinearity detection.
//!
//! VIF_j = 1 / (1 - R²_j), with R²_j from regressing design column j on all
//! the other design columns. Computed straight from a trial table and a
//! formula; no grid is involved.

use faer::{Col, Mat};

use crate::core::{Formula, GridError, TrialTable};
use crate::solvers::fit_ols;

/// Compute one VIF per design column of the formula's right-hand side.
pub fn get_vifs(table: &TrialTable, rhs: &str) -> Result<Vec<(String, f64)>, GridError> {
    let formula = Formula::parse(rhs)?;
    let design = formula.design(table)?;

    let n = design.x.nrows();
    let p = design.x.ncols();
    if p < 2 {
        return Err(GridError::Input(
            "VIF needs at least two predictor columns".into(),
        ));
    }

    let mut vifs = Vec::with_capacity(p);
    for j in 0..p {
        let x_other = Mat::from_fn(n, p - 1, |i, k| {
            let col = if k < j { k } else { k + 1 };
            design.x[(i, col)]
        });
        let y_j = Col::from_fn(n, |i| design.x[(i, j)]);

        let vif = match fit_ols(&x_other, &y_j, true, 0.95) {
            Ok(aux) => {
                if aux.r_squared < 1.0 - 1e-14 {
                    (1.0 / (1.0 - aux.r_squared)).max(1.0)
                } else {
                    f64::INFINITY
                }
            }
            // an unfittable auxiliary regression carries no collinearity
            // evidence for this column
            Err(_) => 1.0,
        };
        vifs.push((design.names[j].clone(), vif));
    }

    Ok(vifs)
}
