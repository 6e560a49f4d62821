//! Model formulas and design-matrix construction.
//!
//! A [`Formula`] is an optional response, a `+`-separated list of predictor
//! terms, and an intercept switch (`1` keeps it, `0` or `-1` drops it).
//! Categorical terms expand to treatment-coded dummy columns named
//! `term[level]`, with the first sorted level as the reference.
//!
//! Column discovery uses a dry design build against a [`Scout`]: a stand-in
//! [`ColumnSource`] that records every name the build requests and answers
//! with an empty numeric column, so the build completes without real data.

use std::cell::RefCell;
use std::collections::BTreeSet;

use faer::Mat;

use crate::core::error::GridError;
use crate::core::table::{Column, TrialTable};

/// Anything that can answer column lookups during design-matrix construction.
pub trait ColumnSource {
    /// Number of rows a materialized design would have.
    fn rows(&self) -> usize;

    /// Resolve one column by name.
    fn lookup(&self, name: &str) -> Result<&Column, GridError>;
}

impl ColumnSource for TrialTable {
    fn rows(&self) -> usize {
        self.n_rows()
    }

    fn lookup(&self, name: &str) -> Result<&Column, GridError> {
        self.column(name)
            .ok_or_else(|| GridError::MissingColumn(name.to_string()))
    }
}

/// Records requested column names and answers with an empty placeholder.
pub struct Scout {
    seen: RefCell<BTreeSet<String>>,
    blank: Column,
}

impl Scout {
    pub fn new() -> Self {
        Self {
            seen: RefCell::new(BTreeSet::new()),
            blank: Column::Numeric(Vec::new()),
        }
    }

    /// The set of column names requested so far.
    pub fn into_columns(self) -> BTreeSet<String> {
        self.seen.into_inner()
    }
}

impl Default for Scout {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnSource for Scout {
    fn rows(&self) -> usize {
        0
    }

    fn lookup(&self, name: &str) -> Result<&Column, GridError> {
        self.seen.borrow_mut().insert(name.to_string());
        Ok(&self.blank)
    }
}

/// A parsed model formula: `response ~ term + term` or a bare right-hand side.
#[derive(Debug, Clone)]
pub struct Formula {
    response: Option<String>,
    terms: Vec<String>,
    intercept: bool,
}

impl Formula {
    pub fn parse(spec: &str) -> Result<Self, GridError> {
        let (response, rhs) = match spec.split_once('~') {
            Some((lhs, rhs)) => {
                let lhs = lhs.trim();
                if lhs.is_empty() {
                    return Err(GridError::Formula(
                        "empty response on the left of '~'".into(),
                    ));
                }
                (Some(lhs.to_string()), rhs)
            }
            None => (None, spec),
        };

        let mut intercept = true;
        let mut terms: Vec<String> = Vec::new();
        for raw in rhs.split('+') {
            let term = raw.trim();
            match term {
                "" => {
                    return Err(GridError::Formula(format!(
                        "empty term in right-hand side '{}'",
                        rhs.trim()
                    )))
                }
                "1" => intercept = true,
                "0" | "-1" => intercept = false,
                _ => {
                    if !terms.iter().any(|t| t == term) {
                        terms.push(term.to_string());
                    }
                }
            }
        }
        if terms.is_empty() {
            return Err(GridError::Formula(
                "formula has no predictor terms".into(),
            ));
        }

        Ok(Self {
            response,
            terms,
            intercept,
        })
    }

    /// Same right-hand side with the response set to `channel`.
    pub fn with_response(&self, channel: &str) -> Formula {
        Formula {
            response: Some(channel.to_string()),
            terms: self.terms.clone(),
            intercept: self.intercept,
        }
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn intercept(&self) -> bool {
        self.intercept
    }

    /// Dry-run the design build against a scout to discover the minimal set
    /// of columns this formula references.
    pub fn referenced_columns(&self) -> BTreeSet<String> {
        let scout = Scout::new();
        // the scout answers every lookup, so the dry build cannot fail
        let _ = self.design(&scout);
        scout.into_columns()
    }

    /// Build the design matrix for this formula's right-hand side.
    ///
    /// The matrix holds predictor columns only; the intercept is prepended by
    /// the solver when [`Design::intercept`] is set. Categorical levels are
    /// computed over all rows of the source so every consumer of the same
    /// source sees one column layout.
    pub fn design(&self, source: &impl ColumnSource) -> Result<Design, GridError> {
        let n = source.rows();
        let mut names: Vec<String> = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for term in &self.terms {
            match source.lookup(term)? {
                Column::Numeric(values) => {
                    names.push(term.clone());
                    columns.push(values.clone());
                }
                Column::Categorical(labels) => {
                    let levels: BTreeSet<&String> = labels.iter().collect();
                    // treatment coding: first sorted level is the reference
                    for level in levels.iter().skip(1) {
                        names.push(format!("{term}[{level}]"));
                        columns.push(
                            labels
                                .iter()
                                .map(|l| if l == *level { 1.0 } else { 0.0 })
                                .collect(),
                        );
                    }
                }
            }
        }

        let x = Mat::from_fn(n, columns.len(), |i, j| columns[j][i]);
        Ok(Design {
            names,
            x,
            intercept: self.intercept,
        })
    }
}

/// A materialized design: predictor columns plus the intercept switch.
#[derive(Debug, Clone)]
pub struct Design {
    /// Predictor column names, dummy columns as `term[level]`.
    pub names: Vec<String>,
    /// Predictor columns, one per name; no intercept column.
    pub x: Mat<f64>,
    pub intercept: bool,
}

impl Design {
    /// Names of the full design the solver sees, intercept first if present.
    pub fn full_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.names.len() + 1);
        if self.intercept {
            names.push("(Intercept)".to_string());
        }
        names.extend(self.names.iter().cloned());
        names
    }

    /// Predictor submatrix for the given row indices.
    pub fn take_rows(&self, rows: &[usize]) -> Mat<f64> {
        Mat::from_fn(rows.len(), self.x.ncols(), |i, j| self.x[(rows[i], j)])
    }
}
