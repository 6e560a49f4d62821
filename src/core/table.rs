//! Epoched trial tables: the input data model for grid building.
//!
//! A [`TrialTable`] holds one row per (epoch, time) pair and one named column
//! per predictor or measurement channel. Rows are keyed by a composite index
//! of epoch id and time stamp; the structural invariants over that index
//! (every epoch sees the same ordered times, every time sees the same ordered
//! epochs) are checked by the grid builder, not here.

use std::collections::{BTreeSet, HashMap};

use crate::core::error::GridError;

/// A single named data column: continuous measurements or categorical labels.
#[derive(Debug, Clone)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Copy of this column restricted to the given row indices.
    pub(crate) fn take_rows(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => {
                Column::Numeric(rows.iter().map(|&r| values[r]).collect())
            }
            Column::Categorical(labels) => {
                Column::Categorical(rows.iter().map(|&r| labels[r].clone()).collect())
            }
        }
    }
}

/// Rows keyed by a composite (epoch, time) index, plus named data columns.
#[derive(Debug, Clone)]
pub struct TrialTable {
    epochs: Vec<i64>,
    times: Vec<i64>,
    names: Vec<String>,
    columns: HashMap<String, Column>,
}

impl TrialTable {
    /// Create a table from its composite index. Columns are added afterwards
    /// and must match the index length.
    pub fn new(epochs: Vec<i64>, times: Vec<i64>) -> Result<Self, GridError> {
        if epochs.len() != times.len() {
            return Err(GridError::Input(format!(
                "epoch index has {} rows but time index has {}",
                epochs.len(),
                times.len()
            )));
        }
        Ok(Self {
            epochs,
            times,
            names: Vec::new(),
            columns: HashMap::new(),
        })
    }

    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), GridError> {
        let name = name.into();
        if column.len() != self.epochs.len() {
            return Err(GridError::Input(format!(
                "column '{}' has {} rows but the table index has {}",
                name,
                column.len(),
                self.epochs.len()
            )));
        }
        if self.columns.contains_key(&name) {
            return Err(GridError::Input(format!("duplicate column '{name}'")));
        }
        self.names.push(name.clone());
        self.columns.insert(name, column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.epochs.len()
    }

    pub fn epochs(&self) -> &[i64] {
        &self.epochs
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Column-projected copy keeping only the named columns. The full row
    /// index is retained so grouping behaves identically on the projection.
    pub fn select(&self, keep: &BTreeSet<String>) -> Result<TrialTable, GridError> {
        let mut projected = TrialTable::new(self.epochs.clone(), self.times.clone())?;
        for name in self.names.iter().filter(|n| keep.contains(*n)) {
            projected.insert_column(name.clone(), self.columns[name].clone())?;
        }
        for name in keep {
            if !self.columns.contains_key(name) {
                return Err(GridError::MissingColumn(name.clone()));
            }
        }
        Ok(projected)
    }

    /// Row indices grouped by epoch id, groups in first-appearance order.
    pub(crate) fn group_rows_by_epoch(&self) -> Vec<(i64, Vec<usize>)> {
        group_rows(&self.epochs)
    }

    /// Row indices grouped by time stamp, groups in first-appearance order.
    pub(crate) fn group_rows_by_time(&self) -> Vec<(i64, Vec<usize>)> {
        group_rows(&self.times)
    }

    /// Row indices grouped by time stamp, groups in ascending time order.
    /// Within a group, rows keep table order.
    pub(crate) fn sorted_time_groups(&self) -> Vec<(i64, Vec<usize>)> {
        let mut groups = self.group_rows_by_time();
        groups.sort_by_key(|(time, _)| *time);
        groups
    }
}

fn group_rows(keys: &[i64]) -> Vec<(i64, Vec<usize>)> {
    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut groups: Vec<(i64, Vec<usize>)> = Vec::new();
    for (row, &key) in keys.iter().enumerate() {
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}
