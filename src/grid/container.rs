//! The fit grid container and its projection contract.
//!
//! [`FitGrid`] composes a plain backing vector with immutable shape
//! metadata instead of subtyping an array: a 1-D slice of an array has the
//! same shape signature whether it fixes a time or a channel, so inherited
//! indexing would make attribute projection ambiguous. Here projection is a
//! method, full-shape projection always succeeds, and projection through a
//! non-full [`GridView`] is refused with a shape error.

use std::ops::Range;

use faer::Mat;

use crate::core::GridError;
use crate::solvers::OlsFit;

/// Scalar attributes every cell fit exposes, bound to typed accessors at
/// definition time rather than looked up by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitAttr {
    RSquared,
    AdjRSquared,
    Mse,
    Rmse,
    DfResid,
    NObservations,
    NParameters,
}

impl FitAttr {
    fn read(self, fit: &OlsFit) -> f64 {
        match self {
            FitAttr::RSquared => fit.r_squared,
            FitAttr::AdjRSquared => fit.adj_r_squared,
            FitAttr::Mse => fit.mse,
            FitAttr::Rmse => fit.rmse,
            FitAttr::DfResid => fit.df_resid(),
            FitAttr::NObservations => fit.n_observations as f64,
            FitAttr::NParameters => fit.n_parameters as f64,
        }
    }
}

/// Dense (times x channels) container of per-cell fits. Shape is fixed at
/// assembly and never mutated afterwards.
#[derive(Debug)]
pub struct FitGrid {
    times: Vec<i64>,
    channels: Vec<String>,
    /// Per-observation epoch ids; identical for every cell because every
    /// time point sees the same ordered epoch index.
    epochs: Vec<i64>,
    /// Design column names, intercept first when present.
    term_names: Vec<String>,
    /// Row-major cells: index = time * n_channels + channel.
    cells: Vec<OlsFit>,
}

impl FitGrid {
    /// Reshape per-channel fit sequences (channel declaration order) into
    /// the dense time-major layout.
    pub(crate) fn assemble(
        per_channel: Vec<Vec<OlsFit>>,
        times: Vec<i64>,
        channels: Vec<String>,
        epochs: Vec<i64>,
        term_names: Vec<String>,
    ) -> Result<Self, GridError> {
        let n_times = times.len();
        let n_channels = channels.len();
        if per_channel.len() != n_channels {
            return Err(GridError::Input(format!(
                "expected {} channel results, got {}",
                n_channels,
                per_channel.len()
            )));
        }
        for (channel, fits) in channels.iter().zip(per_channel.iter()) {
            if fits.len() != n_times {
                return Err(GridError::Input(format!(
                    "channel '{}' produced {} fits for {} time points",
                    channel,
                    fits.len(),
                    n_times
                )));
            }
        }

        let mut columns: Vec<std::vec::IntoIter<OlsFit>> =
            per_channel.into_iter().map(Vec::into_iter).collect();
        let mut cells = Vec::with_capacity(n_times * n_channels);
        for _ in 0..n_times {
            for column in columns.iter_mut() {
                match column.next() {
                    Some(fit) => cells.push(fit),
                    None => {
                        return Err(GridError::Input(
                            "channel result exhausted before the time index".into(),
                        ))
                    }
                }
            }
        }

        Ok(Self {
            times,
            channels,
            epochs,
            term_names,
            cells,
        })
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_times(), self.n_channels())
    }

    /// Time stamps, ascending.
    pub fn times(&self) -> &[i64] {
        &self.times
    }

    /// Channels in declaration order.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Epoch ids in per-cell observation order.
    pub fn epochs(&self) -> &[i64] {
        &self.epochs
    }

    /// Design column names, intercept first when present.
    pub fn term_names(&self) -> &[String] {
        &self.term_names
    }

    pub fn cell(&self, time: usize, channel: usize) -> &OlsFit {
        &self.cells[time * self.channels.len() + channel]
    }

    /// View covering the whole grid.
    pub fn view(&self) -> GridView<'_> {
        GridView {
            grid: self,
            rows: 0..self.n_times(),
            cols: 0..self.n_channels(),
        }
    }

    /// View of a single time point across all channels.
    pub fn row(&self, time: usize) -> GridView<'_> {
        GridView {
            grid: self,
            rows: time..time + 1,
            cols: 0..self.n_channels(),
        }
    }

    /// View of a single channel across all time points.
    pub fn column(&self, channel: usize) -> GridView<'_> {
        GridView {
            grid: self,
            rows: 0..self.n_times(),
            cols: channel..channel + 1,
        }
    }

    /// Read an arbitrary per-fit value off every cell; the result always has
    /// the full grid shape, so this cannot be shape-ambiguous.
    pub fn project<T>(&self, read: impl Fn(&OlsFit) -> T) -> GridArray<T> {
        let (n_times, n_channels) = self.shape();
        let mut data = Vec::with_capacity(n_times * n_channels);
        for cell in &self.cells {
            data.push(read(cell));
        }
        GridArray {
            shape: (n_times, n_channels),
            data,
        }
    }

    /// Project one of the enumerated scalar attributes into a dense matrix.
    pub fn scalar(&self, attr: FitAttr) -> Mat<f64> {
        Mat::from_fn(self.n_times(), self.n_channels(), |t, c| {
            attr.read(self.cell(t, c))
        })
    }
}

/// A rectangular view into a grid.
///
/// Projection through a view is refused unless the view covers the full
/// grid: a 1-D slice has the same shape signature whether it fixes a time or
/// a channel, so the operation cannot orient it and fails instead of
/// guessing.
#[derive(Debug)]
pub struct GridView<'g> {
    grid: &'g FitGrid,
    rows: Range<usize>,
    cols: Range<usize>,
}

impl<'g> GridView<'g> {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    fn check_full(&self) -> Result<(), GridError> {
        let (expected_rows, expected_cols) = self.grid.shape();
        let (got_rows, got_cols) = self.shape();
        if (got_rows, got_cols) != (expected_rows, expected_cols) {
            return Err(GridError::Shape {
                expected_rows,
                expected_cols,
                got_rows,
                got_cols,
            });
        }
        Ok(())
    }

    pub fn project<T>(&self, read: impl Fn(&OlsFit) -> T) -> Result<GridArray<T>, GridError> {
        self.check_full()?;
        Ok(self.grid.project(read))
    }

    pub fn scalar(&self, attr: FitAttr) -> Result<Mat<f64>, GridError> {
        self.check_full()?;
        Ok(self.grid.scalar(attr))
    }
}

/// A same-shaped projection result.
#[derive(Debug)]
pub struct GridArray<T> {
    shape: (usize, usize),
    data: Vec<T>,
}

impl<T> GridArray<T> {
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn get(&self, time: usize, channel: usize) -> &T {
        &self.data[time * self.shape.1 + channel]
    }
}
