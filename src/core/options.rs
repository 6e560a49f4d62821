//! Build configuration.

use crate::core::error::GridError;

/// Options controlling a grid build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Fan parcels out to a worker pool instead of fitting in the calling
    /// thread. Results are identical either way.
    pub parallel: bool,
    /// Worker-pool size when `parallel` is set.
    pub n_workers: usize,
    /// Confidence level for per-coefficient intervals.
    pub confidence_level: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            n_workers: 1,
            confidence_level: 0.95,
        }
    }
}

impl BuildOptions {
    pub fn builder() -> BuildOptionsBuilder {
        BuildOptionsBuilder::default()
    }
}

/// Builder for [`BuildOptions`].
#[derive(Debug, Default)]
pub struct BuildOptionsBuilder {
    options: BuildOptions,
}

impl BuildOptionsBuilder {
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.options.parallel = parallel;
        self
    }

    pub fn n_workers(mut self, n_workers: usize) -> Self {
        self.options.n_workers = n_workers;
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    pub fn build(self) -> Result<BuildOptions, GridError> {
        if self.options.n_workers == 0 {
            return Err(GridError::Input("n_workers must be at least 1".into()));
        }
        if self.options.confidence_level <= 0.0 || self.options.confidence_level >= 1.0 {
            return Err(GridError::Input(format!(
                "confidence_level must be in (0, 1), got {}",
                self.options.confidence_level
            )));
        }
        Ok(self.options)
    }
}
