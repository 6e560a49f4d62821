//! The diagnostics registry: which measures exist and how each one can be
//! computed across grid cells.
//!
//! Process-wide read-only static state, initialized before first use and
//! never mutated, so concurrent readers need no synchronization.

/// How a diagnostic can be computed across grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Computability {
    /// Not decomposable per cell in bulk (e.g. a full matrix); extraction is
    /// always refused.
    NotExtractable,
    /// One value per observation, cheap and always safe.
    PerObservation,
    /// One value per observation, correct only through the leave-one-out
    /// refit loop; extraction requires the caller to opt in.
    PerObservationLoop,
    /// One value per observation per design column; the result gains a
    /// `param` index level.
    PerObservationPerParameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Float,
    Int,
}

/// One registry entry.
#[derive(Debug)]
pub struct DiagnosticSpec {
    pub name: &'static str,
    pub computability: Computability,
    pub value_type: ValueType,
    /// Index levels of the extracted long table.
    pub index_levels: &'static [&'static str],
    /// The collaborator-recommended cutoff as a function of
    /// (n_observations, n_parameters), when one exists.
    pub default_crit: Option<fn(usize, usize) -> f64>,
}

const OBS_LEVELS: &[&str] = &["time", "epoch", "channel"];
const PARAM_LEVELS: &[&str] = &["time", "epoch", "channel", "param"];

fn crit_cooks(n: usize, _p: usize) -> f64 {
    4.0 / n as f64
}

fn crit_dffits(n: usize, p: usize) -> f64 {
    2.0 * (p as f64 / n as f64).sqrt()
}

fn crit_leverage(n: usize, p: usize) -> f64 {
    2.0 * p as f64 / n as f64
}

/// Every known diagnostic, alphabetically.
pub static DIAGNOSTICS: &[DiagnosticSpec] = &[
    DiagnosticSpec {
        name: "cooks_distance",
        computability: Computability::PerObservation,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: Some(crit_cooks),
    },
    DiagnosticSpec {
        name: "cov_params",
        computability: Computability::NotExtractable,
        value_type: ValueType::Float,
        index_levels: &[],
        default_crit: None,
    },
    DiagnosticSpec {
        name: "cov_ratio",
        computability: Computability::PerObservationLoop,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: None,
    },
    DiagnosticSpec {
        name: "dfbeta",
        computability: Computability::PerObservationPerParameter,
        value_type: ValueType::Float,
        index_levels: PARAM_LEVELS,
        default_crit: None,
    },
    DiagnosticSpec {
        name: "dfbetas",
        computability: Computability::PerObservationPerParameter,
        value_type: ValueType::Float,
        index_levels: PARAM_LEVELS,
        default_crit: None,
    },
    DiagnosticSpec {
        name: "dffits",
        computability: Computability::PerObservationLoop,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: Some(crit_dffits),
    },
    DiagnosticSpec {
        name: "dffits_internal",
        computability: Computability::PerObservation,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: Some(crit_dffits),
    },
    DiagnosticSpec {
        name: "hat_matrix",
        computability: Computability::NotExtractable,
        value_type: ValueType::Float,
        index_levels: &[],
        default_crit: None,
    },
    DiagnosticSpec {
        name: "hat_matrix_diag",
        computability: Computability::PerObservation,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: Some(crit_leverage),
    },
    DiagnosticSpec {
        name: "resid_press",
        computability: Computability::PerObservation,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: None,
    },
    DiagnosticSpec {
        name: "resid_std",
        computability: Computability::PerObservation,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: None,
    },
    DiagnosticSpec {
        name: "resid_studentized_external",
        computability: Computability::PerObservationLoop,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: None,
    },
    DiagnosticSpec {
        name: "resid_studentized_internal",
        computability: Computability::PerObservation,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: None,
    },
    DiagnosticSpec {
        name: "resid_var",
        computability: Computability::PerObservation,
        value_type: ValueType::Float,
        index_levels: OBS_LEVELS,
        default_crit: None,
    },
];

/// Look one diagnostic up by name.
pub fn diagnostic_spec(name: &str) -> Option<&'static DiagnosticSpec> {
    DIAGNOSTICS.iter().find(|spec| spec.name == name)
}

/// Enumerate the registry for introspection.
pub fn list_diagnostics() -> &'static [DiagnosticSpec] {
    DIAGNOSTICS
}
