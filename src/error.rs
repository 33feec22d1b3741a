use std::path::PathBuf;

use thiserror::Error;

use crate::states::HealthState;

/// Configuration and parameter errors. The simulation itself is total once a
/// `ParameterSet` has been built, so every variant here is a setup failure.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("probability '{name}' must lie in {range}, got {value}")]
    InvalidProbability {
        name: &'static str,
        value: f64,
        range: &'static str,
    },
    #[error("all-cause mortality {all_cause} is smaller than disease mortality {disease}")]
    MortalityOrdering { all_cause: f64, disease: f64 },
    #[error("episode duration must be positive and finite, got {0}")]
    InvalidDuration(f64),
    #[error("rate {from:?} -> {to:?} must be finite and non-negative, got {value}")]
    InvalidRate {
        from: HealthState,
        to: HealthState,
        value: f64,
    },
    #[error("treatment multiplier must be finite and non-negative, got {0}")]
    InvalidMultiplier(f64),
    #[error("non-absorbing state {0:?} has no outgoing transitions")]
    DeadEndState(HealthState),
    #[error("absorbing state {0:?} has an outgoing transition rate")]
    LeakyAbsorbingState(HealthState),
    #[error("discount rate must be finite and non-negative, got {0}")]
    NegativeDiscountRate(f64),
    #[error("annual {kind} for {state:?} must be finite and non-negative, got {value}")]
    NegativeReward {
        kind: &'static str,
        state: HealthState,
        value: f64,
    },
    #[error("annual treatment cost must be finite and non-negative, got {0}")]
    NegativeTreatmentCost(f64),
    #[error("cohort id {0} leaves no room for its patient ids")]
    InvalidCohortId(u64),
    #[error("population of {0} patients exceeds the per-cohort id block")]
    PopulationTooLarge(usize),
    #[error("simulation horizon must be positive and finite, got {0}")]
    InvalidHorizon(f64),
    #[error("significance level must lie in (0, 1), got {0}")]
    InvalidAlpha(f64),
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
