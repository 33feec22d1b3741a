pub mod cohort;
pub mod config;
pub mod econ;
pub mod error;
pub mod gillespie;
pub mod monitor;
pub mod params;
pub mod patient;
pub mod rates;
pub mod states;
pub mod stats;
pub mod types;

pub use cohort::{Cohort, CohortOutcomes, CohortSummary, SurvivalCurve};
pub use config::{ClinicalInputs, ModelConfig};
pub use error::{ModelError, Result};
pub use params::ParameterSet;
pub use states::{HealthState, Therapy};
pub use types::{CohortId, Horizon, PatientId};
