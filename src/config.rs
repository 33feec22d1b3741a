use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::states::HealthState;

/// Clinical inputs the rate matrix is derived from. Probabilities are annual
/// cumulative probabilities unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalInputs {
    pub annual_prob_all_cause_mort: f64,
    pub annual_prob_disease_mort: f64,
    pub annual_prob_first_episode: f64,
    /// Conditional on having a first episode.
    pub prob_survive_first_episode: f64,
    /// Conditional on having a recurrent episode.
    pub prob_survive_recurrent_episode: f64,
    pub annual_prob_recurrence: f64,
    /// Mean episode duration in years.
    pub episode_duration: f64,
    /// Relative risk reduction of every disease-related rate under vaccination.
    pub vaccine_efficacy: f64,
}

impl Default for ClinicalInputs {
    fn default() -> Self {
        ClinicalInputs {
            annual_prob_all_cause_mort: 0.0104,
            annual_prob_disease_mort: 111.4 / 100_000.0,
            annual_prob_first_episode: 0.246,
            prob_survive_first_episode: (24_600.0 - 111.4) / 24_600.0,
            prob_survive_recurrent_episode: 0.95,
            annual_prob_recurrence: 0.04,
            episode_duration: 2.0 / 52.0, // two weeks
            vaccine_efficacy: 0.85,
        }
    }
}

/// Immutable model configuration. Built once, then passed by reference into
/// every `ParameterSet`; simulation code never reads it as global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub cohort_id: u64,
    pub pop_size: usize,
    /// Simulation length in years.
    pub horizon: f64,
    /// Significance level for reported intervals.
    pub alpha: f64,
    /// Annual discount rate, continuously compounded.
    pub discount_rate: f64,
    pub clinical: ClinicalInputs,
    /// Annual cost per state, in `HealthState::ALL` order.
    pub annual_state_cost: [f64; HealthState::COUNT],
    /// Annual utility per state, in `HealthState::ALL` order.
    pub annual_state_utility: [f64; HealthState::COUNT],
    /// Annual cost of vaccination, charged in every state while alive.
    pub vaccine_cost: f64,
}

impl ModelConfig {
    pub fn canonical() -> Self {
        ModelConfig {
            cohort_id: 1,
            pop_size: 10_000,
            horizon: 100.0,
            alpha: 0.05,
            discount_rate: 0.03,
            clinical: ClinicalInputs::default(),
            // Well, Disease, PostDisease, DiseaseDeath, NaturalDeath
            annual_state_cost: [0.0, 2000.0, 0.0, 0.0, 0.0],
            annual_state_utility: [1.0, 0.7, 0.9, 0.0, 0.0],
            vaccine_cost: 40.0,
        }
    }

    /// Load a JSON override file. Fields absent from the file keep their
    /// canonical values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ModelError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn state_cost(&self, state: HealthState) -> f64 {
        self.annual_state_cost[state.index()]
    }

    pub fn state_utility(&self, state: HealthState) -> f64 {
        self.annual_state_utility[state.index()]
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn canonical_tables_are_indexed_by_state() {
        let c = ModelConfig::canonical();
        assert_eq!(c.state_cost(HealthState::Disease), 2000.0);
        assert_eq!(c.state_utility(HealthState::PostDisease), 0.9);
        assert_eq!(c.state_utility(HealthState::NaturalDeath), 0.0);
    }

    #[test]
    fn partial_json_keeps_canonical_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pop_size": 250, "clinical": {{"vaccine_efficacy": 0.5}}}}"#).unwrap();

        let c = ModelConfig::from_json_file(file.path()).unwrap();
        assert_eq!(c.pop_size, 250);
        assert_eq!(c.clinical.vaccine_efficacy, 0.5);
        assert_eq!(c.clinical.annual_prob_recurrence, 0.04);
        assert_eq!(c.horizon, 100.0);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = ModelConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::ConfigParse { .. }), "got {err:?}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ModelConfig::from_json_file("/nonexistent/vaxsim.json").unwrap_err();
        assert!(matches!(err, ModelError::ConfigIo { .. }), "got {err:?}");
    }
}
