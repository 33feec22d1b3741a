use serde::Serialize;

use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::gillespie::Gillespie;
use crate::rates::RateMatrix;
use crate::states::{HealthState, Therapy};

/// Everything a patient needs to be simulated under one treatment scenario.
///
/// Owned by a cohort and shared read-only with its patients. Invariants are
/// checked once here, so simulation code can treat every field as valid.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    therapy: Therapy,
    initial_state: HealthState,
    rate_matrix: RateMatrix,
    annual_state_cost: [f64; HealthState::COUNT],
    annual_state_utility: [f64; HealthState::COUNT],
    annual_treatment_cost: f64,
    discount_rate: f64,
    #[serde(skip)]
    sampler: Gillespie,
}

impl ParameterSet {
    pub fn new(config: &ModelConfig, therapy: Therapy) -> Result<Self> {
        let rate_matrix = RateMatrix::build(&config.clinical, therapy)?;
        let annual_treatment_cost = match therapy {
            Therapy::Without => 0.0,
            Therapy::With => config.vaccine_cost,
        };
        Self::from_parts(
            therapy,
            rate_matrix,
            config.annual_state_cost,
            config.annual_state_utility,
            annual_treatment_cost,
            config.discount_rate,
        )
    }

    /// Assemble a parameter set around an explicit rate matrix.
    pub fn from_parts(
        therapy: Therapy,
        rate_matrix: RateMatrix,
        annual_state_cost: [f64; HealthState::COUNT],
        annual_state_utility: [f64; HealthState::COUNT],
        annual_treatment_cost: f64,
        discount_rate: f64,
    ) -> Result<Self> {
        if !(discount_rate.is_finite() && discount_rate >= 0.0) {
            return Err(ModelError::NegativeDiscountRate(discount_rate));
        }
        if !(annual_treatment_cost.is_finite() && annual_treatment_cost >= 0.0) {
            return Err(ModelError::NegativeTreatmentCost(annual_treatment_cost));
        }
        for state in HealthState::ALL {
            check_reward("cost", state, annual_state_cost[state.index()])?;
            check_reward("utility", state, annual_state_utility[state.index()])?;
        }
        let sampler = Gillespie::new(&rate_matrix)?;
        Ok(ParameterSet {
            therapy,
            initial_state: HealthState::Well,
            rate_matrix,
            annual_state_cost,
            annual_state_utility,
            annual_treatment_cost,
            discount_rate,
            sampler,
        })
    }

    pub fn therapy(&self) -> Therapy {
        self.therapy
    }

    pub fn initial_state(&self) -> HealthState {
        self.initial_state
    }

    pub fn rate_matrix(&self) -> &RateMatrix {
        &self.rate_matrix
    }

    /// Event sampler over this scenario's rate matrix.
    pub fn sampler(&self) -> &Gillespie {
        &self.sampler
    }

    pub fn annual_treatment_cost(&self) -> f64 {
        self.annual_treatment_cost
    }

    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    /// Annual cost rate while in `state`, treatment cost included.
    pub fn cost_rate(&self, state: HealthState) -> f64 {
        self.annual_state_cost[state.index()] + self.annual_treatment_cost
    }

    pub fn utility_rate(&self, state: HealthState) -> f64 {
        self.annual_state_utility[state.index()]
    }
}

fn check_reward(kind: &'static str, state: HealthState, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::NegativeReward { kind, state, value })
    }
}
