use serde::Serialize;

use crate::config::ClinicalInputs;
use crate::error::{ModelError, Result};
use crate::states::{HealthState, Therapy};

use HealthState::{Disease, DiseaseDeath, NaturalDeath, PostDisease, Well};

/// Convert an annual cumulative probability into a constant hazard rate.
pub fn annual_prob_to_rate(p: f64) -> f64 {
    -(1.0 - p).ln()
}

/// Instantaneous transition rates (per year) of the five-state model,
/// before any treatment multiplier is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionRates {
    /// Non-disease death, from Well and PostDisease.
    pub lambda0: f64,
    /// First episode, survived.
    pub lambda1: f64,
    /// First episode, fatal.
    pub lambda2: f64,
    /// Recurrent episode, survived.
    pub lambda3: f64,
    /// Recurrent episode, fatal.
    pub lambda4: f64,
    /// Recovery: reciprocal of the mean episode duration.
    pub lambda5: f64,
}

impl TransitionRates {
    /// Derive rates from clinical probabilities.
    ///
    /// Combined "episode or death from episode" hazards are split by the
    /// conditional survival probability of an episode.
    pub fn from_clinical(inputs: &ClinicalInputs) -> Result<Self> {
        check_prob("annual_prob_all_cause_mort", inputs.annual_prob_all_cause_mort, false)?;
        check_prob("annual_prob_disease_mort", inputs.annual_prob_disease_mort, false)?;
        check_prob("annual_prob_first_episode", inputs.annual_prob_first_episode, false)?;
        check_prob("annual_prob_recurrence", inputs.annual_prob_recurrence, false)?;
        check_prob("prob_survive_first_episode", inputs.prob_survive_first_episode, true)?;
        check_prob(
            "prob_survive_recurrent_episode",
            inputs.prob_survive_recurrent_episode,
            true,
        )?;
        if inputs.annual_prob_all_cause_mort < inputs.annual_prob_disease_mort {
            return Err(ModelError::MortalityOrdering {
                all_cause: inputs.annual_prob_all_cause_mort,
                disease: inputs.annual_prob_disease_mort,
            });
        }
        if !(inputs.episode_duration.is_finite() && inputs.episode_duration > 0.0) {
            return Err(ModelError::InvalidDuration(inputs.episode_duration));
        }

        let lambda0 = annual_prob_to_rate(
            inputs.annual_prob_all_cause_mort - inputs.annual_prob_disease_mort,
        );

        let first = annual_prob_to_rate(inputs.annual_prob_first_episode);
        let lambda1 = first * inputs.prob_survive_first_episode;
        let lambda2 = first * (1.0 - inputs.prob_survive_first_episode);

        let recurrence = annual_prob_to_rate(inputs.annual_prob_recurrence);
        let lambda3 = recurrence * inputs.prob_survive_recurrent_episode;
        let lambda4 = recurrence * (1.0 - inputs.prob_survive_recurrent_episode);

        let lambda5 = 1.0 / inputs.episode_duration;

        Ok(TransitionRates { lambda0, lambda1, lambda2, lambda3, lambda4, lambda5 })
    }
}

fn check_prob(name: &'static str, value: f64, closed: bool) -> Result<()> {
    let ok = if closed {
        (0.0..=1.0).contains(&value)
    } else {
        (0.0..1.0).contains(&value)
    };
    if ok {
        Ok(())
    } else {
        Err(ModelError::InvalidProbability {
            name,
            value,
            range: if closed { "[0, 1]" } else { "[0, 1)" },
        })
    }
}

/// Multiplier applied to disease-related rates out of Well and PostDisease.
pub fn treatment_multiplier(therapy: Therapy, vaccine_efficacy: f64) -> Result<f64> {
    check_prob("vaccine_efficacy", vaccine_efficacy, true)?;
    Ok(match therapy {
        Therapy::Without => 1.0,
        Therapy::With => 1.0 - vaccine_efficacy,
    })
}

/// Square transition-rate matrix indexed by `HealthState::index()`.
/// Entry `[i][j]` is the hazard of moving from state `i` to state `j`.
///
/// Construction enforces that absorbing rows are all zero and every other
/// row has a positive total, so a built matrix never yields an undefined
/// waiting time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateMatrix {
    rows: [[f64; HealthState::COUNT]; HealthState::COUNT],
}

impl RateMatrix {
    pub fn new(rows: [[f64; HealthState::COUNT]; HealthState::COUNT]) -> Result<Self> {
        for from in HealthState::ALL {
            let row = &rows[from.index()];
            for to in HealthState::ALL {
                let value = row[to.index()];
                if !(value.is_finite() && value >= 0.0) {
                    return Err(ModelError::InvalidRate { from, to, value });
                }
            }
            // Self-transitions carry no meaning in a CTMC.
            let total: f64 = row
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != from.index())
                .map(|(_, r)| r)
                .sum();
            if from.is_absorbing() {
                if row.iter().any(|&r| r != 0.0) {
                    return Err(ModelError::LeakyAbsorbingState(from));
                }
            } else if total <= 0.0 {
                return Err(ModelError::DeadEndState(from));
            }
        }
        let mut rows = rows;
        for state in HealthState::ALL {
            rows[state.index()][state.index()] = 0.0;
        }
        Ok(RateMatrix { rows })
    }

    /// Lay out explicit rates, scaling every disease-related rate out of
    /// Well and PostDisease by `multiplier`. Background mortality and
    /// recovery are never scaled.
    pub fn from_rates(rates: &TransitionRates, multiplier: f64) -> Result<Self> {
        if !(multiplier.is_finite() && multiplier >= 0.0) {
            return Err(ModelError::InvalidMultiplier(multiplier));
        }
        let r = multiplier;
        let mut rows = [[0.0; HealthState::COUNT]; HealthState::COUNT];

        rows[Well.index()][Disease.index()] = rates.lambda1 * r;
        rows[Well.index()][DiseaseDeath.index()] = rates.lambda2 * r;
        rows[Well.index()][NaturalDeath.index()] = rates.lambda0;

        rows[Disease.index()][PostDisease.index()] = rates.lambda5;

        rows[PostDisease.index()][Disease.index()] = rates.lambda3 * r;
        rows[PostDisease.index()][DiseaseDeath.index()] = rates.lambda4 * r;
        rows[PostDisease.index()][NaturalDeath.index()] = rates.lambda0;

        Self::new(rows)
    }

    /// Build the matrix for a treatment scenario from clinical inputs.
    pub fn build(inputs: &ClinicalInputs, therapy: Therapy) -> Result<Self> {
        let rates = TransitionRates::from_clinical(inputs)?;
        let multiplier = treatment_multiplier(therapy, inputs.vaccine_efficacy)?;
        Self::from_rates(&rates, multiplier)
    }

    pub fn rate(&self, from: HealthState, to: HealthState) -> f64 {
        self.rows[from.index()][to.index()]
    }

    pub fn row(&self, from: HealthState) -> &[f64; HealthState::COUNT] {
        &self.rows[from.index()]
    }

    /// Total hazard of leaving `from`. Zero exactly for absorbing states.
    pub fn exit_rate(&self, from: HealthState) -> f64 {
        self.row(from).iter().sum()
    }
}
