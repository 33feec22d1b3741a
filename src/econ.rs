//! Incremental comparison of two simulated scenarios.

use serde::Serialize;

use crate::cohort::{Cohort, CohortOutcomes};
use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::params::ParameterSet;
use crate::states::Therapy;
use crate::stats::DifferenceStat;
use crate::types::{CohortId, Horizon};

/// Simulate the unvaccinated arm under `config.cohort_id` and the vaccinated
/// arm under the following id, so the arms share no patient ids or random
/// streams.
pub fn simulate_alternatives(config: &ModelConfig, horizon: Horizon) -> Result<(Cohort, Cohort)> {
    let without_id = CohortId(config.cohort_id);
    let with_id = without_id.next().ok_or(ModelError::InvalidCohortId(config.cohort_id))?;

    let simulate = |id, therapy| -> Result<Cohort> {
        let params = ParameterSet::new(config, therapy)?;
        let mut cohort = Cohort::new(id, config.pop_size, params)?;
        cohort.simulate(horizon);
        Ok(cohort)
    };
    Ok((simulate(without_id, Therapy::Without)?, simulate(with_id, Therapy::With)?))
}

/// New scenario minus base scenario, patient outcomes treated as independent
/// samples. Effect is discounted utility (QALYs).
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub survival_time: Option<DifferenceStat>,
    pub cost: Option<DifferenceStat>,
    pub effect: Option<DifferenceStat>,
}

impl Comparison {
    pub fn new(base: &CohortOutcomes, new: &CohortOutcomes) -> Self {
        Comparison {
            survival_time: DifferenceStat::independent(
                "Increase in mean survival time",
                new.survival_times(),
                base.survival_times(),
            ),
            cost: DifferenceStat::independent(
                "Increase in mean discounted cost",
                new.costs(),
                base.costs(),
            ),
            effect: DifferenceStat::independent(
                "Increase in mean discounted utility",
                new.utilities(),
                base.utilities(),
            ),
        }
    }

    /// Incremental cost-effectiveness ratio. `None` when either increment is
    /// missing or the effect increment is zero.
    pub fn icer(&self) -> Option<f64> {
        let (cost, effect) = (self.cost.as_ref()?, self.effect.as_ref()?);
        if effect.mean == 0.0 { None } else { Some(cost.mean / effect.mean) }
    }

    /// Incremental net monetary benefit at willingness-to-pay `wtp` per unit
    /// of effect.
    pub fn net_monetary_benefit(&self, wtp: f64) -> Option<f64> {
        let (cost, effect) = (self.cost.as_ref()?, self.effect.as_ref()?);
        Some(wtp * effect.mean - cost.mean)
    }
}

/// `"mean (lo, hi)"` with `decimals` places and thousands separators.
pub fn format_estimate(mean: f64, interval: (f64, f64), decimals: usize) -> String {
    format!(
        "{} ({}, {})",
        group_thousands(mean, decimals),
        group_thousands(interval.0, decimals),
        group_thousands(interval.1, decimals)
    )
}

/// Format with a difference-of-means interval at level `1 − alpha`.
pub fn format_difference(d: &DifferenceStat, alpha: f64, decimals: usize) -> Result<String> {
    Ok(format_estimate(d.mean, d.t_confidence_interval(alpha)?, decimals))
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && text.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::patient::PatientOutcome;
    use crate::states::HealthState;
    use crate::types::PatientId;

    fn outcomes(rows: &[(Option<f64>, f64, f64)]) -> CohortOutcomes {
        let mut o = CohortOutcomes::new();
        for (i, &(survival_time, cost, utility)) in rows.iter().enumerate() {
            o.extract_outcome(&PatientOutcome {
                id: PatientId(i as u64),
                final_state: if survival_time.is_some() {
                    HealthState::NaturalDeath
                } else {
                    HealthState::Well
                },
                survival_time,
                n_episodes: 0,
                discounted_cost: cost,
                discounted_utility: utility,
            });
        }
        o.calculate_cohort_outcomes(rows.len());
        o
    }

    #[test]
    fn icer_and_nmb() {
        let base = outcomes(&[(Some(10.0), 100.0, 10.0), (None, 300.0, 12.0)]);
        let new = outcomes(&[(Some(12.0), 400.0, 11.0), (None, 400.0, 15.0)]);
        let cmp = Comparison::new(&base, &new);
        assert_relative_eq!(cmp.cost.as_ref().unwrap().mean, 200.0);
        assert_relative_eq!(cmp.effect.as_ref().unwrap().mean, 2.0);
        assert_relative_eq!(cmp.survival_time.as_ref().unwrap().mean, 2.0);
        assert_relative_eq!(cmp.icer().unwrap(), 100.0);
        assert_relative_eq!(cmp.net_monetary_benefit(50.0).unwrap(), -100.0);
        assert_relative_eq!(cmp.net_monetary_benefit(1_000.0).unwrap(), 1_800.0);
    }

    #[test]
    fn zero_effect_has_no_icer() {
        let base = outcomes(&[(None, 100.0, 10.0)]);
        let new = outcomes(&[(None, 150.0, 10.0)]);
        assert_eq!(Comparison::new(&base, &new).icer(), None);
    }

    #[test]
    fn no_deaths_leaves_survival_difference_empty() {
        let base = outcomes(&[(None, 1.0, 1.0)]);
        let new = outcomes(&[(Some(3.0), 1.0, 1.0)]);
        assert!(Comparison::new(&base, &new).survival_time.is_none());
    }

    #[test]
    fn arms_have_disjoint_patient_ids() {
        let config = ModelConfig { pop_size: 50, ..ModelConfig::canonical() };
        let (without, with) = simulate_alternatives(&config, Horizon::new(10.0).unwrap()).unwrap();
        assert_eq!(without.id(), CohortId(1));
        assert_eq!(with.id(), CohortId(2));

        let without_ids = without.outcomes().patient_ids();
        let with_ids = with.outcomes().patient_ids();
        assert_eq!(without_ids.len(), 50);
        assert_eq!(with_ids.len(), 50);
        assert!(with_ids.iter().all(|id| !without_ids.contains(id)));
    }

    #[test]
    fn last_cohort_id_has_no_second_arm() {
        let config = ModelConfig { cohort_id: u64::MAX, pop_size: 1, ..ModelConfig::canonical() };
        let err = simulate_alternatives(&config, Horizon::new(1.0).unwrap()).err();
        assert!(matches!(err, Some(ModelError::InvalidCohortId(_))), "got {err:?}");
    }

    #[test]
    fn estimate_formatting() {
        assert_eq!(
            format_estimate(1234567.891, (1000.0, 2000000.0), 0),
            "1,234,568 (1,000, 2,000,000)"
        );
        assert_eq!(format_estimate(-0.5, (-1.25, 0.0), 2), "-0.50 (-1.25, 0.00)");
        assert_eq!(format_estimate(-1234.5, (-0.001, 12.0), 1), "-1,234.5 (0.0, 12.0)");
    }
}
