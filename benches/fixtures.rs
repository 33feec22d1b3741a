use vaxsim::cohort::Cohort;
use vaxsim::config::ModelConfig;
use vaxsim::params::ParameterSet;
use vaxsim::types::{CohortId, Horizon};
use vaxsim::Therapy;

pub struct Scenario {
    pub pop_size: usize,
    pub horizon_years: f64,
}

pub const SMALL: Scenario = Scenario { pop_size: 100, horizon_years: 100.0 };

pub const MEDIUM: Scenario = Scenario { pop_size: 1_000, horizon_years: 100.0 };

pub const LARGE: Scenario = Scenario { pop_size: 10_000, horizon_years: 100.0 };

pub fn canonical_params(therapy: Therapy) -> ParameterSet {
    ParameterSet::new(&ModelConfig::canonical(), therapy).expect("canonical parameters are valid")
}

pub fn build_cohort(scenario: &Scenario, cohort_id: u64, therapy: Therapy) -> (Cohort, Horizon) {
    let cohort = Cohort::new(CohortId(cohort_id), scenario.pop_size, canonical_params(therapy))
        .expect("cohort id leaves room for its patients");
    let horizon = Horizon::new(scenario.horizon_years).expect("positive horizon");
    (cohort, horizon)
}
