use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::params::ParameterSet;
use crate::patient::{Patient, PatientOutcome};
use crate::stats::SummaryStat;
use crate::types::{CohortId, Horizon, PatientId};

/// A population simulated under one parameter set.
pub struct Cohort {
    id: CohortId,
    pop_size: usize,
    first_patient: PatientId,
    params: ParameterSet,
    outcomes: CohortOutcomes,
}

impl Cohort {
    /// Fails when the cohort's patient ids would fall outside `u64`.
    pub fn new(id: CohortId, pop_size: usize, params: ParameterSet) -> Result<Self> {
        let first_patient = PatientId::in_cohort(id, 0)?;
        PatientId::in_cohort(id, pop_size.saturating_sub(1))?;
        Ok(Cohort { id, pop_size, first_patient, params, outcomes: CohortOutcomes::new() })
    }

    pub fn id(&self) -> CohortId {
        self.id
    }

    pub fn pop_size(&self) -> usize {
        self.pop_size
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Simulate every patient, then aggregate.
    ///
    /// Patients run in parallel but are collected in index order, so the
    /// outcomes are identical to a sequential run.
    pub fn simulate(&mut self, horizon: Horizon) {
        info!(
            "cohort {}: simulating {} patients ({:?}, horizon {}y)",
            self.id.0,
            self.pop_size,
            self.params.therapy(),
            horizon.years()
        );

        let params = &self.params;
        let (id, pop_size, first) = (self.id, self.pop_size, self.first_patient.0);
        let patients: Vec<PatientOutcome> = (0..pop_size)
            .into_par_iter()
            .map(|i| {
                // In range: the last id was checked in `new`.
                let mut patient = Patient::new(PatientId(first + i as u64), params);
                patient.simulate(horizon);
                patient.outcome()
            })
            .collect();

        let mut outcomes = CohortOutcomes::new();
        for patient in &patients {
            outcomes.extract_outcome(patient);
        }
        outcomes.calculate_cohort_outcomes(pop_size);

        match outcomes.mean_survival_time() {
            Some(mean) => info!(
                "cohort {}: {} deaths, mean survival {mean:.2}y",
                id.0,
                outcomes.survival_times().len()
            ),
            None => warn!("cohort {}: no deaths observed before the horizon", id.0),
        }
        self.outcomes = outcomes;
    }

    pub fn outcomes(&self) -> &CohortOutcomes {
        &self.outcomes
    }
}

/// Per-patient outcome sequences and the statistics derived from them.
///
/// Sequences are in patient index order. Survival times are only recorded
/// for patients who died before the horizon.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CohortOutcomes {
    patient_ids: Vec<PatientId>,
    survival_times: Vec<f64>,
    n_episodes: Vec<u32>,
    costs: Vec<f64>,
    utilities: Vec<f64>,
    summary: Option<CohortSummary>,
}

/// Cohort-level aggregates. Every mean is `None` when its denominator is zero.
#[derive(Debug, Clone, Serialize)]
pub struct CohortSummary {
    pub pop_size: usize,
    /// Over deaths only.
    pub mean_survival_time: Option<f64>,
    /// Over the full population.
    pub mean_episodes: Option<f64>,
    pub mean_cost: Option<f64>,
    pub mean_utility: Option<f64>,
    pub stat_survival_time: Option<SummaryStat>,
    pub stat_episodes: Option<SummaryStat>,
    pub stat_cost: Option<SummaryStat>,
    pub stat_utility: Option<SummaryStat>,
    pub survival_curve: SurvivalCurve,
}

impl CohortOutcomes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract_outcome(&mut self, patient: &PatientOutcome) {
        self.patient_ids.push(patient.id);
        if let Some(t) = patient.survival_time {
            self.survival_times.push(t);
        }
        self.n_episodes.push(patient.n_episodes);
        self.costs.push(patient.discounted_cost);
        self.utilities.push(patient.discounted_utility);
    }

    /// Finalize once all patients are extracted.
    pub fn calculate_cohort_outcomes(&mut self, pop_size: usize) {
        let episodes: Vec<f64> = self.n_episodes.iter().map(|&n| f64::from(n)).collect();
        self.summary = Some(CohortSummary {
            pop_size,
            mean_survival_time: mean(&self.survival_times),
            mean_episodes: mean(&episodes),
            mean_cost: mean(&self.costs),
            mean_utility: mean(&self.utilities),
            stat_survival_time: SummaryStat::new("Survival time", &self.survival_times),
            stat_episodes: SummaryStat::from_counts("Number of episodes", &self.n_episodes),
            stat_cost: SummaryStat::new("Discounted cost", &self.costs),
            stat_utility: SummaryStat::new("Discounted utility", &self.utilities),
            survival_curve: SurvivalCurve::new(pop_size, &self.survival_times),
        });
    }

    pub fn patient_ids(&self) -> &[PatientId] {
        &self.patient_ids
    }

    pub fn survival_times(&self) -> &[f64] {
        &self.survival_times
    }

    pub fn n_episodes(&self) -> &[u32] {
        &self.n_episodes
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    /// `None` until `calculate_cohort_outcomes` has run.
    pub fn summary(&self) -> Option<&CohortSummary> {
        self.summary.as_ref()
    }

    pub fn mean_survival_time(&self) -> Option<f64> {
        self.summary.as_ref().and_then(|s| s.mean_survival_time)
    }

    pub fn mean_episodes(&self) -> Option<f64> {
        self.summary.as_ref().and_then(|s| s.mean_episodes)
    }

    pub fn mean_cost(&self) -> Option<f64> {
        self.summary.as_ref().and_then(|s| s.mean_cost)
    }

    pub fn mean_utility(&self) -> Option<f64> {
        self.summary.as_ref().and_then(|s| s.mean_utility)
    }

    pub fn survival_curve(&self) -> Option<&SurvivalCurve> {
        self.summary.as_ref().map(|s| &s.survival_curve)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Number of living patients over time: a non-increasing step function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalCurve {
    /// `(time, alive)` pairs. The first step is `(0, pop_size)`; every later
    /// step is a distinct death time with all deaths at that instant applied.
    /// Both steps sit at `t = 0` only if a patient dies at time zero.
    steps: Vec<(f64, usize)>,
}

impl SurvivalCurve {
    pub fn new(pop_size: usize, survival_times: &[f64]) -> Self {
        let mut times = survival_times.to_vec();
        times.sort_by(|a, b| a.total_cmp(b));

        let mut steps = vec![(0.0, pop_size)];
        let mut alive = pop_size;
        let mut i = 0;
        while i < times.len() {
            let t = times[i];
            while i < times.len() && times[i] == t {
                alive = alive.saturating_sub(1);
                i += 1;
            }
            steps.push((t, alive));
        }
        SurvivalCurve { steps }
    }

    pub fn steps(&self) -> &[(f64, usize)] {
        &self.steps
    }

    pub fn initial(&self) -> usize {
        self.steps.first().map(|s| s.1).unwrap_or(0)
    }

    pub fn final_alive(&self) -> usize {
        self.steps.last().map(|s| s.1).unwrap_or(0)
    }

    /// Patients alive at `t` (deaths at exactly `t` already applied).
    pub fn alive_at(&self, t: f64) -> usize {
        self.steps
            .iter()
            .take_while(|(time, _)| *time <= t)
            .last()
            .map(|s| s.1)
            .unwrap_or_else(|| self.initial())
    }
}
