use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use crate::gillespie::Step;
use crate::monitor::StateMonitor;
use crate::params::ParameterSet;
use crate::states::HealthState;
use crate::types::{Horizon, PatientId};

/// One simulated individual. Owns its monitor and random stream; shares the
/// cohort's parameters read-only.
pub struct Patient<'a> {
    pub id: PatientId,
    params: &'a ParameterSet,
    monitor: StateMonitor,
}

impl<'a> Patient<'a> {
    pub fn new(id: PatientId, params: &'a ParameterSet) -> Self {
        Patient { id, params, monitor: StateMonitor::new(params) }
    }

    /// Run the patient until an absorbing state is reached or `horizon`
    /// elapses.
    ///
    /// A jump sampled to land after the horizon never happens: the patient is
    /// recorded in its current state up to the horizon and the run ends.
    pub fn simulate(&mut self, horizon: Horizon) {
        let mut rng = ChaCha20Rng::seed_from_u64(self.id.seed());
        let sampler = self.params.sampler();
        let horizon = horizon.years();
        let mut t = 0.0;

        loop {
            match sampler.next(self.monitor.current_state(), &mut rng) {
                Step::Absorbed => break,
                Step::Jump { dt, .. } if t + dt > horizon => {
                    t = horizon;
                    let current = self.monitor.current_state();
                    self.monitor.update(t, current, self.params);
                    break;
                }
                Step::Jump { dt, to } => {
                    t += dt;
                    self.monitor.update(t, to, self.params);
                }
            }
        }

        debug!(
            "patient {} finished in {:?} at t={t:.3} ({} episodes)",
            self.id.0,
            self.monitor.current_state(),
            self.monitor.n_episodes()
        );
    }

    pub fn monitor(&self) -> &StateMonitor {
        &self.monitor
    }

    /// Outcomes retained once the patient itself is discarded.
    pub fn outcome(&self) -> PatientOutcome {
        let cu = self.monitor.cost_utility();
        PatientOutcome {
            id: self.id,
            final_state: self.monitor.current_state(),
            survival_time: self.monitor.survival_time(),
            n_episodes: self.monitor.n_episodes(),
            discounted_cost: cu.total_discounted_cost(),
            discounted_utility: cu.total_discounted_utility(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientOutcome {
    pub id: PatientId,
    pub final_state: HealthState,
    /// `None` for a patient still alive at the horizon (censored).
    pub survival_time: Option<f64>,
    pub n_episodes: u32,
    pub discounted_cost: f64,
    pub discounted_utility: f64,
}
