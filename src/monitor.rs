use serde::Serialize;

use crate::params::ParameterSet;
use crate::states::HealthState;

/// Present value of a flat `payment` per year received continuously over
/// `[start, end]`, discounted at continuously compounded annual `rate`.
pub fn pv_continuous_payment(payment: f64, rate: f64, start: f64, end: f64) -> f64 {
    if rate == 0.0 {
        return payment * (end - start);
    }
    payment * ((-rate * start).exp() - (-rate * end).exp()) / rate
}

/// One accrued interval, attributed to the state occupied during it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccrualInterval {
    pub start: f64,
    pub end: f64,
    pub state: HealthState,
    pub discounted_cost: f64,
    pub discounted_utility: f64,
}

/// Running discounted cost and utility of one patient.
#[derive(Debug, Clone, Default)]
pub struct CostUtilityMonitor {
    t_last_recorded: f64,
    total_discounted_cost: f64,
    total_discounted_utility: f64,
    intervals: Vec<AccrualInterval>,
}

impl CostUtilityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accrue `[t_last_recorded, time]` spent in `state`, then advance.
    pub fn accrue(&mut self, time: f64, state: HealthState, params: &ParameterSet) {
        let start = self.t_last_recorded;
        let rate = params.discount_rate();
        let discounted_cost = pv_continuous_payment(params.cost_rate(state), rate, start, time);
        let discounted_utility =
            pv_continuous_payment(params.utility_rate(state), rate, start, time);

        self.total_discounted_cost += discounted_cost;
        self.total_discounted_utility += discounted_utility;
        self.intervals.push(AccrualInterval {
            start,
            end: time,
            state,
            discounted_cost,
            discounted_utility,
        });
        self.t_last_recorded = time;
    }

    pub fn total_discounted_cost(&self) -> f64 {
        self.total_discounted_cost
    }

    pub fn total_discounted_utility(&self) -> f64 {
        self.total_discounted_utility
    }

    pub fn t_last_recorded(&self) -> f64 {
        self.t_last_recorded
    }

    /// Contiguous intervals from time 0, in recording order.
    pub fn intervals(&self) -> &[AccrualInterval] {
        &self.intervals
    }
}

/// Per-patient record of state, survival, episodes, and accrued rewards.
#[derive(Debug, Clone)]
pub struct StateMonitor {
    current_state: HealthState,
    survival_time: Option<f64>,
    n_episodes: u32,
    cost_utility: CostUtilityMonitor,
}

impl StateMonitor {
    pub fn new(params: &ParameterSet) -> Self {
        StateMonitor {
            current_state: params.initial_state(),
            survival_time: None,
            n_episodes: 0,
            cost_utility: CostUtilityMonitor::new(),
        }
    }

    /// Record that the patient is in `new_state` at `time`.
    ///
    /// The interval since the last update is charged to the state held before
    /// this call. Re-recording the current state (at the horizon) only
    /// closes the interval.
    pub fn update(&mut self, time: f64, new_state: HealthState, params: &ParameterSet) {
        if new_state.is_absorbing() && self.survival_time.is_none() {
            self.survival_time = Some(time);
        }
        if new_state.is_episode() {
            self.n_episodes += 1;
        }
        self.cost_utility.accrue(time, self.current_state, params);
        self.current_state = new_state;
    }

    pub fn current_state(&self) -> HealthState {
        self.current_state
    }

    pub fn survival_time(&self) -> Option<f64> {
        self.survival_time
    }

    pub fn n_episodes(&self) -> u32 {
        self.n_episodes
    }

    pub fn cost_utility(&self) -> &CostUtilityMonitor {
        &self.cost_utility
    }
}
