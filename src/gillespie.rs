//! Gillespie stochastic simulation step for a continuous-time Markov chain.
//!
//! From a state with outgoing rates `r_j` and total `R = Σ r_j`, the waiting
//! time is `Exp(R)` and the destination is `j` with probability `r_j / R`.
//! The waiting time is drawn before the destination; reproducing a sampled
//! trajectory depends on keeping that order.

use log::trace;
use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand_distr::{Distribution, Exp};

use crate::error::{ModelError, Result};
use crate::rates::RateMatrix;
use crate::states::HealthState;

/// Outcome of one sampler call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The current state has no outgoing transitions.
    Absorbed,
    /// Leave the current state after `dt` years, for `to`.
    Jump { dt: f64, to: HealthState },
}

/// Competing-risks sampler for one row of the rate matrix.
#[derive(Debug, Clone)]
struct RowSampler {
    waiting: Exp<f64>,
    destination: WeightedIndex<f64>,
}

/// Event sampler over a fixed rate matrix. Row samplers are built once, so
/// a single instance can serve every patient of a cohort.
#[derive(Debug, Clone)]
pub struct Gillespie {
    rows: Vec<Option<RowSampler>>,
}

impl Gillespie {
    pub fn new(matrix: &RateMatrix) -> Result<Self> {
        let rows = HealthState::ALL
            .iter()
            .map(|&state| {
                let total = matrix.exit_rate(state);
                if total == 0.0 {
                    return Ok(None);
                }
                let waiting = Exp::new(total).map_err(|_| ModelError::DeadEndState(state))?;
                let destination = WeightedIndex::new(matrix.row(state).iter())
                    .map_err(|_| ModelError::DeadEndState(state))?;
                Ok(Some(RowSampler { waiting, destination }))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Gillespie { rows })
    }

    /// Sample the time to the next event and the state it leads to.
    pub fn next<R: Rng + ?Sized>(&self, current: HealthState, rng: &mut R) -> Step {
        let Some(row) = &self.rows[current.index()] else {
            return Step::Absorbed;
        };
        let dt = row.waiting.sample(rng);
        let index = row.destination.sample(rng);
        // WeightedIndex only yields indices of the row it was built from.
        let to = HealthState::ALL[index];
        trace!("{current:?} -> {to:?} after {dt:.4}y");
        Step::Jump { dt, to }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::rates::TransitionRates;
    use HealthState::*;

    fn matrix() -> RateMatrix {
        RateMatrix::from_rates(
            &TransitionRates {
                lambda0: 0.01,
                lambda1: 0.2,
                lambda2: 0.01,
                lambda3: 0.1,
                lambda4: 0.005,
                lambda5: 26.0,
            },
            1.0,
        )
        .unwrap()
    }

    fn rng(seed: u64) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(seed)
    }

    #[test]
    fn absorbing_states_signal_absorbed() {
        let g = Gillespie::new(&matrix()).unwrap();
        let mut rng = rng(0);
        assert_eq!(g.next(DiseaseDeath, &mut rng), Step::Absorbed);
        assert_eq!(g.next(NaturalDeath, &mut rng), Step::Absorbed);
    }

    #[test]
    fn disease_always_recovers() {
        let g = Gillespie::new(&matrix()).unwrap();
        let mut rng = rng(7);
        for _ in 0..1_000 {
            match g.next(Disease, &mut rng) {
                Step::Jump { dt, to } => {
                    assert_eq!(to, PostDisease);
                    assert!(dt > 0.0 && dt.is_finite());
                }
                Step::Absorbed => panic!("Disease is not absorbing"),
            }
        }
    }

    #[test]
    fn destinations_have_positive_rates() {
        let m = matrix();
        let g = Gillespie::new(&m).unwrap();
        let mut rng = rng(3);
        for _ in 0..5_000 {
            if let Step::Jump { to, .. } = g.next(Well, &mut rng) {
                assert!(m.rate(Well, to) > 0.0, "sampled zero-rate destination {to:?}");
            }
        }
    }

    #[test]
    fn same_stream_gives_same_steps() {
        let g = Gillespie::new(&matrix()).unwrap();
        let draw = |seed| {
            let mut rng = rng(seed);
            (0..50).map(|_| g.next(PostDisease, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(11), draw(11));
        assert_ne!(draw(11), draw(12));
    }

    /// Mean holding time in Well is 1 / (λ0 + λ1 + λ2); destination shares
    /// follow the rates. 20k draws land within a few percent.
    #[test]
    fn holding_time_and_destination_shares() {
        let g = Gillespie::new(&matrix()).unwrap();
        let mut rng = rng(42);
        let n = 20_000;
        let mut total_dt = 0.0;
        let mut to_disease = 0usize;
        for _ in 0..n {
            if let Step::Jump { dt, to } = g.next(Well, &mut rng) {
                total_dt += dt;
                if to == Disease {
                    to_disease += 1;
                }
            }
        }
        let mean = total_dt / n as f64;
        let expected = 1.0 / 0.22;
        assert!((mean - expected).abs() / expected < 0.05, "mean holding time {mean:.3}");

        let share = to_disease as f64 / n as f64;
        let expected_share = 0.2 / 0.22;
        assert!((share - expected_share).abs() < 0.02, "Disease share {share:.3}");
    }
}
