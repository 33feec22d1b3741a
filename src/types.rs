use serde::Serialize;

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CohortId(pub u64);

/// Globally unique patient identifier. Doubles as the seed source for the
/// patient's private random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PatientId(pub u64);

impl CohortId {
    /// The id following this one, `None` past `u64::MAX`.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(CohortId)
    }
}

/// Patients per cohort id block. Every cohort owns ids
/// `[cohort · MAX_COHORT_SIZE, (cohort + 1) · MAX_COHORT_SIZE)`.
pub const MAX_COHORT_SIZE: u64 = 1 << 32;

impl PatientId {
    /// `cohort · MAX_COHORT_SIZE + index`. Distinct across all cohorts,
    /// whatever their population sizes.
    pub fn in_cohort(cohort: CohortId, index: usize) -> Result<Self> {
        let index = u64::try_from(index)
            .ok()
            .filter(|&i| i < MAX_COHORT_SIZE)
            .ok_or(ModelError::PopulationTooLarge(index))?;
        cohort
            .0
            .checked_mul(MAX_COHORT_SIZE)
            .and_then(|base| base.checked_add(index))
            .map(PatientId)
            .ok_or(ModelError::InvalidCohortId(cohort.0))
    }

    /// Seed for this patient's random stream.
    pub fn seed(self) -> u64 {
        self.0
    }
}

/// Simulation horizon in years. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Horizon(f64);

impl Horizon {
    pub fn new(years: f64) -> Result<Self> {
        if years.is_finite() && years > 0.0 {
            Ok(Horizon(years))
        } else {
            Err(ModelError::InvalidHorizon(years))
        }
    }

    pub fn years(self) -> f64 {
        self.0
    }
}
