use serde::{Deserialize, Serialize};

/// Health states a patient can occupy. Deaths are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Well,
    Disease,
    PostDisease,
    DiseaseDeath,
    NaturalDeath,
}

impl HealthState {
    pub const COUNT: usize = 5;

    /// All states in matrix index order.
    pub const ALL: [HealthState; Self::COUNT] = [
        HealthState::Well,
        HealthState::Disease,
        HealthState::PostDisease,
        HealthState::DiseaseDeath,
        HealthState::NaturalDeath,
    ];

    /// Row/column of this state in rate matrices and per-state tables.
    pub const fn index(self) -> usize {
        match self {
            HealthState::Well => 0,
            HealthState::Disease => 1,
            HealthState::PostDisease => 2,
            HealthState::DiseaseDeath => 3,
            HealthState::NaturalDeath => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn is_absorbing(self) -> bool {
        matches!(self, HealthState::DiseaseDeath | HealthState::NaturalDeath)
    }

    /// Entering this state counts as a disease episode.
    pub const fn is_episode(self) -> bool {
        matches!(self, HealthState::Disease | HealthState::DiseaseDeath)
    }
}

/// Treatment scenario a cohort is simulated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Therapy {
    Without,
    With,
}

impl Therapy {
    pub fn label(self) -> &'static str {
        match self {
            Therapy::Without => "Without vaccine",
            Therapy::With => "With vaccine",
        }
    }
}
