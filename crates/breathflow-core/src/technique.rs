use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One position in the breathing cycle. The order is fixed:
/// Inhale, HoldIn, Exhale, HoldOut, then back to Inhale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Inhale,
    HoldIn,
    Exhale,
    HoldOut,
}

impl Phase {
    /// The phase that follows this one in the cycle.
    pub fn next(self) -> Phase {
        match self {
            Phase::Inhale => Phase::HoldIn,
            Phase::HoldIn => Phase::Exhale,
            Phase::Exhale => Phase::HoldOut,
            Phase::HoldOut => Phase::Inhale,
        }
    }
}

/// Seconds spent in each phase of one breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub inhale: u32,
    pub hold_in: u32,
    pub exhale: u32,
    pub hold_out: u32,
}

impl PhaseTimings {
    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Inhale => self.inhale,
            Phase::HoldIn => self.hold_in,
            Phase::Exhale => self.exhale,
            Phase::HoldOut => self.hold_out,
        }
    }

    /// Length of one full cycle in seconds.
    pub fn total_secs(&self) -> u32 {
        self.inhale + self.hold_in + self.exhale + self.hold_out
    }
}

/// A named breathing technique from the built-in catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingTechnique {
    pub id: String,
    pub name: String,
    pub description: String,
    pub timings: PhaseTimings,
}

impl BreathingTechnique {
    /// A zero-length cycle could never advance, so it is rejected when the
    /// technique is loaded rather than discovered mid-session.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timings.total_secs() == 0 {
            return Err(ValidationError::ZeroLengthCycle {
                technique: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// The built-in technique catalog.
pub fn builtin() -> Vec<BreathingTechnique> {
    vec![BreathingTechnique {
        id: "4-7-8".into(),
        name: "4-7-8 Breathing".into(),
        description: "Promotes relaxation and helps with falling asleep.".into(),
        timings: PhaseTimings {
            inhale: 4,
            hold_in: 7,
            exhale: 8,
            hold_out: 0,
        },
    }]
}

/// Look up a technique by id.
pub fn find(id: &str) -> Option<BreathingTechnique> {
    builtin().into_iter().find(|t| t.id == id)
}
