//! Pacer support for the breathing visual.
//!
//! The core never animates anything. These pure functions tell a
//! presentation layer what the pacer should look like for a phase: the
//! target scale, the transition duration to reach it, and the label shown
//! inside it. Pausing simply stops delivering ticks, which freezes the
//! pacer wherever it is.

use crate::technique::{Phase, PhaseTimings};

/// Expanded scale while air is held in, contracted while it is out.
pub const EXPANDED: f32 = 1.5;
pub const CONTRACTED: f32 = 1.0;

/// Target visual scale for a phase.
pub fn scale(phase: Phase) -> f32 {
    match phase {
        Phase::Inhale | Phase::HoldIn => EXPANDED,
        Phase::Exhale | Phase::HoldOut => CONTRACTED,
    }
}

/// Seconds the transition into `phase` should take. Equal to the phase's
/// configured duration, so the visual pace matches the countdown.
pub fn transition_secs(phase: Phase, timings: &PhaseTimings) -> u32 {
    timings.duration_of(phase)
}

/// Label shown inside the pacer.
pub fn label(phase: Phase) -> &'static str {
    match phase {
        Phase::Inhale => "Inhale...",
        Phase::HoldIn | Phase::HoldOut => "Hold",
        Phase::Exhale => "Exhale...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technique;

    #[test]
    fn scale_is_a_pure_function_of_phase() {
        assert_eq!(scale(Phase::Inhale), EXPANDED);
        assert_eq!(scale(Phase::HoldIn), EXPANDED);
        assert_eq!(scale(Phase::Exhale), CONTRACTED);
        assert_eq!(scale(Phase::HoldOut), CONTRACTED);
    }

    #[test]
    fn transition_matches_phase_duration() {
        let t = technique::find("4-7-8").unwrap();
        assert_eq!(transition_secs(Phase::Inhale, &t.timings), 4);
        assert_eq!(transition_secs(Phase::HoldIn, &t.timings), 7);
        assert_eq!(transition_secs(Phase::Exhale, &t.timings), 8);
        assert_eq!(transition_secs(Phase::HoldOut, &t.timings), 0);
    }
}
