//! Phase timer implementation.
//!
//! The timer is a state machine over logical one-second ticks. It does not
//! use internal threads - the caller delivers ticks, either directly or by
//! redeeming generation-stamped [`Wakeup`] tokens, and `sync` catches up
//! with the wall clock after a gap.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!         Ended (terminal)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = PhaseTimer::new(config);
//! timer.start();
//! // Once per logical second:
//! timer.tick(); // Returns Some(Event) on phase advance or completion
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::technique::{BreathingTechnique, Phase};
use crate::timer::pacer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Session countdown reached zero. Terminal.
    Ended,
}

/// Immutable configuration for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub technique: BreathingTechnique,
    pub total_duration_secs: u32,
}

impl SessionConfig {
    /// A zero-length cycle or a zero-duration session is a configuration
    /// error at load time, never a runtime state.
    pub fn new(
        technique: BreathingTechnique,
        total_duration_secs: u32,
    ) -> Result<Self, ValidationError> {
        technique.validate()?;
        if total_duration_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "total_duration_secs".into(),
                message: "session duration must be positive".into(),
            });
        }
        Ok(Self {
            technique,
            total_duration_secs,
        })
    }
}

/// Observable state of an active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: Phase,
    pub phase_secs_remaining: u32,
    pub session_secs_remaining: u32,
    pub running: bool,
}

/// Token for a deferred tick. Every control transition bumps the timer's
/// generation, so a token scheduled before a pause, reset, or session end
/// no longer matches and redeeming it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wakeup {
    generation: u64,
}

/// Core phase timer.
///
/// Counts two things down in lockstep: the whole session and the current
/// phase of the breathing cycle. The session countdown wins ties - when it
/// reaches zero the timer ends and phase bookkeeping for that tick is
/// skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTimer {
    config: SessionConfig,
    state: TimerState,
    phase: Phase,
    phase_secs_remaining: u32,
    session_secs_remaining: u32,
    /// Bumped on every control transition; outstanding wakeups carry the
    /// generation they were scheduled under.
    #[serde(default)]
    generation: u64,
    /// Timestamp (ms since epoch) of the last applied sync. Sub-second
    /// remainders stay in the clock, not in the counters, so repeated
    /// syncs do not drift.
    #[serde(default)]
    last_sync_epoch_ms: Option<u64>,
}

impl PhaseTimer {
    /// Create a timer in the ready state.
    ///
    /// The first phase is the first position in the cycle with a positive
    /// duration, so a technique without e.g. a second hold never shows it.
    pub fn new(config: SessionConfig) -> Self {
        let timings = config.technique.timings;
        let mut phase = Phase::Inhale;
        while timings.duration_of(phase) == 0 {
            phase = phase.next();
        }
        let phase_secs_remaining = timings.duration_of(phase);
        let session_secs_remaining = config.total_duration_secs;
        Self {
            config,
            state: TimerState::Idle,
            phase,
            phase_secs_remaining,
            session_secs_remaining,
            generation: 0,
            last_sync_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_secs_remaining(&self) -> u32 {
        self.phase_secs_remaining
    }

    pub fn session_secs_remaining(&self) -> u32 {
        self.session_secs_remaining
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Configured duration of the current phase in seconds.
    pub fn phase_duration_secs(&self) -> u32 {
        self.config.technique.timings.duration_of(self.phase)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn phase_progress(&self) -> f64 {
        let total = self.phase_duration_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.phase_secs_remaining as f64 / total as f64)
    }

    /// 0.0 .. 100.0 progress across the entire session.
    pub fn session_progress_pct(&self) -> f64 {
        let total = self.config.total_duration_secs as f64;
        if total == 0.0 {
            return 0.0;
        }
        let elapsed = total - self.session_secs_remaining as f64;
        (elapsed / total * 100.0).min(100.0)
    }

    /// Observable state for the presentation layer.
    pub fn snapshot(&self) -> SessionState {
        SessionState {
            phase: self.phase,
            phase_secs_remaining: self.phase_secs_remaining,
            session_secs_remaining: self.session_secs_remaining,
            running: self.is_running(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            phase_label: pacer::label(self.phase).to_string(),
            phase_secs_remaining: self.phase_secs_remaining,
            session_secs_remaining: self.session_secs_remaining,
            running: self.is_running(),
            pacer_scale: pacer::scale(self.phase),
            session_progress_pct: self.session_progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the countdown from the ready or paused state.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                self.generation += 1;
                self.last_sync_epoch_ms = Some(now_ms());
                Some(Event::CountdownStarted {
                    phase: self.phase,
                    phase_secs_remaining: self.phase_secs_remaining,
                    at: Utc::now(),
                })
            }
            TimerState::Running | TimerState::Ended => None,
        }
    }

    /// Freeze both countdowns. Resuming continues exactly where the timer
    /// stopped; nothing is reset.
    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                self.generation += 1;
                self.last_sync_epoch_ms = None;
                Some(Event::Paused {
                    phase: self.phase,
                    phase_secs_remaining: self.phase_secs_remaining,
                    session_secs_remaining: self.session_secs_remaining,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running;
                self.generation += 1;
                self.last_sync_epoch_ms = Some(now_ms());
                Some(Event::Resumed {
                    session_secs_remaining: self.session_secs_remaining,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Re-enter the initial ready state with the configured duration.
    pub fn reset(&mut self) -> Option<Event> {
        let timings = self.config.technique.timings;
        let mut phase = Phase::Inhale;
        while timings.duration_of(phase) == 0 {
            phase = phase.next();
        }
        self.state = TimerState::Idle;
        self.phase = phase;
        self.phase_secs_remaining = timings.duration_of(phase);
        self.session_secs_remaining = self.config.total_duration_secs;
        self.generation += 1;
        self.last_sync_epoch_ms = None;
        Some(Event::Reset {
            total_duration_secs: self.config.total_duration_secs,
            at: Utc::now(),
        })
    }

    /// Change the session duration and re-enter the initial state. Callers
    /// validate the new duration against the settings menu.
    pub fn set_duration(&mut self, total_duration_secs: u32) -> Option<Event> {
        self.config.total_duration_secs = total_duration_secs;
        self.reset()
    }

    /// Apply one logical second while running.
    ///
    /// The session countdown is decremented first; if it reaches zero the
    /// timer ends immediately and the phase countdown is left untouched.
    /// Otherwise the phase countdown is decremented and, at zero, the cycle
    /// advances - skipping any zero-duration phases - so an observer never
    /// sees a phase with no time remaining.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.session_secs_remaining = self.session_secs_remaining.saturating_sub(1);
        if self.session_secs_remaining == 0 {
            self.state = TimerState::Ended;
            self.generation += 1;
            self.last_sync_epoch_ms = None;
            return Some(Event::SessionCompleted { at: Utc::now() });
        }
        self.phase_secs_remaining = self.phase_secs_remaining.saturating_sub(1);
        if self.phase_secs_remaining == 0 {
            self.advance();
            return Some(Event::PhaseAdvanced {
                phase: self.phase,
                duration_secs: self.phase_secs_remaining,
                at: Utc::now(),
            });
        }
        None
    }

    /// Hand out a tick token for the current generation, or None when the
    /// timer is not running and nothing should be scheduled.
    pub fn schedule_tick(&self) -> Option<Wakeup> {
        if self.state != TimerState::Running {
            return None;
        }
        Some(Wakeup {
            generation: self.generation,
        })
    }

    /// Redeem a previously scheduled tick. Stale tokens are inert.
    pub fn on_wakeup(&mut self, wakeup: Wakeup) -> Option<Event> {
        if wakeup.generation != self.generation {
            return None;
        }
        self.tick()
    }

    /// Catch up with the wall clock, applying one logical tick per whole
    /// elapsed second. The sub-second remainder stays banked in the sync
    /// timestamp.
    pub fn sync(&mut self) -> Vec<Event> {
        self.sync_to(now_ms())
    }

    pub fn sync_to(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != TimerState::Running {
            return events;
        }
        let Some(last) = self.last_sync_epoch_ms else {
            return events;
        };
        let whole_secs = now_ms.saturating_sub(last) / 1000;
        for _ in 0..whole_secs {
            if let Some(event) = self.tick() {
                let ended = matches!(event, Event::SessionCompleted { .. });
                events.push(event);
                if ended {
                    break;
                }
            }
        }
        if self.state == TimerState::Running {
            self.last_sync_epoch_ms = Some(last + whole_secs * 1000);
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) {
        let timings = self.config.technique.timings;
        let mut next = self.phase.next();
        // The full cycle is validated nonzero, so a positive phase exists
        // within at most four steps.
        while timings.duration_of(next) == 0 {
            next = next.next();
        }
        self.phase = next;
        self.phase_secs_remaining = timings.duration_of(next);
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technique::{self, PhaseTimings};
    use proptest::prelude::*;

    fn technique_4_7_8() -> BreathingTechnique {
        technique::find("4-7-8").unwrap()
    }

    fn timer_4_7_8(total_secs: u32) -> PhaseTimer {
        PhaseTimer::new(SessionConfig::new(technique_4_7_8(), total_secs).unwrap())
    }

    fn custom(inhale: u32, hold_in: u32, exhale: u32, hold_out: u32) -> BreathingTechnique {
        BreathingTechnique {
            id: "custom".into(),
            name: "Custom".into(),
            description: String::new(),
            timings: PhaseTimings {
                inhale,
                hold_in,
                exhale,
                hold_out,
            },
        }
    }

    #[test]
    fn start_pause_resume() {
        let mut timer = timer_4_7_8(180);
        assert_eq!(timer.state(), TimerState::Idle);

        assert!(timer.start().is_some());
        assert_eq!(timer.state(), TimerState::Running);

        assert!(timer.pause().is_some());
        assert_eq!(timer.state(), TimerState::Paused);

        assert!(timer.resume().is_some());
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn ready_state_shows_first_phase() {
        let timer = timer_4_7_8(180);
        let snap = timer.snapshot();
        assert_eq!(snap.phase, Phase::Inhale);
        assert_eq!(snap.phase_secs_remaining, 4);
        assert_eq!(snap.session_secs_remaining, 180);
        assert!(!snap.running);
    }

    #[test]
    fn four_ticks_reach_first_hold() {
        let mut timer = timer_4_7_8(180);
        timer.start();
        for _ in 0..4 {
            timer.tick();
        }
        assert_eq!(timer.phase(), Phase::HoldIn);
        assert_eq!(timer.phase_secs_remaining(), 7);
        assert_eq!(timer.session_secs_remaining(), 176);
    }

    #[test]
    fn nineteen_ticks_wrap_to_inhale() {
        // 4 + 7 + 8 ticks walk the whole cycle; the zero-length second
        // hold is skipped on the way back to inhale.
        let mut timer = timer_4_7_8(180);
        timer.start();
        for _ in 0..19 {
            timer.tick();
        }
        assert_eq!(timer.phase(), Phase::Inhale);
        assert_eq!(timer.phase_secs_remaining(), 4);
        assert_eq!(timer.session_secs_remaining(), 161);
    }

    #[test]
    fn zero_duration_hold_never_observed() {
        let config = SessionConfig::new(custom(4, 0, 8, 0), 60).unwrap();
        let mut timer = PhaseTimer::new(config);
        timer.start();
        for _ in 0..60 {
            assert_ne!(timer.phase(), Phase::HoldIn);
            assert_ne!(timer.phase(), Phase::HoldOut);
            timer.tick();
        }
    }

    #[test]
    fn leading_zero_phases_skipped_in_ready_state() {
        let config = SessionConfig::new(custom(0, 0, 5, 0), 30).unwrap();
        let timer = PhaseTimer::new(config);
        assert_eq!(timer.phase(), Phase::Exhale);
        assert_eq!(timer.phase_secs_remaining(), 5);
    }

    #[test]
    fn one_second_session_completes() {
        let mut timer = timer_4_7_8(1);
        timer.start();
        let event = timer.tick();
        assert!(matches!(event, Some(Event::SessionCompleted { .. })));
        assert_eq!(timer.state(), TimerState::Ended);
        assert!(timer.tick().is_none());
    }

    #[test]
    fn session_end_short_circuits_phase_logic() {
        // Session expires on the same tick the phase would advance; the
        // phase countdown must be left untouched.
        let mut timer = timer_4_7_8(4);
        timer.start();
        for _ in 0..3 {
            timer.tick();
        }
        assert_eq!(timer.phase_secs_remaining(), 1);
        let event = timer.tick();
        assert!(matches!(event, Some(Event::SessionCompleted { .. })));
        assert_eq!(timer.phase(), Phase::Inhale);
        assert_eq!(timer.phase_secs_remaining(), 1);
        assert_eq!(timer.session_secs_remaining(), 0);
    }

    #[test]
    fn pause_freezes_both_countdowns() {
        let mut timer = timer_4_7_8(180);
        timer.start();
        timer.tick();
        timer.tick();
        timer.pause();
        assert!(timer.tick().is_none());
        assert_eq!(timer.phase_secs_remaining(), 2);
        assert_eq!(timer.session_secs_remaining(), 178);

        timer.resume();
        timer.tick();
        assert_eq!(timer.phase_secs_remaining(), 1);
        assert_eq!(timer.session_secs_remaining(), 177);
    }

    #[test]
    fn stale_wakeup_is_inert() {
        let mut timer = timer_4_7_8(180);
        timer.start();
        let wakeup = timer.schedule_tick().unwrap();
        timer.pause();
        assert!(timer.on_wakeup(wakeup).is_none());
        assert_eq!(timer.session_secs_remaining(), 180);

        // The pre-pause token stays dead even after resuming.
        timer.resume();
        assert!(timer.on_wakeup(wakeup).is_none());
        assert_eq!(timer.session_secs_remaining(), 180);

        let fresh = timer.schedule_tick().unwrap();
        timer.on_wakeup(fresh);
        assert_eq!(timer.session_secs_remaining(), 179);
    }

    #[test]
    fn nothing_scheduled_unless_running() {
        let mut timer = timer_4_7_8(2);
        assert!(timer.schedule_tick().is_none());
        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.state(), TimerState::Ended);
        assert!(timer.schedule_tick().is_none());
    }

    #[test]
    fn reset_returns_to_ready() {
        let mut timer = timer_4_7_8(180);
        timer.start();
        for _ in 0..10 {
            timer.tick();
        }
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.phase(), Phase::Inhale);
        assert_eq!(timer.phase_secs_remaining(), 4);
        assert_eq!(timer.session_secs_remaining(), 180);
    }

    #[test]
    fn set_duration_resets_with_new_total() {
        let mut timer = timer_4_7_8(180);
        timer.start();
        timer.tick();
        timer.set_duration(300);
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.session_secs_remaining(), 300);
    }

    #[test]
    fn sync_applies_whole_elapsed_seconds() {
        let mut timer = timer_4_7_8(180);
        timer.start();
        let now = now_ms();
        let events = timer.sync_to(now + 2500);
        assert_eq!(timer.session_secs_remaining(), 178);
        assert!(events.is_empty());

        // The 500 ms remainder stays banked; one more whole second later
        // exactly one further tick lands.
        let events = timer.sync_to(now + 3500);
        assert_eq!(timer.session_secs_remaining(), 177);
        assert!(events.is_empty());
    }

    #[test]
    fn sync_stops_at_session_end() {
        let mut timer = timer_4_7_8(3);
        timer.start();
        let now = now_ms();
        let events = timer.sync_to(now + 60_000);
        assert_eq!(timer.state(), TimerState::Ended);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::SessionCompleted { .. }))
                .count(),
            1
        );
    }

    proptest! {
        #[test]
        fn full_cycle_returns_to_inhale(
            inhale in 1u32..20,
            hold_in in 0u32..20,
            exhale in 1u32..20,
            hold_out in 0u32..20,
        ) {
            let cycle = inhale + hold_in + exhale + hold_out;
            let config = SessionConfig::new(
                custom(inhale, hold_in, exhale, hold_out),
                cycle + 1,
            ).unwrap();
            let mut timer = PhaseTimer::new(config);
            timer.start();
            for _ in 0..cycle {
                timer.tick();
            }
            prop_assert_eq!(timer.phase(), Phase::Inhale);
            prop_assert_eq!(timer.phase_secs_remaining(), inhale);
        }

        #[test]
        fn running_phase_always_has_time_left(
            inhale in 0u32..6,
            hold_in in 0u32..6,
            exhale in 1u32..6,
            hold_out in 0u32..6,
            ticks in 0usize..40,
        ) {
            let config = SessionConfig::new(
                custom(inhale, hold_in, exhale, hold_out),
                120,
            ).unwrap();
            let mut timer = PhaseTimer::new(config);
            timer.start();
            for _ in 0..ticks {
                timer.tick();
                if timer.state() == TimerState::Running {
                    prop_assert!(timer.phase_secs_remaining() > 0);
                    prop_assert!(timer.phase_duration_secs() > 0);
                }
            }
        }
    }
}
