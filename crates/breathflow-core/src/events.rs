use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::technique::Phase;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Expired,
    Cancelled,
}

/// Every state change in the system produces an Event.
/// The presentation layer consumes these; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A session was created in its ready (paused) state.
    SessionStarted {
        technique_id: String,
        total_duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// The countdown began or was restarted from the ready state.
    CountdownStarted {
        phase: Phase,
        phase_secs_remaining: u32,
        at: DateTime<Utc>,
    },
    Paused {
        phase: Phase,
        phase_secs_remaining: u32,
        session_secs_remaining: u32,
        at: DateTime<Utc>,
    },
    Resumed {
        session_secs_remaining: u32,
        at: DateTime<Utc>,
    },
    /// The phase countdown reached zero and the cycle moved on.
    PhaseAdvanced {
        phase: Phase,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    /// The session countdown reached zero; the timer is terminal.
    SessionCompleted {
        at: DateTime<Utc>,
    },
    /// The user ended the session before the countdown expired.
    SessionCancelled {
        session_secs_remaining: u32,
        at: DateTime<Utc>,
    },
    /// Today's practice day was written to the log.
    PracticeRecorded {
        day: NaiveDate,
        reason: EndReason,
        newly_added: bool,
        at: DateTime<Utc>,
    },
    Reset {
        total_duration_secs: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        phase_label: String,
        phase_secs_remaining: u32,
        session_secs_remaining: u32,
        running: bool,
        pacer_scale: f32,
        session_progress_pct: f64,
        at: DateTime<Utc>,
    },
}
