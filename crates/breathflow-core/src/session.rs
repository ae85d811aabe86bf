//! Session lifecycle.
//!
//! One `SessionController` instance owns the store handle, the practice
//! log, and the optional in-flight timer. Frontends construct it once,
//! route user intents through it, and call `save` after mutating commands
//! so the session survives process restarts.
//!
//! A session counts as practice however it ends: natural expiry and an
//! early cancel both record today. Starting at all is what counts.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};

use crate::error::{CoreError, Result};
use crate::events::{EndReason, Event};
use crate::practice::{day_key, streak, PracticeLog};
use crate::storage::Database;
use crate::timer::{PhaseTimer, SessionConfig, SessionState, TimerState, Wakeup};

/// Store key for the serialized in-flight timer.
pub const ACTIVE_SESSION_KEY: &str = "active_session";

pub struct SessionController {
    db: Database,
    log: PracticeLog,
    timer: Option<PhaseTimer>,
}

impl SessionController {
    /// Open the controller over a store, loading the practice log and any
    /// persisted in-flight session. An unreadable timer blob degrades to
    /// no active session.
    pub fn open(db: Database) -> Self {
        let log = PracticeLog::load(&db);
        let timer = match db.kv_get(ACTIVE_SESSION_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<PhaseTimer>(&json) {
                Ok(timer) => Some(timer),
                Err(e) => {
                    eprintln!("warning: discarding unreadable session state: {e}");
                    None
                }
            },
            _ => None,
        };
        // An ended timer has nothing left to drive.
        let timer = timer.filter(|t| t.state() != TimerState::Ended);
        Self { db, log, timer }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Create a session in its ready state. The countdown does not run
    /// until `play`.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<Event> {
        if self.timer.is_some() {
            return Err(CoreError::Custom("a session is already active".into()));
        }
        let timer = PhaseTimer::new(config);
        let event = Event::SessionStarted {
            technique_id: timer.config().technique.id.clone(),
            total_duration_secs: timer.config().total_duration_secs,
            at: Utc::now(),
        };
        self.timer = Some(timer);
        Ok(event)
    }

    pub fn play(&mut self) -> Result<Option<Event>> {
        Ok(self.active_mut()?.start())
    }

    pub fn pause(&mut self) -> Result<Option<Event>> {
        Ok(self.active_mut()?.pause())
    }

    pub fn resume(&mut self) -> Result<Option<Event>> {
        Ok(self.active_mut()?.resume())
    }

    /// Re-enter the ready state, optionally with a new session duration.
    pub fn restart(&mut self, new_duration_secs: Option<u32>) -> Result<Option<Event>> {
        let timer = self.active_mut()?;
        Ok(match new_duration_secs {
            Some(secs) => timer.set_duration(secs),
            None => timer.reset(),
        })
    }

    /// End the active session early. Today still gets recorded, identical
    /// to a natural completion.
    pub fn cancel(&mut self) -> Result<Vec<Event>> {
        let timer = self
            .timer
            .take()
            .ok_or_else(|| CoreError::Custom("no active session".into()))?;
        let mut events = vec![Event::SessionCancelled {
            session_secs_remaining: timer.session_secs_remaining(),
            at: Utc::now(),
        }];
        events.push(self.record_practice(EndReason::Cancelled));
        Ok(events)
    }

    // ── Tick delivery ────────────────────────────────────────────────

    /// Hand out a tick token for the active session, if it is running.
    pub fn schedule_tick(&self) -> Option<Wakeup> {
        self.timer.as_ref()?.schedule_tick()
    }

    /// Redeem a tick token. Stale tokens fall through as no-ops. On
    /// session expiry the practice day is recorded and the session state
    /// destroyed.
    pub fn on_wakeup(&mut self, wakeup: Wakeup) -> Vec<Event> {
        let Some(timer) = self.timer.as_mut() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        let Some(event) = timer.on_wakeup(wakeup) else {
            return events;
        };
        let ended = matches!(event, Event::SessionCompleted { .. });
        events.push(event);
        if ended {
            self.timer = None;
            events.push(self.record_practice(EndReason::Expired));
        }
        events
    }

    /// Catch the active session up with the wall clock. A session that
    /// expired while unattended completes here, recording practice exactly
    /// once.
    pub fn sync(&mut self) -> Vec<Event> {
        self.sync_at(now_epoch_ms())
    }

    pub fn sync_at(&mut self, now_ms: u64) -> Vec<Event> {
        let Some(timer) = self.timer.as_mut() else {
            return Vec::new();
        };
        let mut events = timer.sync_to(now_ms);
        let ended = timer.state() == TimerState::Ended;
        if ended {
            self.timer = None;
            events.push(self.record_practice(EndReason::Expired));
        }
        events
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> Option<SessionState> {
        self.timer.as_ref().map(|t| t.snapshot())
    }

    pub fn timer(&self) -> Option<&PhaseTimer> {
        self.timer.as_ref()
    }

    pub fn streak(&self) -> u32 {
        streak(self.log.days(), day_key::today())
    }

    pub fn practice_days(&self) -> &BTreeSet<NaiveDate> {
        self.log.days()
    }

    pub fn practiced_today(&self) -> bool {
        self.log.contains(day_key::today())
    }

    /// Persist or clear the in-flight timer under its store key.
    pub fn save(&self) -> Result<()> {
        match &self.timer {
            Some(timer) => {
                let json = serde_json::to_string(timer)?;
                self.db.kv_set(ACTIVE_SESSION_KEY, &json)?;
            }
            None => self.db.kv_delete(ACTIVE_SESSION_KEY)?,
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn active_mut(&mut self) -> Result<&mut PhaseTimer> {
        self.timer
            .as_mut()
            .ok_or_else(|| CoreError::Custom("no active session".into()))
    }

    fn record_practice(&mut self, reason: EndReason) -> Event {
        let day = day_key::today();
        let newly_added = self.log.record(&self.db, day);
        Event::PracticeRecorded {
            day,
            reason,
            newly_added,
            at: Utc::now(),
        }
    }
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
