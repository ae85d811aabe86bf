//! # BreathFlow Core Library
//!
//! Core business logic for the BreathFlow guided-breathing app. All
//! operations are available through a standalone CLI binary, and any
//! richer frontend is a thin presentation layer over this same crate.
//!
//! ## Architecture
//!
//! - **Phase Timer**: a state machine over logical one-second ticks that
//!   drives the breathing cycle and the session countdown in lockstep
//! - **Practice**: persisted practice-day log, streak calculation,
//!   local-calendar day keys, and the daily quote rotation
//! - **Storage**: single-table SQLite kv store and TOML configuration
//! - **Session**: the controller owning the store, the log, and the
//!   in-flight timer
//!
//! ## Key Components
//!
//! - [`PhaseTimer`]: core timer state machine
//! - [`SessionController`]: session lifecycle and practice recording
//! - [`Database`]: kv persistence
//! - [`Config`]: application configuration management

pub mod timer;
pub mod storage;
pub mod practice;
pub mod session;
pub mod technique;
pub mod events;
pub mod error;

pub use timer::{PhaseTimer, SessionConfig, SessionState, TimerState, Wakeup};
pub use storage::{Config, Database};
pub use practice::{streak, PracticeLog};
pub use session::SessionController;
pub use technique::{BreathingTechnique, Phase, PhaseTimings};
pub use events::{EndReason, Event};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
