mod engine;
pub mod pacer;

pub use engine::{PhaseTimer, SessionConfig, SessionState, TimerState, Wakeup};
