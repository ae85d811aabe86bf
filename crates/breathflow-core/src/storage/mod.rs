mod config;
pub mod database;

pub use config::{validate_duration_secs, Config, DisplayConfig, SessionSettings, DURATION_MENU_MIN};
pub use database::Database;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the BreathFlow data directory.
///
/// `BREATHFLOW_DATA_DIR` overrides the location outright; the test suites
/// point it at scratch directories. Otherwise `~/.config/breathflow[-dev]`
/// based on BREATHFLOW_ENV (set it to `dev` for the development directory).
pub fn data_dir() -> Result<PathBuf> {
    let dir = if let Ok(custom) = std::env::var("BREATHFLOW_DATA_DIR") {
        PathBuf::from(custom)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("BREATHFLOW_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("breathflow-dev")
        } else {
            base_dir.join("breathflow")
        }
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
