pub mod day_key;
mod log;
pub mod quotes;
mod streak;

pub use log::{PracticeLog, PRACTICE_DATES_KEY};
pub use streak::streak;
