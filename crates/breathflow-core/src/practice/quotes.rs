//! Daily motivational quote.

use chrono::{Datelike, NaiveDate};

const QUOTES: [&str; 6] = [
    "The best time to relax is when you don't have time for it.",
    "Breathe in peace, breathe out stress.",
    "Calmness is the cradle of power.",
    "Within you, there is a stillness and a sanctuary to which you can retreat at any time and be yourself.",
    "Feelings come and go like clouds in a windy sky. Conscious breathing is my anchor.",
    "Your calm mind is the ultimate weapon against your challenges.",
];

/// The quote for a calendar day, rotating by day-of-year. Deterministic:
/// the same date always yields the same quote.
pub fn daily_quote(day: NaiveDate) -> &'static str {
    QUOTES[day.ordinal() as usize % QUOTES.len()]
}
