//! Consecutive-day practice streak.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::day_key::days_before;

/// Count consecutive practiced days ending at `today` or yesterday.
///
/// Practicing keeps a streak alive through the whole of the next day: if
/// neither today nor yesterday is recorded the streak is 0. Otherwise the
/// walk anchors at today when recorded (else yesterday) and counts
/// backward day by day until the first miss.
pub fn streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = days_before(today, 1);
    let mut cursor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut count = 0;
    while days.contains(&cursor) {
        count += 1;
        cursor = days_before(cursor, 1);
    }
    count
}
