//! Calendar-day keys for the practice log.
//!
//! A practice day is the user's local calendar date. Every key the crate
//! produces goes through here, so the log, the streak walk, and the weekly
//! view all agree on when a day starts.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate};

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The calendar day an instant falls on, local time.
pub fn day_key(instant: DateTime<Local>) -> NaiveDate {
    instant.date_naive()
}

/// `n` calendar days before `day`.
pub fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

/// The Sunday-started week containing `day`, for the weekly calendar view.
pub fn week_of(day: NaiveDate) -> [NaiveDate; 7] {
    let offset = day.weekday().num_days_from_sunday() as u64;
    let sunday = days_before(day, offset);
    std::array::from_fn(|i| {
        sunday
            .checked_add_days(Days::new(i as u64))
            .unwrap_or(NaiveDate::MAX)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_key_drops_time_of_day() {
        let late = Local.with_ymd_and_hms(2024, 6, 2, 23, 59, 59).unwrap();
        assert_eq!(day_key(late), d(2024, 6, 2));
    }

    #[test]
    fn days_before_crosses_month_boundary() {
        assert_eq!(days_before(d(2024, 6, 1), 1), d(2024, 5, 31));
        assert_eq!(days_before(d(2024, 6, 2), 0), d(2024, 6, 2));
        assert_eq!(days_before(d(2024, 3, 1), 1), d(2024, 2, 29));
    }

    #[test]
    fn week_starts_on_sunday_and_contains_the_day() {
        // 2024-06-05 is a Wednesday.
        let week = week_of(d(2024, 6, 5));
        assert_eq!(week[0], d(2024, 6, 2));
        assert_eq!(week[0].weekday(), Weekday::Sun);
        assert_eq!(week[6], d(2024, 6, 8));
        assert!(week.contains(&d(2024, 6, 5)));
    }

    #[test]
    fn week_of_sunday_starts_with_itself() {
        let sunday = d(2024, 6, 2);
        assert_eq!(week_of(sunday)[0], sunday);
    }
}
