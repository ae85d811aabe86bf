//! Persisted record of practiced days.
//!
//! The whole log lives under one kv key as a JSON array of ISO dates,
//! ascending. Every insertion rewrites the full array; there is no
//! migration and no versioning, and the last successful write wins.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::Result;
use crate::storage::Database;

/// Store key for the practiced-day set.
pub const PRACTICE_DATES_KEY: &str = "breathflow_practiceDates";

/// The set of calendar days with at least one completed or cancelled
/// session. Grows monotonically.
#[derive(Debug, Default)]
pub struct PracticeLog {
    days: BTreeSet<NaiveDate>,
}

impl PracticeLog {
    /// Load the practiced-day set from the store.
    ///
    /// A missing key, an unreadable store, or an unparseable blob all
    /// degrade to the empty set; loading never fails.
    pub fn load(db: &Database) -> Self {
        let mut days = BTreeSet::new();
        if let Ok(Some(json)) = db.kv_get(PRACTICE_DATES_KEY) {
            match serde_json::from_str::<Vec<String>>(&json) {
                Ok(entries) => {
                    for entry in &entries {
                        match entry.parse::<NaiveDate>() {
                            Ok(day) => {
                                days.insert(day);
                            }
                            Err(_) => {
                                eprintln!(
                                    "warning: skipping unreadable practice day '{entry}'"
                                );
                            }
                        }
                    }
                }
                Err(e) => {
                    eprintln!("warning: practice log unreadable, starting empty: {e}");
                }
            }
        }
        Self { days }
    }

    pub fn days(&self) -> &BTreeSet<NaiveDate> {
        &self.days
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    /// Record a practiced day. Returns whether the day was newly added.
    ///
    /// Idempotent: a day already in the set changes nothing and skips the
    /// write. On insertion the full set is rewritten; a failed write is
    /// reported on stderr and otherwise swallowed, leaving the in-memory
    /// set ahead of the store until the next successful write.
    pub fn record(&mut self, db: &Database, day: NaiveDate) -> bool {
        if !self.days.insert(day) {
            return false;
        }
        if let Err(e) = self.persist(db) {
            eprintln!("warning: failed to persist practice log: {e}");
        }
        true
    }

    fn persist(&self, db: &Database) -> Result<()> {
        let entries: Vec<String> = self.days.iter().map(|d| d.to_string()).collect();
        let json = serde_json::to_string(&entries)?;
        db.kv_set(PRACTICE_DATES_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn missing_key_loads_empty() {
        let db = Database::open_memory().unwrap();
        let log = PracticeLog::load(&db);
        assert!(log.days().is_empty());
    }

    #[test]
    fn corrupt_blob_loads_empty() {
        let db = Database::open_memory().unwrap();
        db.kv_set(PRACTICE_DATES_KEY, "{not json").unwrap();
        let log = PracticeLog::load(&db);
        assert!(log.days().is_empty());
    }

    #[test]
    fn unreadable_entries_are_skipped_not_fatal() {
        let db = Database::open_memory().unwrap();
        db.kv_set(
            PRACTICE_DATES_KEY,
            r#"["2024-06-01", "soon", "2024-06-02"]"#,
        )
        .unwrap();
        let log = PracticeLog::load(&db);
        assert_eq!(log.days().len(), 2);
        assert!(log.contains(d(2024, 6, 1)));
        assert!(log.contains(d(2024, 6, 2)));
    }

    #[test]
    fn record_round_trips_through_store() {
        let db = Database::open_memory().unwrap();
        let mut log = PracticeLog::load(&db);
        assert!(log.record(&db, d(2024, 6, 2)));
        assert!(log.record(&db, d(2024, 6, 1)));

        let reloaded = PracticeLog::load(&db);
        assert_eq!(reloaded.days().len(), 2);
        assert!(reloaded.contains(d(2024, 6, 1)));
        assert!(reloaded.contains(d(2024, 6, 2)));
    }

    #[test]
    fn record_is_idempotent() {
        let db = Database::open_memory().unwrap();
        let mut log = PracticeLog::load(&db);
        assert!(log.record(&db, d(2024, 6, 2)));
        assert!(!log.record(&db, d(2024, 6, 2)));
        assert_eq!(log.days().len(), 1);

        let reloaded = PracticeLog::load(&db);
        assert_eq!(reloaded.days().len(), 1);
    }

    #[test]
    fn blob_is_a_sorted_iso_date_array() {
        let db = Database::open_memory().unwrap();
        let mut log = PracticeLog::load(&db);
        log.record(&db, d(2024, 6, 2));
        log.record(&db, d(2024, 5, 31));
        log.record(&db, d(2024, 6, 1));

        let json = db.kv_get(PRACTICE_DATES_KEY).unwrap().unwrap();
        let entries: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(entries, vec!["2024-05-31", "2024-06-01", "2024-06-02"]);
    }
}
