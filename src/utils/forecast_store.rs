#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use chrono::{Days, Local, NaiveDate};
use log::error;

use crate::utils::errors::{Errors, StoreError};
use crate::utils::forecast_types::{Forecast, ValidationError};

// ***************************************************************************
//                                Constants
// ***************************************************************************
pub const CONFLICT_MSG: &str = "A forecast already exists for that date.";
pub const SUMMARY_FIELD: &str = "summary";
pub const SUMMARY_REQUIRED_MSG: &str = "Summary is required.";

// The records every new store starts with, one per day beginning today.
const SAMPLE_DATA: [(i32, &str); 4] = [(12, "Cool"), (21, "Warm"), (19, "Warm"), (32, "Hot")];

/// The store handle shared by all endpoints.  The lock is held for the
/// whole check-then-append sequence of a create.
pub type SharedStore = Arc<Mutex<ForecastStore>>;

// ***************************************************************************
//                              ForecastStore
// ***************************************************************************
/** The in-memory owner of all forecast records.  Records are kept in insertion
 * order and are never updated or removed.  Callers only ever receive copies.
 */
#[derive(Debug, Default)]
pub struct ForecastStore {
    forecasts: Vec<Forecast>,
}

impl ForecastStore {
    /// Create a store seeded with sample data starting today.
    pub fn new() -> Self {
        Self::seeded(Local::now().date_naive())
    }

    /** Create a store seeded with sample data starting at the given date.
     * Seed dates must be distinct, so a start too close to the end of the
     * calendar is pulled back to leave room for every sample day.
     */
    pub fn seeded(today: NaiveDate) -> Self {
        let last_offset = Days::new(SAMPLE_DATA.len() as u64 - 1);
        let start = match today.checked_add_days(last_offset) {
            Some(_) => today,
            None => NaiveDate::MAX - last_offset,
        };

        let mut forecasts = Vec::with_capacity(SAMPLE_DATA.len());
        for (i, (temperature_c, summary)) in SAMPLE_DATA.iter().enumerate() {
            let date = start + Days::new(i as u64);
            forecasts.push(Forecast::new(i as i32, date, *temperature_c, summary.to_string()));
        }
        Self {forecasts}
    }

    /// Wrap this store in a shareable handle.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    // ----------------------------------------------------------------------
    // list:
    // ----------------------------------------------------------------------
    pub fn list(&self) -> Vec<Forecast> {
        self.forecasts.clone()
    }

    // ----------------------------------------------------------------------
    // get_by_id:
    // ----------------------------------------------------------------------
    pub fn get_by_id(&self, id: i32) -> Result<Forecast, StoreError> {
        self.forecasts.iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    // ----------------------------------------------------------------------
    // create:
    // ----------------------------------------------------------------------
    /** Validate and append a new forecast.  The date conflict check runs
     * before field validation, and nothing is appended unless both pass.
     */
    pub fn create(&mut self, date: NaiveDate, temperature_c: i32, summary: &str)
    -> Result<Forecast, StoreError> {
        if self.forecasts.iter().any(|f| f.date == date) {
            return Err(StoreError::Conflict(CONFLICT_MSG.to_string()));
        }

        let errors = validate_fields(summary);
        if !errors.is_empty() {
            return Err(StoreError::Invalid(errors));
        }

        let id = self.next_id();
        let forecast = Forecast::new(id, date, temperature_c, summary.to_string());
        self.forecasts.push(forecast.clone());
        Ok(forecast)
    }

    fn next_id(&self) -> i32 {
        match self.forecasts.iter().map(|f| f.id).max() {
            Some(max) => max + 1,
            None => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// validate_fields:
// ---------------------------------------------------------------------------
// Collect every field error so new checks extend the list.
fn validate_fields(summary: &str) -> Vec<ValidationError> {
    let mut errors = vec!();
    if summary.trim().is_empty() {
        errors.push(ValidationError::new(SUMMARY_FIELD, SUMMARY_REQUIRED_MSG));
    }
    errors
}

// ---------------------------------------------------------------------------
// lock_store:
// ---------------------------------------------------------------------------
/** Acquire the store lock.  A poisoned lock is an internal error. */
pub fn lock_store(store: &SharedStore) -> Result<MutexGuard<'_, ForecastStore>> {
    match store.lock() {
        Ok(guard) => Ok(guard),
        Err(e) => {
            let msg = Errors::StoreLock(e.to_string()).to_string();
            error!("{}", msg);
            Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_store() -> ForecastStore {
        ForecastStore::seeded(ymd(2024, 3, 1))
    }

    #[test]
    fn seeded_store_has_four_ordered_records() {
        let store = test_store();
        let list = store.list();
        assert_eq!(list.len(), 4);
        assert_eq!(list.iter().map(|f| f.id).collect::<Vec<i32>>(), vec![0, 1, 2, 3]);
        assert_eq!(list[0].date, ymd(2024, 3, 1));
        assert_eq!(list[3].date, ymd(2024, 3, 4));
        assert_eq!(list[0].summary, "Cool");
        assert_eq!(list[3].temperature_f(), 89);
    }

    #[test]
    fn new_store_starts_today() {
        let store = ForecastStore::new();
        assert_eq!(store.list()[0].date, Local::now().date_naive());
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let mut store = test_store();
        let mut last = 3;
        for day in 10..15 {
            let f = store.create(ymd(2024, 3, day), 10, "Mild").unwrap();
            assert!(f.id > last);
            last = f.id;
        }
        assert_eq!(last, 8);
    }

    #[test]
    fn first_id_of_empty_store_is_zero() {
        let mut store = ForecastStore::default();
        assert_eq!(store.list().len(), 0);
        let f = store.create(ymd(2024, 3, 10), 1, "Cold").unwrap();
        assert_eq!(f.id, 0);
    }

    #[test]
    fn duplicate_date_conflicts_without_mutation() {
        let mut store = test_store();
        for f in store.list() {
            let res = store.create(f.date, 0, "Anything");
            assert_eq!(res, Err(StoreError::Conflict(CONFLICT_MSG.to_string())));
        }
        assert_eq!(store.list().len(), 4);
    }

    #[test]
    fn conflict_is_checked_before_summary() {
        let mut store = test_store();
        let res = store.create(ymd(2024, 3, 1), 0, "");
        assert!(matches!(res, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn blank_summary_is_invalid_without_mutation() {
        let mut store = test_store();
        for summary in ["", "   ", "\t\n"] {
            match store.create(ymd(2024, 3, 20), 5, summary) {
                Err(StoreError::Invalid(errs)) => {
                    assert_eq!(errs, vec![ValidationError::new(SUMMARY_FIELD, SUMMARY_REQUIRED_MSG)]);
                },
                other => panic!("expected validation failure, got {:?}", other),
            }
        }
        assert_eq!(store.list().len(), 4);
    }

    #[test]
    fn created_record_round_trips() {
        let mut store = test_store();
        let created = store.create(ymd(2024, 4, 1), 12, "Breezy").unwrap();
        assert_eq!(store.get_by_id(created.id), Ok(created.clone()));
        assert_eq!(created.temperature_f(), 53);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = test_store();
        assert_eq!(store.get_by_id(4), Err(StoreError::NotFound(4)));
        assert_eq!(store.get_by_id(-1), Err(StoreError::NotFound(-1)));
    }

    #[test]
    fn scenario() {
        let mut store = ForecastStore::seeded(ymd(2024, 3, 1));
        let sunny = store.create(ymd(2024, 3, 10), 20, "Sunny").unwrap();
        assert_eq!(sunny.id, 4);
        assert!(matches!(store.create(ymd(2024, 3, 10), 5, "Rain"), Err(StoreError::Conflict(_))));
        assert!(matches!(store.create(ymd(2024, 3, 11), 5, ""), Err(StoreError::Invalid(_))));
        assert_eq!(store.list().len(), 5);
    }

    #[test]
    fn shared_store_locks() {
        let shared = test_store().into_shared();
        {
            let mut guard = lock_store(&shared).unwrap();
            guard.create(ymd(2024, 5, 1), 3, "Chilly").unwrap();
        }
        assert_eq!(lock_store(&shared).unwrap().list().len(), 5);
    }
    #[test]
    fn seeding_at_end_of_calendar_keeps_dates_distinct() {
        let store = ForecastStore::seeded(NaiveDate::MAX);
        let dates: Vec<NaiveDate> = store.list().iter().map(|f| f.date).collect();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[3], NaiveDate::MAX);
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn concurrent_creates_for_one_date_admit_a_single_winner() {
        const WORKERS: usize = 16;
        let shared = test_store().into_shared();
        let barrier = Arc::new(Barrier::new(WORKERS));
        let date = ymd(2024, 6, 1);

        let handles: Vec<_> = (0..WORKERS).map(|i| {
            let shared = shared.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                lock_store(&shared).unwrap().create(date, i as i32, "Contested")
            })
        }).collect();
        let results: Vec<Result<Forecast, StoreError>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter()
                       .filter(|r| matches!(r, Err(StoreError::Conflict(_))))
                       .count(), WORKERS - 1);
        assert_eq!(lock_store(&shared).unwrap().list().len(), 5);
    }

    #[test]
    fn poisoned_lock_is_an_error() {
        let shared = test_store().into_shared();
        let holder = shared.clone();
        let joined = thread::spawn(move || {
            let _guard = holder.lock().unwrap();
            panic!("store holder failed");
        }).join();
        assert!(joined.is_err());

        let err = lock_store(&shared).unwrap_err();
        assert!(err.to_string().contains("Unable to acquire the forecast store lock"));
    }
}
