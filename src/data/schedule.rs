//! Week-partitioned cache for class schedules

use chrono::{Duration, NaiveDate};

use super::ClassTable;
use crate::cache::KeyedCache;
use crate::storage::Storage;
use crate::week::week_identifier;

/// Cache namespace for schedule data
const NAMESPACE: &str = "classtable";
/// Logical cache key of the schedule entry
const ENTRY_KEY: &str = "table";
/// Schedules change rarely but should never go very stale
const MAX_AGE_MINUTES: i64 = 10;

/// Identity-bound local store for the class schedule
///
/// The cache is partitioned by the Monday-anchored week identifier of
/// the queried date: the whole Monday–Sunday span hits the same entry,
/// so a week's schedule is fetched at most once per cache window
/// regardless of which day is asked for. Querying a date in another
/// week is a miss (and evicts the stored week).
#[derive(Debug)]
pub struct ScheduleStore<S: Storage> {
    cache: KeyedCache<S>,
}

impl<S: Storage> ScheduleStore<S> {
    /// Creates a store over the given storage collaborator.
    pub fn new(storage: S) -> Self {
        Self {
            cache: KeyedCache::new(storage, NAMESPACE)
                .with_max_age(Duration::minutes(MAX_AGE_MINUTES)),
        }
    }

    /// Returns the cached schedule covering `date`'s week, if fresh.
    pub fn load(&self, date: NaiveDate) -> Option<ClassTable> {
        self.cache.get(ENTRY_KEY, Some(&week_identifier(date)))
    }

    /// Caches `table` for the week containing `date`.
    pub fn store(&self, date: NaiveDate, table: &ClassTable) {
        self.cache.set(ENTRY_KEY, table, Some(&week_identifier(date)));
    }

    /// Drops any cached schedule (used at logout).
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
