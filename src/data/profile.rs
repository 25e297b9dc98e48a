//! Cached access to the student profile

use chrono::Duration;

use super::StudentProfile;
use crate::cache::KeyedCache;
use crate::storage::Storage;

/// Cache namespace for profile data
const NAMESPACE: &str = "profile";
/// Logical cache key of the single profile entry
const ENTRY_KEY: &str = "me";
/// Profile data rarely changes; refetch at most twice an hour
const MAX_AGE_MINUTES: i64 = 30;

/// Identity-bound local store for the logged-in student's profile
///
/// A thin typed wrapper over [`KeyedCache`]: one entry, no partitioning.
/// The cache is an optimization only; a miss simply means the profile
/// has to be fetched again.
#[derive(Debug)]
pub struct ProfileStore<S: Storage> {
    cache: KeyedCache<S>,
}

impl<S: Storage> ProfileStore<S> {
    /// Creates a store over the given storage collaborator.
    pub fn new(storage: S) -> Self {
        Self {
            cache: KeyedCache::new(storage, NAMESPACE)
                .with_max_age(Duration::minutes(MAX_AGE_MINUTES)),
        }
    }

    /// Returns the cached profile if it is fresh and owned by the
    /// current user.
    pub fn load(&self) -> Option<StudentProfile> {
        self.cache.get(ENTRY_KEY, None)
    }

    /// Whether a valid cached profile is available.
    pub fn available(&self) -> bool {
        self.load().is_some()
    }

    /// Caches the profile for the current user.
    pub fn store(&self, profile: &StudentProfile) {
        self.cache.set(ENTRY_KEY, profile, None);
    }

    /// Drops any cached profile (used at logout).
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TOKEN_STORAGE_KEY;
    use crate::storage::MemoryStorage;
    use crate::token::make_token;
    use serde_json::json;

    fn sample_profile() -> StudentProfile {
        StudentProfile {
            student_id: "2022416001".to_string(),
            student_name: "Han Mei".to_string(),
            college: "School of Computer Science".to_string(),
            major: "Software Engineering".to_string(),
            class_name: "SE-2022-3".to_string(),
        }
    }

    fn logged_in_storage(student_id: &str) -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({ "sub": student_id })));
        storage
    }

    #[test]
    fn test_store_then_load() {
        let store = ProfileStore::new(logged_in_storage("s1"));

        store.store(&sample_profile());

        assert_eq!(store.load(), Some(sample_profile()));
        assert!(store.available());
    }

    #[test]
    fn test_load_without_store_is_none() {
        let store = ProfileStore::new(logged_in_storage("s1"));
        assert_eq!(store.load(), None);
        assert!(!store.available());
    }

    #[test]
    fn test_profile_not_served_across_users() {
        let storage = logged_in_storage("user-a");
        let store = ProfileStore::new(&storage);

        store.store(&sample_profile());
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "user-b"})));

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_clear_drops_cached_profile() {
        let store = ProfileStore::new(logged_in_storage("s1"));

        store.store(&sample_profile());
        store.clear();

        assert_eq!(store.load(), None);
    }
}
