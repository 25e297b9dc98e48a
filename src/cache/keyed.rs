//! Expiring, identity-bound cache over local key-value storage
//!
//! Provides a `KeyedCache` that serializes entries as JSON strings under
//! namespaced storage keys. An entry is only served while it is younger
//! than the cache's max age, owned by the currently logged-in user, and
//! (for partitioned caches) stored under the requested partition key.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::storage::Storage;
use crate::token::{derive_identity, Identity};

/// Storage key under which the login token is kept
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Default freshness window for cached entries
const DEFAULT_MAX_AGE_MINUTES: i64 = 30;

/// Wrapper for a cached value as stored in the key-value store
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached value
    payload: T,
    /// When the value was cached
    created_at: DateTime<Utc>,
    /// Identity the value was fetched for
    owner_key: String,
    /// Optional secondary key (e.g., an academic-week identifier)
    partition_key: Option<String>,
}

/// Expiring, identity-bound cache over an injected [`Storage`]
///
/// An entry read through [`get`](KeyedCache::get) is served only if all of
/// the following hold, otherwise it is removed and the read is a miss:
///
/// * it is younger than the cache's max age,
/// * its owner key matches the identity derived from the currently stored
///   login token (so a token swap can never leak another user's data),
/// * its partition key equals the requested one (`None` matches only
///   entries stored without a partition).
///
/// Invalidation is lazy: nothing expires until it is read. Misses are
/// indistinguishable from absent entries, and corrupted stored blobs are
/// treated as misses, never as errors.
#[derive(Debug)]
pub struct KeyedCache<S: Storage> {
    /// Backing key-value store, shared with the session
    storage: S,
    /// Prefix isolating this cache's entries from other namespaces
    namespace: String,
    /// Freshness window for entries
    max_age: Duration,
    /// Storage key of the login token used for identity binding
    token_key: String,
}

impl<S: Storage> KeyedCache<S> {
    /// Creates a cache over `storage`, isolated under `namespace`.
    pub fn new(storage: S, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
            max_age: Duration::minutes(DEFAULT_MAX_AGE_MINUTES),
            token_key: TOKEN_STORAGE_KEY.to_string(),
        }
    }

    /// Overrides the freshness window.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Overrides the storage key the login token is read from.
    #[allow(dead_code)]
    pub fn with_token_key(mut self, token_key: impl Into<String>) -> Self {
        self.token_key = token_key.into();
        self
    }

    /// Derives the current user identity from the stored login token.
    ///
    /// Returns `None` when no token is stored; see
    /// [`derive_identity`](crate::token::derive_identity) for the
    /// claim/raw-prefix derivation.
    pub fn identity(&self) -> Option<Identity> {
        let token = self.storage.get_item(&self.token_key)?;
        Some(derive_identity(&token))
    }

    /// Caches `value` under `key`, bound to the current identity.
    ///
    /// Overwrites any existing entry at `key` (last write wins). A silent
    /// no-op when no identity is available: with nobody to bind the entry
    /// to, caching it would risk serving it to the next user.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, partition: Option<&str>) {
        self.set_at(key, value, partition, Utc::now());
    }

    /// Returns the cached value at `key` if the entry is still valid.
    ///
    /// Any validity violation (age, owner, partition, unparsable blob)
    /// removes the entry and returns `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, partition: Option<&str>) -> Option<T> {
        self.get_at(key, partition, Utc::now())
    }

    /// Unconditionally removes the entry at `key`.
    pub fn invalidate(&self, key: &str) {
        let mut index = self.read_index();
        index.retain(|k| k != key);
        self.write_index(&index);
        self.storage.remove_item(&self.entry_key(key));
    }

    /// Removes every entry in this cache's namespace.
    ///
    /// Used at logout. Deliberately independent of the current identity:
    /// the whole namespace is being torn down.
    pub fn invalidate_all(&self) {
        for key in self.read_index() {
            self.storage.remove_item(&self.entry_key(&key));
        }
        self.storage.remove_item(&self.index_key());
    }

    /// Clock-injectable form of [`set`](KeyedCache::set).
    pub(crate) fn set_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        partition: Option<&str>,
        now: DateTime<Utc>,
    ) {
        let identity = match self.identity() {
            Some(identity) => identity,
            None => return,
        };

        let entry = CacheEntry {
            payload: value,
            created_at: now,
            owner_key: identity.as_str().to_string(),
            partition_key: partition.map(str::to_string),
        };

        // A value that cannot be serialized is simply not cached.
        if let Ok(json) = serde_json::to_string(&entry) {
            self.storage.set_item(&self.entry_key(key), &json);
            let mut index = self.read_index();
            if !index.iter().any(|k| k == key) {
                index.push(key.to_string());
                self.write_index(&index);
            }
        }
    }

    /// Clock-injectable form of [`get`](KeyedCache::get).
    pub(crate) fn get_at<T: DeserializeOwned>(
        &self,
        key: &str,
        partition: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<T> {
        let raw = self.storage.get_item(&self.entry_key(key))?;

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(_) => {
                // Corrupted blob: same as a miss.
                self.invalidate(key);
                return None;
            }
        };

        let owner_matches = self
            .identity()
            .map(|identity| identity.as_str() == entry.owner_key)
            .unwrap_or(false);
        let fresh = now.signed_duration_since(entry.created_at) < self.max_age;
        let partition_matches = entry.partition_key.as_deref() == partition;

        if !(fresh && owner_matches && partition_matches) {
            self.invalidate(key);
            return None;
        }

        Some(entry.payload)
    }

    /// Namespaced storage key for a logical cache key.
    fn entry_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Storage key of the namespace's key index.
    ///
    /// The index is what lets `invalidate_all` work against a storage
    /// contract that has no enumeration operation.
    fn index_key(&self) -> String {
        format!("{}:__keys__", self.namespace)
    }

    /// Reads the list of logical keys this cache has written.
    fn read_index(&self) -> Vec<String> {
        self.storage
            .get_item(&self.index_key())
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Persists the key index, dropping it entirely when empty.
    fn write_index(&self, index: &[String]) {
        if index.is_empty() {
            self.storage.remove_item(&self.index_key());
        } else if let Ok(json) = serde_json::to_string(index) {
            self.storage.set_item(&self.index_key(), &json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::token::make_token;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample() -> TestData {
        TestData {
            name: "schedule".to_string(),
            value: 42,
        }
    }

    fn logged_in_cache(student_id: &str) -> KeyedCache<MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({ "sub": student_id })));
        KeyedCache::new(storage, "test")
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let cache = logged_in_cache("s1");

        cache.set("k", &sample(), None);

        let result: Option<TestData> = cache.get("k", None);
        assert_eq!(result, Some(sample()));
    }

    #[test]
    fn test_set_then_get_with_matching_partition() {
        let cache = logged_in_cache("s1");

        cache.set("k", &sample(), Some("2024-52"));

        let result: Option<TestData> = cache.get("k", Some("2024-52"));
        assert_eq!(result, Some(sample()));
    }

    #[test]
    fn test_partition_mismatch_is_a_miss_and_purges() {
        let cache = logged_in_cache("s1");

        cache.set("k", &sample(), Some("2024-52"));

        let result: Option<TestData> = cache.get("k", Some("2025-01"));
        assert_eq!(result, None);

        // The mismatched read must have removed the entry
        let again: Option<TestData> = cache.get("k", Some("2024-52"));
        assert_eq!(again, None);
    }

    #[test]
    fn test_none_partition_matches_only_none() {
        let cache = logged_in_cache("s1");

        cache.set("k", &sample(), Some("2024-52"));
        let result: Option<TestData> = cache.get("k", None);
        assert_eq!(result, None);

        cache.set("k2", &sample(), None);
        let result: Option<TestData> = cache.get("k2", Some("2024-52"));
        assert_eq!(result, None);
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let cache = logged_in_cache("s1");
        let result: Option<TestData> = cache.get("never-set", None);
        assert_eq!(result, None);
    }

    #[test]
    fn test_set_without_identity_is_a_noop() {
        let storage = MemoryStorage::new();
        let cache = KeyedCache::new(&storage, "test");

        cache.set("k", &sample(), None);

        assert!(storage.is_empty(), "Nothing should be written without a token");
    }

    #[test]
    fn test_token_swap_purges_other_users_entry() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "user-a"})));
        let cache = KeyedCache::new(&storage, "test");

        cache.set("profile", &sample(), None);

        // Simulate logging in as a different user
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "user-b"})));

        let result: Option<TestData> = cache.get("profile", None);
        assert_eq!(result, None, "User B must never see user A's data");
        assert_eq!(
            storage.get_item("test:profile"),
            None,
            "The stale entry should be purged"
        );
    }

    #[test]
    fn test_removed_token_makes_entries_misses() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "s1"})));
        let cache = KeyedCache::new(&storage, "test");

        cache.set("k", &sample(), None);
        storage.remove_item(TOKEN_STORAGE_KEY);

        let result: Option<TestData> = cache.get("k", None);
        assert_eq!(result, None);
    }

    #[test]
    fn test_entry_expires_after_max_age() {
        let cache = logged_in_cache("s1").with_max_age(Duration::minutes(10));
        let t0 = Utc::now();

        cache.set_at("k", &sample(), None, t0);

        // Just inside the window
        let fresh: Option<TestData> = cache.get_at("k", None, t0 + Duration::minutes(9));
        assert_eq!(fresh, Some(sample()));

        // Past the window: miss, and the entry is gone
        let stale: Option<TestData> = cache.get_at("k", None, t0 + Duration::minutes(11));
        assert_eq!(stale, None);
        let again: Option<TestData> = cache.get_at("k", None, t0);
        assert_eq!(again, None);
    }

    #[test]
    fn test_age_exactly_max_age_is_stale() {
        let cache = logged_in_cache("s1").with_max_age(Duration::minutes(10));
        let t0 = Utc::now();

        cache.set_at("k", &sample(), None, t0);

        let result: Option<TestData> = cache.get_at("k", None, t0 + Duration::minutes(10));
        assert_eq!(result, None);
    }

    #[test]
    fn test_corrupted_blob_is_a_miss_and_purges() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "s1"})));
        storage.set_item("test:k", "{not valid json");
        let cache = KeyedCache::new(&storage, "test");

        let result: Option<TestData> = cache.get("k", None);
        assert_eq!(result, None);
        assert_eq!(storage.get_item("test:k"), None);
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let cache = logged_in_cache("s1");
        let second = TestData {
            name: "updated".to_string(),
            value: 7,
        };

        cache.set("k", &sample(), None);
        cache.set("k", &second, None);

        let result: Option<TestData> = cache.get("k", None);
        assert_eq!(result, Some(second));
    }

    #[test]
    fn test_invalidate_removes_single_entry() {
        let cache = logged_in_cache("s1");

        cache.set("a", &sample(), None);
        cache.set("b", &sample(), None);
        cache.invalidate("a");

        let a: Option<TestData> = cache.get("a", None);
        let b: Option<TestData> = cache.get("b", None);
        assert_eq!(a, None);
        assert_eq!(b, Some(sample()));
    }

    #[test]
    fn test_invalidate_all_clears_every_entry() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "s1"})));
        let cache = KeyedCache::new(&storage, "test");

        cache.set("a", &sample(), None);
        cache.set("b", &sample(), Some("2024-52"));
        cache.set("c", &sample(), None);

        cache.invalidate_all();

        let a: Option<TestData> = cache.get("a", None);
        let b: Option<TestData> = cache.get("b", Some("2024-52"));
        let c: Option<TestData> = cache.get("c", None);
        assert_eq!((a, b, c), (None, None, None));

        // Only the token remains in the backing store
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_invalidate_all_works_without_identity() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "s1"})));
        let cache = KeyedCache::new(&storage, "test");
        cache.set("a", &sample(), None);

        // Logout removes the token before tearing the namespace down
        storage.remove_item(TOKEN_STORAGE_KEY);
        cache.invalidate_all();

        assert!(storage.is_empty());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, &make_token(&json!({"sub": "s1"})));
        let profile = KeyedCache::new(&storage, "profile");
        let schedule = KeyedCache::new(&storage, "schedule");

        profile.set("k", &sample(), None);
        schedule.set("k", &sample(), None);

        profile.invalidate_all();

        let p: Option<TestData> = profile.get("k", None);
        let s: Option<TestData> = schedule.get("k", None);
        assert_eq!(p, None);
        assert_eq!(s, Some(sample()));
    }

    #[test]
    fn test_identity_uses_raw_prefix_for_opaque_token() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_STORAGE_KEY, "an-opaque-session-string-with-no-dots");
        let cache = KeyedCache::new(&storage, "test");

        cache.set("k", &sample(), None);

        // Same opaque token, same derived identity: still a hit
        let result: Option<TestData> = cache.get("k", None);
        assert_eq!(result, Some(sample()));
    }
}
