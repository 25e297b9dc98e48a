//! Identity-bound expiring cache
//!
//! This module provides a cache that stores short-lived values in local
//! key-value storage, bound to the user the data was fetched for. Entries
//! are invalidated lazily at read time; there is no background sweep, so
//! expiry is only ever observable through `get`.

mod keyed;

pub use keyed::{KeyedCache, TOKEN_STORAGE_KEY};
