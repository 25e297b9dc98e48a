//! Local key-value storage collaborators
//!
//! The caches and the session only require a synchronous string key-value
//! store. [`MemoryStorage`] backs tests and short-lived processes;
//! [`FileStorage`] persists each key as a file under an XDG cache
//! directory.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

/// Synchronous key-value storage contract
///
/// Methods take `&self`: implementations use interior mutability so a
/// session and several caches can share one store. Execution is assumed
/// single-threaded and non-reentrant; operations run to completion.
pub trait Storage {
    /// Returns the stored value for `key`, if any.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set_item(&self, key: &str, value: &str);

    /// Removes any value stored under `key`.
    fn remove_item(&self, key: &str);
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }
}
