//! Login-token lifecycle over local storage
//!
//! The token is written at login, read on every resume, and removed at
//! logout or whenever the server authoritatively rejects it. Local
//! validity checks are a UX convenience only; a 401 from the network
//! layer always wins, even for a token that still looks live here.

use crate::cache::TOKEN_STORAGE_KEY;
use crate::storage::Storage;
use crate::token::{derive_identity, is_valid, Identity};

/// The stored login credential and the operations on it
#[derive(Debug)]
pub struct Session<S: Storage> {
    storage: S,
}

impl<S: Storage> Session<S> {
    /// Creates a session over the given storage collaborator.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the stored token string, if any.
    pub fn token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_STORAGE_KEY)
    }

    /// Stores a freshly issued token.
    pub fn set_token(&self, token: &str) {
        self.storage.set_item(TOKEN_STORAGE_KEY, token);
    }

    /// Removes the stored token.
    ///
    /// Callers tearing down a login must also clear the identity-bound
    /// caches; see [`Assistant::logout`](crate::app::Assistant::logout).
    pub fn clear_token(&self) {
        self.storage.remove_item(TOKEN_STORAGE_KEY);
    }

    /// Whether a stored token exists and still decodes as live.
    ///
    /// Gates navigation only; the server remains authoritative.
    pub fn is_logged_in(&self) -> bool {
        self.token().map(|t| is_valid(&t)).unwrap_or(false)
    }

    /// Identity derived from the stored token, if one is stored.
    pub fn identity(&self) -> Option<Identity> {
        self.token().map(|t| derive_identity(&t))
    }
}
