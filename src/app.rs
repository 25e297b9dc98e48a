//! High-level assistant facade
//!
//! Wires the session, the identity-bound stores, and the API client into
//! the flows a front-end consumes: cache-first reads, login/logout, and
//! the unconditional local teardown a server-side 401 demands.

use chrono::NaiveDate;
use futures::future;

use crate::api::{ApiClient, ApiError};
use crate::data::{ClassTable, GradeRecord, GradeStats, ProfileStore, ScheduleStore, StudentProfile};
use crate::session::Session;
use crate::storage::Storage;

/// Everything the landing page needs in one fetch
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// The logged-in student's profile
    pub profile: StudentProfile,
    /// Full transcript
    pub grades: Vec<GradeRecord>,
    /// Aggregate statistics over the transcript
    pub stats: GradeStats,
}

/// Facade over session, caches, and API client
///
/// All reads are cache-first; network results are written back to the
/// caches so repeat queries inside the freshness window never leave the
/// device. Any [`ApiError::Unauthorized`] tears down the token and both
/// cache namespaces before being returned, even if the local token still
/// looked live (clock skew and server-side revocation both make the
/// server authoritative).
#[derive(Debug)]
pub struct Assistant<S: Storage + Clone> {
    session: Session<S>,
    profiles: ProfileStore<S>,
    schedules: ScheduleStore<S>,
    api: ApiClient,
}

impl<S: Storage + Clone> Assistant<S> {
    /// Creates an assistant talking to `base_url`, persisting through
    /// `storage`.
    pub fn new(base_url: impl Into<String>, storage: S) -> Self {
        Self {
            session: Session::new(storage.clone()),
            profiles: ProfileStore::new(storage.clone()),
            schedules: ScheduleStore::new(storage),
            api: ApiClient::new(base_url),
        }
    }

    /// The underlying session, for navigation gating.
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Authenticates and stores the issued token.
    pub async fn login(&self, student_id: &str, password: &str) -> Result<(), ApiError> {
        let token = self.api.login(student_id, password).await?;
        self.session.set_token(&token);
        Ok(())
    }

    /// Clears the token and every identity-bound cache namespace.
    pub fn logout(&self) {
        self.session.clear_token();
        self.profiles.clear();
        self.schedules.clear();
    }

    /// Returns the student profile, from cache when fresh.
    pub async fn profile(&self) -> Result<StudentProfile, ApiError> {
        if let Some(profile) = self.profiles.load() {
            return Ok(profile);
        }

        let token = self.require_token()?;
        let profile = self.guard(self.api.fetch_profile(&token).await)?;
        self.profiles.store(&profile);
        Ok(profile)
    }

    /// Returns the schedule for `date`'s week, from cache when fresh.
    pub async fn classtable(&self, date: NaiveDate) -> Result<ClassTable, ApiError> {
        if let Some(table) = self.schedules.load(date) {
            return Ok(table);
        }

        let token = self.require_token()?;
        let table = self.guard(self.api.fetch_classtable(&token, date).await)?;
        self.schedules.store(date, &table);
        Ok(table)
    }

    /// Fetches the transcript. Grades are not cached locally; the
    /// academic-affairs system updates them at unpredictable times.
    pub async fn grades(&self) -> Result<Vec<GradeRecord>, ApiError> {
        let token = self.require_token()?;
        self.guard(self.api.fetch_grades(&token).await)
    }

    /// Fetches profile and transcript concurrently and computes stats.
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        let (profile, grades) = future::try_join(self.profile(), self.grades()).await?;
        let stats = GradeStats::compute(&grades);
        Ok(Dashboard {
            profile,
            grades,
            stats,
        })
    }

    /// The stored token, or `Unauthorized` (with local teardown) when
    /// there is none.
    fn require_token(&self) -> Result<String, ApiError> {
        match self.session.token() {
            Some(token) => Ok(token),
            None => Err(ApiError::Unauthorized),
        }
    }

    /// Applies the 401 contract to an API result: an `Unauthorized`
    /// clears the token and all identity-bound caches before it is
    /// handed back to the caller.
    fn guard<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if matches!(result, Err(ApiError::Unauthorized)) {
            self.logout();
        }
        result
    }
}
