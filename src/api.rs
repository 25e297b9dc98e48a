//! Academic-affairs backend API client
//!
//! This module provides an async client for the backing service: login,
//! profile, class-schedule, and grade queries. Responses arrive in a
//! `{success/code, message/detail, data}` envelope which is unwrapped
//! here; a 401 is surfaced as [`ApiError::Unauthorized`] and must be
//! treated by the caller as an authoritative logout signal, regardless
//! of what local token checks report.

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::data::{ClassTable, Course, GradeRecord, StudentProfile};
use crate::week::week_identifier;

/// Errors that can occur when talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse a JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The server rejected the credential (401); the caller must clear
    /// the token and all identity-bound caches and force re-login
    #[error("Unauthorized: the session is no longer accepted by the server")]
    Unauthorized,

    /// Any other non-success response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A success envelope without its `data` payload
    #[error("Response envelope is missing its data payload")]
    MissingData,
}

/// Standard response envelope used by the backend
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: Option<bool>,
    code: Option<i64>,
    message: Option<String>,
    detail: Option<String>,
    data: Option<T>,
}

/// Login endpoint response (not enveloped)
#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: Option<String>,
}

/// Wire form of the class-schedule payload
#[derive(Debug, Deserialize)]
struct ClassTablePayload {
    courses: Vec<Course>,
}

/// Client for the academic-affairs backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the service at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Creates a client with a custom HTTP client.
    #[allow(dead_code)]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Authenticates and returns the issued access token.
    ///
    /// # Errors
    /// * `ApiError::Unauthorized` - wrong credentials
    /// * `ApiError::Server` / `RequestFailed` / `ParseError` otherwise
    pub async fn login(&self, student_id: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/v1/auth/login", self.base_url);
        let body = serde_json::json!({
            "student_id": student_id,
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        parse_login(status, &text)
    }

    /// Fetches the logged-in student's profile.
    pub async fn fetch_profile(&self, token: &str) -> Result<StudentProfile, ApiError> {
        let url = format!("{}/api/v1/profile", self.base_url);
        let (status, text) = self.get_authorized(&url, token).await?;
        parse_payload(status, &text)
    }

    /// Fetches the class schedule for the week containing `date`.
    pub async fn fetch_classtable(
        &self,
        token: &str,
        date: NaiveDate,
    ) -> Result<ClassTable, ApiError> {
        let url = format!(
            "{}/api/v1/classtable?date={}",
            self.base_url,
            date.format("%Y-%m-%d")
        );
        let (status, text) = self.get_authorized(&url, token).await?;
        let payload: ClassTablePayload = parse_payload(status, &text)?;

        Ok(ClassTable {
            date,
            week_id: week_identifier(date),
            courses: payload.courses,
        })
    }

    /// Fetches the full transcript.
    pub async fn fetch_grades(&self, token: &str) -> Result<Vec<GradeRecord>, ApiError> {
        let url = format!("{}/api/v1/grades", self.base_url);
        let (status, text) = self.get_authorized(&url, token).await?;
        parse_payload(status, &text)
    }

    /// Issues a bearer-authorized GET and returns status and body text.
    async fn get_authorized(&self, url: &str, token: &str) -> Result<(u16, String), ApiError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Unwraps a standard envelope response into its data payload.
fn parse_payload<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if status == 401 {
        return Err(ApiError::Unauthorized);
    }

    let envelope: Envelope<T> = serde_json::from_str(body)?;
    let accepted = status == 200
        && (envelope.success.unwrap_or(false) || envelope.code == Some(200));

    if !accepted {
        return Err(ApiError::Server {
            status,
            message: envelope
                .detail
                .or(envelope.message)
                .unwrap_or_else(|| "request failed".to_string()),
        });
    }

    envelope.data.ok_or(ApiError::MissingData)
}

/// Parses the (un-enveloped) login response.
fn parse_login(status: u16, body: &str) -> Result<String, ApiError> {
    if status == 401 {
        return Err(ApiError::Unauthorized);
    }
    if status != 200 {
        let message = serde_json::from_str::<Envelope<()>>(body)
            .ok()
            .and_then(|e| e.detail.or(e.message))
            .unwrap_or_else(|| "login failed".to_string());
        return Err(ApiError::Server { status, message });
    }

    let response: LoginResponse = serde_json::from_str(body)?;
    Ok(response.access_token)
}
