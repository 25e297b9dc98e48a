//! Campus Assist core library
//!
//! Client-side core of a university academic-affairs assistant: login
//! token handling, identity-bound expiring caches for profile and
//! schedule data, grade statistics, and the backend API client. No UI;
//! a front-end consumes the [`app::Assistant`] facade or the individual
//! modules directly.

pub mod api;
pub mod app;
pub mod cache;
pub mod data;
pub mod session;
pub mod storage;
pub mod token;
pub mod week;
