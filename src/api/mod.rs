//! Typed bindings for the Motorent REST backend
//!
//! One module per backend resource. Every function takes the shared
//! [`ApiClient`] plus, for authenticated endpoints, the bearer token; none
//! of them touch session state. Failure classification lives in
//! [`ApiError`], which callers use to decide between surfacing a message
//! and forcing a logout.

pub mod auth;
pub mod bookings;
pub mod cars;
pub mod common;
pub mod reviews;
pub mod users;

use std::time::Duration;

use crate::config::ApiConfig;

/// Shared HTTP client for the rental backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.put(self.url(path))
    }

    pub(crate) fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.patch(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.delete(self.url(path))
    }
}

/// Classified failures of a backend call.
///
/// The kinds matter to callers in different ways: `Rejected` carries the
/// backend's message verbatim, `Unauthorized` means the token is dead and
/// the session must be torn down, and `Network` means nothing can be
/// assumed about server state. Input caught before the network is a
/// service-level concern and never reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend refused the request (bad credentials, conflicts, not
    /// found); the message is the backend's own
    #[error("{0}")]
    Rejected(String),

    /// The bearer token was missing, invalid, or expired
    #[error("session rejected by server: {0}")]
    Unauthorized(String),

    /// The request never completed (connectivity, timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a payload we cannot decode
    #[error("unexpected response from server: {0}")]
    Malformed(String),
}

impl ApiError {
    /// True for failures that mean the current token is no longer usable.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}
