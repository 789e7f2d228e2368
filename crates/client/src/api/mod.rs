//! School-management REST API client.
//!
//! Thin typed wrapper over the backend's REST surface. Every call is a single
//! attempt: no retries, no backoff, no token refresh.
//!
//! # API Reference
//!
//! - Base URL: configured via `SCHOOLHOUSE_API_URL` (e.g. `http://localhost:8081/api`)
//! - Authentication: `Authorization: Bearer <token>` on every call except
//!   `/auth/*` and `/health`
//! - 401 and 403 both map to [`ApiError::Unauthorized`]

mod auth;
mod types;
mod users;

pub use types::{HealthStatus, LoginResponse, NewAccount};

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// School-management API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    /// API base URL without a trailing slash.
    base_url: String,
    /// Health endpoint, which lives at the server root rather than under the API prefix.
    health_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the health URL
    /// cannot be derived from the base URL.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let health_url = config
            .api_url
            .join("/health")
            .map_err(|e| ApiError::Decode(format!("Invalid API URL: {e}")))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_owned(),
                health_url,
            }),
        })
    }

    /// The API base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute an authenticated GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Self::handle_json(response).await
    }

    /// Execute an authenticated request with a JSON body, ignoring the response body.
    pub(crate) async fn send_json<B: serde::Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .request(method, self.url(path))
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    /// Execute an authenticated request without a body, ignoring the response body.
    pub(crate) async fn send_empty(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .request(method, self.url(path))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    /// Execute an unauthenticated POST with a JSON body.
    pub(crate) async fn post_public<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        Ok(self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?)
    }

    /// Handle API response and parse JSON.
    pub(crate) async fn handle_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Handle an API response whose body is not needed.
    pub(crate) async fn handle_empty(response: reqwest::Response) -> Result<(), ApiError> {
        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::parse_error(response).await)
    }

    /// Turn a non-2xx response into an [`ApiError`].
    pub(crate) async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return ApiError::Unauthorized {
                status: status.as_u16(),
            };
        }

        // The backend sends plain-text rejection messages
        let message = response.text().await.unwrap_or_default();

        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn client_for(url: &str) -> ApiClient {
        let config = ClientConfig::for_api(Url::parse(url).unwrap(), PathBuf::from("unused"));
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = client_for("http://localhost:8081/api/");
        assert_eq!(client.base_url(), "http://localhost:8081/api");
        assert_eq!(client.url("/students"), "http://localhost:8081/api/students");
    }

    #[test]
    fn test_health_url_is_at_server_root() {
        let client = client_for("http://localhost:8081/api");
        assert_eq!(client.inner.health_url.as_str(), "http://localhost:8081/health");
    }
}
