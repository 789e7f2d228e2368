//! Authentication endpoints.
//!
//! Login exchanges a username and password for a bearer token; registration
//! creates an account and returns nothing the client needs.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::ApiClient;
use super::types::{LoginRequest, LoginResponse, NewAccount};
use crate::error::ApiError;

impl ApiClient {
    /// Authenticate with username and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Rejected` for bad
    /// credentials (the backend answers 400 or 401 depending on version).
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let response = self
            .post_public(
                "/auth/login",
                &LoginRequest {
                    username,
                    password: password.expose_secret(),
                },
            )
            .await?;
        let login: LoginResponse = Self::handle_json(response).await?;

        tracing::debug!(role = %login.role, "Login accepted");
        Ok(login)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` carrying the server's text when the
    /// username or email is taken.
    #[instrument(skip(self, account), fields(username = %account.profile.username, role = %account.role))]
    pub async fn register(&self, account: &NewAccount) -> Result<(), ApiError> {
        let response = self
            .post_public("/auth/register", &account.to_request())
            .await?;
        Self::handle_empty(response).await
    }
}
