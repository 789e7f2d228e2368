//! Request and response bodies for the school-management API.

use schoolhouse_core::{Profile, Role};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// A new account: the registration form and the admin "add user" forms.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct NewAccount {
    pub profile: Profile,
    pub password: SecretString,
    pub role: Role,
}

impl NewAccount {
    /// Build a new account.
    #[must_use]
    pub fn new(profile: Profile, password: impl Into<String>, role: Role) -> Self {
        Self {
            profile,
            password: SecretString::from(password.into()),
            role,
        }
    }

    /// The same account with its role tag replaced.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub(crate) fn to_request(&self) -> AccountRequest<'_> {
        AccountRequest {
            username: &self.profile.username,
            email: self.profile.email.as_str(),
            password: self.password.expose_secret(),
            department: &self.profile.department,
            role: self.role,
        }
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("profile", &self.profile)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Body of `POST /auth/register` and `POST /admin/users`.
#[derive(Debug, Serialize)]
pub(crate) struct AccountRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub department: &'a str,
    pub role: Role,
}

/// Body of `PUT /admin/users/{id}`.
#[derive(Debug, Serialize)]
pub(crate) struct ProfileUpdateRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub department: &'a str,
    pub role: Role,
}

impl<'a> ProfileUpdateRequest<'a> {
    pub(crate) fn new(profile: &'a Profile, role: Role) -> Self {
        Self {
            username: &profile.username,
            email: profile.email.as_str(),
            department: &profile.department,
            role,
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful response from `POST /auth/login`.
#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub username: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("username", &self.username)
            .finish()
    }
}

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    /// Whether the backend reports itself as up.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("UP")
    }
}
