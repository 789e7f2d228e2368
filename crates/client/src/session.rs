//! Session manager.
//!
//! Owns the persisted credential (bearer token, role, email). It is the only
//! writer of the [`SessionStore`]; the dashboard reads the [`Session`] it is
//! given and hands control back through [`SessionManager::invalidate`] when
//! the server rejects the token.
//!
//! # Lifecycle
//!
//! ```text
//! login ──► persisted ──► load_session ──► verify_session ──► dashboard
//!                │                               │
//!                └── logout / 401 / 403 ◄────────┘   (store cleared, login screen)
//! ```

use std::sync::Arc;
use std::time::Duration;

use schoolhouse_core::Role;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::api::{ApiClient, NewAccount};
use crate::config::ClientConfig;
use crate::error::{ActionError, ApiError};
use crate::navigator::{Navigator, Screen};
use crate::notify::{Notifier, ToastKind};
use crate::store::{SessionStore, StoreError};

/// Store keys, named after the backend's login response fields.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";
}

const LOGIN_FAILED: &str = "Invalid username or password";
const LOGIN_OK: &str = "Login successful!";
const REGISTER_FAILED: &str = "Registration failed";
const REGISTER_OK: &str = "Registration successful! Please login.";
const SESSION_INVALID: &str = "Your session is invalid. Please login again.";
const SESSION_EXPIRED: &str = "Session expired or unauthorized. Redirecting to login...";
const NETWORK_ERROR: &str = "Network error. Please try again.";
const VERIFY_NETWORK_ERROR: &str = "Network error";

/// The locally held proof of authentication plus cached role and email.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    role: Role,
    email: String,
}

impl Session {
    /// Create a session.
    #[must_use]
    pub fn new(token: impl Into<String>, role: Role, email: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            role,
            email: email.into(),
        }
    }

    /// Bearer token sent on every authenticated request.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// Role reported by the server at login.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Email reported by the server at login.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether the session may use the administration features.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .field("email", &self.email)
            .finish()
    }
}

/// Session manager shared by the login screens and the dashboard.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    api: ApiClient,
    store: Box<dyn SessionStore>,
    navigator: Navigator,
    notifier: Notifier,
    login_toast_ttl: Duration,
    login_redirect_delay: Duration,
    register_redirect_delay: Duration,
}

impl SessionManager {
    /// Create a session manager.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        api: ApiClient,
        store: impl SessionStore + 'static,
        navigator: Navigator,
        notifier: Notifier,
    ) -> Self {
        Self {
            inner: Arc::new(SessionManagerInner {
                api,
                store: Box::new(store),
                navigator,
                notifier,
                login_toast_ttl: config.login_toast_ttl,
                login_redirect_delay: config.login_redirect_delay,
                register_redirect_delay: config.register_redirect_delay,
            }),
        }
    }

    /// The API client used for every request.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Shared screen handle.
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }

    /// Shared message slot.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Read the persisted session.
    ///
    /// Without a token the store is cleared and the login screen shown; no
    /// request is made. A missing or unrecognised role loads as
    /// [`Role::Unknown`].
    pub fn load_session(&self) -> Option<Session> {
        match self.read_session() {
            Ok(Some(session)) => Some(session),
            Ok(None) => {
                tracing::info!("No token found, redirecting to login");
                self.clear_store();
                self.inner.navigator.go(Screen::Login);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session store unreadable, redirecting to login");
                self.clear_store();
                self.inner.navigator.go(Screen::Login);
                None
            }
        }
    }

    /// Whether a token is persisted. Unlike [`Self::load_session`] this has
    /// no side effects.
    #[must_use]
    pub fn has_stored_token(&self) -> bool {
        matches!(self.read_session(), Ok(Some(_)))
    }

    fn read_session(&self) -> Result<Option<Session>, StoreError> {
        let store = &self.inner.store;
        let Some(token) = store.get(keys::TOKEN)?.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let role = store
            .get(keys::ROLE)?
            .and_then(|r| r.parse().ok())
            .unwrap_or(Role::Unknown);
        let email = store.get(keys::EMAIL)?.unwrap_or_default();

        Ok(Some(Session::new(token, role, email)))
    }

    /// Check the session against a protected endpoint.
    ///
    /// Returns `false` and resets to the login screen when the server answers
    /// 401 or 403. Any other answer counts as valid for the rest of the run.
    /// A transport failure returns `false`, shows "Network error" and keeps
    /// the stored session.
    #[instrument(skip(self, session), fields(role = %session.role()))]
    pub async fn verify_session(&self, session: &Session) -> bool {
        match self.inner.api.students(session.token()).await {
            Ok(_) => {
                tracing::debug!("Authentication verified");
                true
            }
            Err(ApiError::Unauthorized { status }) => {
                tracing::warn!(status, "Authentication failed");
                self.inner.notifier.error(SESSION_INVALID);
                self.clear_store();
                self.inner.navigator.go(Screen::Login);
                false
            }
            Err(ApiError::Transport(e)) => {
                tracing::error!(error = %e, "Verification error");
                self.inner.notifier.error(VERIFY_NETWORK_ERROR);
                false
            }
            // A non-JSON 2xx is still an answer that did not reject the token,
            // unlike `is_transport`, which groups it with network failures.
            Err(e) => {
                tracing::debug!(error = %e, "Verification answered without rejecting the token");
                true
            }
        }
    }

    /// Exchange credentials for a session and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Failed` with the message shown to the user.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Session, ActionError> {
        let response = match self.inner.api.login(username, password).await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_transport() {
                    NETWORK_ERROR
                } else {
                    LOGIN_FAILED
                };
                tracing::info!(error = %e, "Login rejected");
                self.login_notice(ToastKind::Error, message);
                return Err(ActionError::Failed(message.to_owned()));
            }
        };

        let session = Session::new(response.token, response.role, response.email);
        if let Err(e) = self.persist(&session) {
            tracing::error!(error = %e, "Failed to persist session");
            self.clear_store();
            let message = format!("Could not save session: {e}");
            self.login_notice(ToastKind::Error, &message);
            return Err(ActionError::Failed(message));
        }

        tracing::info!(role = %session.role(), email = %session.email(), "Login successful");
        self.login_notice(ToastKind::Success, LOGIN_OK);

        tokio::time::sleep(self.inner.login_redirect_delay).await;
        self.inner.navigator.go(Screen::Dashboard);
        Ok(session)
    }

    /// Create an account, then return to the login screen.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Failed` with the server's text (or a generic
    /// message) when the backend refuses.
    #[instrument(skip(self, account), fields(username = %account.profile.username))]
    pub async fn register(&self, account: &NewAccount) -> Result<(), ActionError> {
        if let Err(e) = self.inner.api.register(account).await {
            let message = if e.is_transport() {
                NETWORK_ERROR.to_owned()
            } else {
                e.message_or(REGISTER_FAILED)
            };
            self.login_notice(ToastKind::Error, &message);
            return Err(ActionError::Failed(message));
        }

        self.login_notice(ToastKind::Success, REGISTER_OK);
        tokio::time::sleep(self.inner.register_redirect_delay).await;
        self.show_login();
        Ok(())
    }

    /// Forget the session and show the login screen.
    pub fn logout(&self) {
        tracing::info!("Logging out");
        self.clear_store();
        self.inner.navigator.go(Screen::Login);
    }

    /// Hand-off path for a 401/403 seen by the dashboard.
    pub fn invalidate(&self) {
        tracing::warn!("Session rejected by server");
        self.inner.notifier.error(SESSION_EXPIRED);
        self.clear_store();
        self.inner.navigator.go(Screen::Login);
    }

    /// Show the login form.
    ///
    /// Dismisses any visible message, like switching forms on the login page.
    pub fn show_login(&self) {
        self.inner.notifier.dismiss();
        self.inner.navigator.go(Screen::Login);
    }

    /// Show the registration form.
    pub fn show_register(&self) {
        self.inner.notifier.dismiss();
        self.inner.navigator.go(Screen::Register);
    }

    fn persist(&self, session: &Session) -> Result<(), StoreError> {
        let store = &self.inner.store;
        store.set(keys::TOKEN, session.token().expose_secret())?;
        store.set(keys::EMAIL, session.email())?;
        store.set(keys::ROLE, &session.role().to_string())?;
        Ok(())
    }

    fn clear_store(&self) {
        if let Err(e) = self.inner.store.clear() {
            tracing::error!(error = %e, "Failed to clear session store");
        }
    }

    fn login_notice(&self, kind: ToastKind, message: &str) {
        self.inner
            .notifier
            .show_for(kind, message, self.inner.login_toast_ttl);
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.inner.api)
            .field("screen", &self.inner.navigator.current())
            .finish_non_exhaustive()
    }
}
