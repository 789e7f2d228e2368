//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SCHOOLHOUSE_API_URL` - Backend API base URL (default: `http://localhost:8081/api`)
//! - `SCHOOLHOUSE_SESSION_FILE` - Where the session is persisted (default: `.schoolhouse/session.json`)
//! - `SCHOOLHOUSE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SCHOOLHOUSE_TOAST_SECS` - Dashboard message lifetime (default: 3)
//! - `SCHOOLHOUSE_LOGIN_TOAST_SECS` - Login/register message lifetime (default: 5)
//! - `SCHOOLHOUSE_LOGIN_REDIRECT_MS` - Pause before entering the dashboard (default: 1000)
//! - `SCHOOLHOUSE_REGISTER_REDIRECT_MS` - Pause before returning to login (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Share of error events sent, 0.0 to 1.0 (default: 1.0)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8081/api";
const DEFAULT_SESSION_FILE: &str = ".schoolhouse/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API base URL, e.g. `http://localhost:8081/api`
    pub api_url: Url,
    /// File backing the persisted session
    pub session_file: PathBuf,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Lifetime of dashboard messages
    pub toast_ttl: Duration,
    /// Lifetime of login/register messages
    pub login_toast_ttl: Duration,
    /// Pause between a successful login and the dashboard
    pub login_redirect_delay: Duration,
    /// Pause between a successful registration and the login screen
    pub register_redirect_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Share of error events sent to Sentry
    pub sentry_sample_rate: f32,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("SCHOOLHOUSE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = parse_api_url(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SCHOOLHOUSE_API_URL".to_string(), e))?;

        let session_file = lookup("SCHOOLHOUSE_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        Ok(Self {
            api_url,
            session_file,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SCHOOLHOUSE_REQUEST_TIMEOUT_SECS",
                30,
            )?),
            toast_ttl: Duration::from_secs(parse_or(&lookup, "SCHOOLHOUSE_TOAST_SECS", 3)?),
            login_toast_ttl: Duration::from_secs(parse_or(
                &lookup,
                "SCHOOLHOUSE_LOGIN_TOAST_SECS",
                5,
            )?),
            login_redirect_delay: Duration::from_millis(parse_or(
                &lookup,
                "SCHOOLHOUSE_LOGIN_REDIRECT_MS",
                1000,
            )?),
            register_redirect_delay: Duration::from_millis(parse_or(
                &lookup,
                "SCHOOLHOUSE_REGISTER_REDIRECT_MS",
                2000,
            )?),
            sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|s| !s.is_empty()),
            sentry_sample_rate: parse_rate(&lookup, "SENTRY_SAMPLE_RATE")?,
        })
    }

    /// Configuration pointing at `api_url` with every other value defaulted
    /// and the redirect pauses removed.
    #[must_use]
    pub fn for_api(api_url: Url, session_file: PathBuf) -> Self {
        Self {
            api_url,
            session_file,
            request_timeout: Duration::from_secs(30),
            toast_ttl: Duration::from_secs(3),
            login_toast_ttl: Duration::from_secs(5),
            login_redirect_delay: Duration::ZERO,
            register_redirect_delay: Duration::ZERO,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        }
    }
}

/// Parse the API base URL, which must be http(s) with a host.
fn parse_api_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme: {}", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("URL must have a host".to_string());
    }
    Ok(url)
}

/// Parse an optional numeric variable, falling back to `default`.
fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnvVar(key.to_string(), e.to_string())
            })
    })
}

/// Parse an optional rate in `0.0..=1.0`, defaulting to 1.0.
fn parse_rate<F>(lookup: &F, key: &str) -> Result<f32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(1.0);
    };
    let invalid = |reason: String| ConfigError::InvalidEnvVar(key.to_string(), reason);

    let rate: f32 = value.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(invalid(format!("{rate} is outside 0.0..=1.0")))
    }
}
