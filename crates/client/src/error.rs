//! Error types shared by the session manager and the dashboard.

use thiserror::Error;

/// Errors that can occur when talking to the school-management API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the credential (401 or 403).
    #[error("Unauthorized: HTTP {status}")]
    Unauthorized { status: u16 },

    /// The server answered with any other non-2xx status.
    #[error("API error: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// A 2xx response carried a body the client could not decode.
    #[error("Parse error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether this error must invalidate the session.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether no usable response was received.
    ///
    /// Undecodable bodies count as transport failures: the user sees the same
    /// network message either way.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Decode(_))
    }

    /// The server's rejection text, if it sent a non-blank one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// The server text when present, otherwise `fallback`.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_owned()
    }
}

/// Outcome of a user action that did not complete.
///
/// The `Display` text is exactly the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The user declined the confirmation prompt; nothing was sent.
    #[error("Cancelled")]
    Cancelled,

    /// Client-side validation failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The server rejected the session; the user is back on the login screen.
    #[error("Session expired or unauthorized. Redirecting to login...")]
    SessionExpired,

    /// The request failed (transport or application-level rejection).
    #[error("{0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_requires_text() {
        let err = ApiError::Rejected {
            status: 400,
            message: "Email already exists".to_string(),
        };
        assert_eq!(err.message_or("Failed to add student"), "Email already exists");

        let err = ApiError::Rejected {
            status: 400,
            message: "  ".to_string(),
        };
        assert_eq!(err.message_or("Failed to add student"), "Failed to add student");
    }

    #[test]
    fn test_auth_failure_classification() {
        assert!(ApiError::Unauthorized { status: 401 }.is_auth_failure());
        assert!(ApiError::Unauthorized { status: 403 }.is_auth_failure());
        assert!(
            !ApiError::Rejected {
                status: 500,
                message: String::new()
            }
            .is_auth_failure()
        );
        assert!(ApiError::Decode("eof".to_string()).is_transport());
    }

    #[test]
    fn test_action_error_display_is_user_message() {
        assert_eq!(
            ActionError::Validation("Please select both student and teacher".to_string())
                .to_string(),
            "Please select both student and teacher"
        );
        assert_eq!(
            ActionError::SessionExpired.to_string(),
            "Session expired or unauthorized. Redirecting to login..."
        );
    }
}
