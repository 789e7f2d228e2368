//! Email addresses.
//!
//! Values coming from the backend deserialize as-is: the server is the
//! source of truth and the client renders whatever it reports. Only form
//! input goes through [`Email::parse`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why form input was not accepted as an email address.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is required")]
    Blank,
    #[error("Email is longer than {max} characters")]
    TooLong { max: usize },
    /// No `@`, or nothing on one side of it.
    #[error("'{0}' is not an email address")]
    Malformed(String),
}

/// An account's email address.
///
/// ```
/// use schoolhouse_core::Email;
///
/// assert!(Email::parse("teacher@school.edu").is_ok());
/// assert!(Email::parse(" padded@school.edu ").is_ok());
/// assert!(Email::parse("no-at-symbol").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Longest address a form may submit (RFC 5321 path limit).
    pub const MAX_LENGTH: usize = 254;

    /// Validate form input, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error for blank, overlong or `@`-less input.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let input = input.trim();
        match input.split_once('@') {
            _ if input.is_empty() => Err(EmailError::Blank),
            _ if input.len() > Self::MAX_LENGTH => Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            }),
            Some((mailbox, host)) if !mailbox.is_empty() && !host.is_empty() => {
                Ok(Self(input.to_owned()))
            }
            _ => Err(EmailError::Malformed(input.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_school_addresses() {
        assert!(Email::parse("student@school.edu").is_ok());
        assert!(Email::parse("first.last+maths@school.co.uk").is_ok());
        assert_eq!(
            Email::parse("  alice@school.edu\n").unwrap().as_str(),
            "alice@school.edu"
        );
    }

    #[test]
    fn test_form_input_rejections() {
        assert_eq!(Email::parse("   "), Err(EmailError::Blank));
        for bad in ["nobody", "@school.edu", "alice@"] {
            assert_eq!(
                Email::parse(bad),
                Err(EmailError::Malformed(bad.to_string()))
            );
        }

        let long = format!("{}@school.edu", "a".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: 254 })
        );
    }

    #[test]
    fn test_backend_values_are_not_revalidated() {
        let email: Email = serde_json::from_str("\"legacy-account\"").unwrap();
        assert_eq!(email.to_string(), "legacy-account");
    }
}
