//! Editable account fields.

use serde::{Deserialize, Serialize};

use super::{Email, EmailError};

/// Errors raised while building a [`Profile`] from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Username is required")]
    MissingUsername,
    #[error("Department is required")]
    MissingDepartment,
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

/// The username, email and department shared by every account form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub email: Email,
    pub department: String,
}

impl Profile {
    /// Build a profile from raw form fields.
    ///
    /// # Errors
    ///
    /// Returns an error when a field is blank or the email is malformed.
    pub fn new(username: &str, email: &str, department: &str) -> Result<Self, ProfileError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileError::MissingUsername);
        }
        let department = department.trim();
        if department.is_empty() {
            return Err(ProfileError::MissingDepartment);
        }

        Ok(Self {
            username: username.to_owned(),
            email: Email::parse(email)?,
            department: department.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_fields() {
        let profile = Profile::new(" alice ", "a@b.com", " Maths ").unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.department, "Maths");
    }

    #[test]
    fn test_new_rejects_blank_fields() {
        assert_eq!(
            Profile::new("", "a@b.com", "Maths"),
            Err(ProfileError::MissingUsername)
        );
        assert_eq!(
            Profile::new("alice", "a@b.com", "  "),
            Err(ProfileError::MissingDepartment)
        );
        assert!(matches!(
            Profile::new("alice", "ab.com", "Maths"),
            Err(ProfileError::Email(EmailError::Malformed(_)))
        ));
    }
}
