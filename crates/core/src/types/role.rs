//! Account roles.

use serde::{Deserialize, Serialize};

/// Error returned by [`Role::from_str`](std::str::FromStr).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0}. Valid roles: ADMIN, TEACHER, STUDENT")]
pub struct RoleParseError(pub String);

/// Role attached to every account by the backend.
///
/// Serialized in the backend's `SCREAMING_SNAKE_CASE` form. Any role string
/// the client does not know deserializes to [`Role::Unknown`] so that a new
/// server-side role never breaks the collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access, including the assignment tab and all mutations.
    Admin,
    /// Read access to both collections.
    Teacher,
    /// Read access to both collections.
    Student,
    /// A role this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Whether this role may create, edit, delete and assign accounts.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Lowercase noun used in user-facing messages ("student", "teacher").
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Unknown => "user",
        }
    }

    /// Capitalised noun used at the start of messages ("Student", "Teacher").
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Teacher => "Teacher",
            Self::Student => "Student",
            Self::Unknown => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Teacher => write!(f, "TEACHER"),
            Self::Student => write!(f, "STUDENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "TEACHER" => Ok(Self::Teacher),
            "STUDENT" => Ok(Self::Student),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_wire_format() {
        for role in [Role::Admin, Role::Teacher, Role::Student] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_deserializes() {
        let role: Role = serde_json::from_str("\"PRINCIPAL\"").unwrap();
        assert_eq!(role, Role::Unknown);
        assert!(!role.is_admin());
    }
}
