//! Core types for Schoolhouse.
//!
//! This module provides type-safe wrappers for the school domain.

pub mod email;
pub mod id;
pub mod profile;
pub mod role;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use profile::{Profile, ProfileError};
pub use role::{Role, RoleParseError};
pub use user::{Student, Teacher, UserRecord, UserSummary};
