//! Schoolhouse Core - Shared types library.
//!
//! This crate provides common types used across all Schoolhouse components:
//! - `client` - Session manager, dashboard controller and API client
//! - `cli` - Command-line front-end for the school-management backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, roles and the student/teacher records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
