//! Schoolhouse client library.
//!
//! Keeps the locally cached view of "who is logged in, with what role, and
//! what data" in step with the school-management backend, which stays the
//! single source of truth.
//!
//! # Components
//!
//! - [`session`] - Session manager: login, registration, verification and
//!   invalidation of the persisted bearer token
//! - [`dashboard`] - Dashboard data controller: cached collections,
//!   administration requests and the full-reload [`dashboard::Dashboard::refresh`] seam
//! - [`api`] - Typed REST client
//! - [`store`] - Persistent key-value session storage
//! - [`navigator`], [`notify`], [`confirm`] - Screen, message and
//!   confirmation plumbing shared by both components
//! - [`views`] - Askama text views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod confirm;
pub mod dashboard;
pub mod error;
pub mod navigator;
pub mod notify;
pub mod session;
pub mod store;
pub mod views;

pub use config::ClientConfig;
pub use error::{ActionError, ApiError};
pub use session::{Session, SessionManager};
