//! Transport-facing API for the task organizer backend.
//!
//! # Responsibility
//! - Resolve runtime configuration (database path, logging).
//! - Map verb + path requests onto core snapshot operations.
//! - Translate core error kinds into transport status codes.
//!
//! # Invariants
//! - Dispatch never panics; every failure becomes a response envelope.
//! - Each request opens its own connection; mutual exclusion is left to
//!   SQLite transactions.

pub mod config;
pub mod dispatch;

pub use config::ApiConfig;
pub use dispatch::{ApiRequest, ApiResponse, Method, TaskOrgApi};
