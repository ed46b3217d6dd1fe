//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes are all-or-nothing per call.
//! - Repository APIs surface constraint violations as `StoreError`, never
//!   as partial writes.

pub mod snapshot_repo;
