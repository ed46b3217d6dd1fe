//! Core domain logic for the task organizer backend.
//!
//! Categories and scheduled groups own trees of tasks. Clients exchange the
//! whole collection as one nested snapshot; this crate stores it as flat,
//! owner-linked SQLite rows and rebuilds the nested view on read.

pub mod db;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;

pub use ingest::{ReplacePlan, ValidationError};
pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::ids::{new_id, EntityId};
pub use model::record::{
    CategoryRecord, FlatTaskRecord, GroupRecord, OwnerKind, SnapshotRows, TaskOwner,
};
pub use model::snapshot::{CategoryView, GroupDuration, GroupView, SnapshotView, TaskNode};
pub use repo::snapshot_repo::{
    SnapshotRepository, SqliteSnapshotRepository, StoreError, StoreResult,
};
pub use service::snapshot_service::{
    compose_snapshot, SnapshotService, SnapshotServiceError, SnapshotServiceResult,
};
pub use tree::{flatten_tasks, TaskFlattener, TaskTree};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
