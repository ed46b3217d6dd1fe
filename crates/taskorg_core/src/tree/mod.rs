//! Nested tree <-> flat record transform for task hierarchies.
//!
//! # Responsibility
//! - Flatten client task trees into owner-linked, positioned rows.
//! - Rebuild nested trees from stored rows, grouped by owner scope.
//!
//! # Invariants
//! - Flattening emits a parent before any of its subtasks.
//! - Positions written per owner scope are dense (`0..n`).
//! - Building never invents `is_expanded`; unknown stays unknown.

pub mod build;
pub mod flatten;

pub use build::TaskTree;
pub use flatten::{flatten_tasks, TaskFlattener};
