//! Domain model for categories, scheduled groups and their task trees.
//!
//! # Responsibility
//! - Define the nested wire shape exchanged with clients (`SnapshotView`).
//! - Define the flat row shape persisted by the store (`FlatTaskRecord`).
//!
//! # Invariants
//! - Every flat task has exactly one owner, encoded by `TaskOwner`.
//! - Sibling order is carried by an explicit `position`, never by row order.

pub mod ids;
pub mod record;
pub mod snapshot;
