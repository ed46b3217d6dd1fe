//! Snapshot use-case service.
//!
//! # Responsibility
//! - Replace the whole store from a client snapshot payload.
//! - Read the whole store back as the nested client view.
//! - Clear the whole store.
//!
//! # Invariants
//! - Payload validation completes before the repository is touched.
//! - A successful replace returns a fresh read, so generated ids and
//!   derived fields reach the caller.
//! - Task text and names never appear in log events.

use crate::ingest::{ReplacePlan, ValidationError};
use crate::model::record::{SnapshotRows, TaskOwner};
use crate::model::snapshot::{CategoryView, GroupView, SnapshotView};
use crate::repo::snapshot_repo::{SnapshotRepository, StoreError};
use crate::tree::TaskTree;
use log::{debug, error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from snapshot service operations.
#[derive(Debug)]
pub enum SnapshotServiceError {
    /// Payload shape is wrong; nothing was written.
    Validation(ValidationError),
    /// Store failure; the in-flight transaction was rolled back.
    Store(StoreError),
}

impl Display for SnapshotServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SnapshotServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for SnapshotServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type SnapshotServiceResult<T> = Result<T, SnapshotServiceError>;

/// Snapshot service facade.
pub struct SnapshotService<R: SnapshotRepository> {
    repo: R,
}

impl<R: SnapshotRepository> SnapshotService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reads every category, group and task as one nested view.
    pub fn fetch_all(&self) -> SnapshotServiceResult<SnapshotView> {
        let started_at = Instant::now();
        let rows = self.repo.load_all().map_err(|err| {
            error!(
                "event=snapshot_fetch module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            err
        })?;
        let counts = RowCounts::of(&rows);
        let view = compose_snapshot(rows);
        debug!(
            "event=snapshot_fetch module=service status=ok duration_ms={} categories={} groups={} tasks={}",
            started_at.elapsed().as_millis(),
            counts.categories,
            counts.groups,
            counts.tasks
        );
        Ok(view)
    }

    /// Replaces the whole store with `payload` and returns the stored view.
    ///
    /// # Errors
    /// - `Validation` when `payload` lacks `standard`/`groups` arrays or
    ///   carries non-numeric group numbers; the store is untouched.
    /// - `Store` when the write transaction fails; the previous snapshot
    ///   stays intact.
    pub fn replace_all(&self, payload: &Value) -> SnapshotServiceResult<SnapshotView> {
        let started_at = Instant::now();
        info!("event=snapshot_replace module=service status=start");

        let plan = match ReplacePlan::from_payload(payload) {
            Ok(plan) => plan,
            Err(err) => {
                info!(
                    "event=snapshot_replace module=service status=rejected error_code=validation error={}",
                    err
                );
                return Err(err.into());
            }
        };
        if plan.dropped_nodes > 0 {
            debug!(
                "event=snapshot_replace module=service status=lenient dropped_nodes={}",
                plan.dropped_nodes
            );
        }

        let counts = RowCounts::of(&plan.rows);
        if let Err(err) = self.repo.replace_all(&plan.rows) {
            error!(
                "event=snapshot_replace module=service status=error duration_ms={} error_code=store error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }

        info!(
            "event=snapshot_replace module=service status=ok duration_ms={} categories={} groups={} tasks={}",
            started_at.elapsed().as_millis(),
            counts.categories,
            counts.groups,
            counts.tasks
        );
        self.fetch_all()
    }

    /// Deletes every category, group and task. Clearing an empty store
    /// succeeds.
    pub fn clear_all(&self) -> SnapshotServiceResult<()> {
        let started_at = Instant::now();
        match self.repo.clear_all() {
            Ok(()) => {
                info!(
                    "event=snapshot_clear module=service status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_clear module=service status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

/// Composes stored rows into the nested client view.
pub fn compose_snapshot(rows: SnapshotRows) -> SnapshotView {
    let tree = TaskTree::build(rows.tasks);

    let standard = rows
        .categories
        .into_iter()
        .map(|category| CategoryView {
            tasks: tree.children_of(&TaskOwner::Category(category.id.clone())),
            id: category.id,
            name: category.name,
        })
        .collect();

    let groups = rows
        .groups
        .into_iter()
        .map(|group| GroupView {
            tasks: tree.children_of(&TaskOwner::Group(group.id.clone())),
            id: group.id,
            name: group.name,
            start: group.start,
            duration: group.duration,
            next: group.next,
        })
        .collect();

    SnapshotView { standard, groups }
}

struct RowCounts {
    categories: usize,
    groups: usize,
    tasks: usize,
}

impl RowCounts {
    fn of(rows: &SnapshotRows) -> Self {
        Self {
            categories: rows.categories.len(),
            groups: rows.groups.len(),
            tasks: rows.tasks.len(),
        }
    }
}
