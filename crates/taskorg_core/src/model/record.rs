//! Flat relational rows for the snapshot store.
//!
//! # Responsibility
//! - Carry one stored entity per value, with owner linkage made explicit.
//! - Bridge between the tree transform and the SQLite repository.
//!
//! # Invariants
//! - `TaskOwner` makes "exactly one owner" unrepresentable otherwise.
//! - `position` is the order key within one owner scope.

use crate::model::ids::EntityId;
use crate::model::snapshot::GroupDuration;
use std::fmt::{Display, Formatter};

/// Closed set of things that can own a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Category,
    Group,
    Task,
}

/// Owner reference of one task, and the key of its owner scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskOwner {
    /// Top-level task inside a category.
    Category(EntityId),
    /// Top-level task inside a scheduled group.
    Group(EntityId),
    /// Subtask of another task.
    Task(EntityId),
}

impl TaskOwner {
    pub fn new(kind: OwnerKind, id: impl Into<EntityId>) -> Self {
        let id = id.into();
        match kind {
            OwnerKind::Category => Self::Category(id),
            OwnerKind::Group => Self::Group(id),
            OwnerKind::Task => Self::Task(id),
        }
    }

    pub fn kind(&self) -> OwnerKind {
        match self {
            Self::Category(_) => OwnerKind::Category,
            Self::Group(_) => OwnerKind::Group,
            Self::Task(_) => OwnerKind::Task,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Category(id) | Self::Group(id) | Self::Task(id) => id,
        }
    }

    /// Value for the `tasks.parent_id` column.
    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::Task(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Value for the `tasks.category_id` column.
    pub fn category_id(&self) -> Option<&str> {
        match self {
            Self::Category(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Value for the `tasks.group_id` column.
    pub fn group_id(&self) -> Option<&str> {
        match self {
            Self::Group(id) => Some(id.as_str()),
            _ => None,
        }
    }
}

/// Renders the owner scope key: `category:<id>`, `group:<id>` or a bare
/// task id for subtasks.
impl Display for TaskOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category(id) => write!(f, "category:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
            Self::Task(id) => write!(f, "{id}"),
        }
    }
}

/// One stored task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTaskRecord {
    pub id: EntityId,
    /// Trimmed, never empty.
    pub text: String,
    pub done: bool,
    /// `None` means "unknown"; it is kept as-is on read.
    pub is_expanded: Option<bool>,
    pub owner: TaskOwner,
    pub position: i64,
}

/// One stored category row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: EntityId,
    pub name: String,
    pub position: i64,
}

/// One stored scheduled group row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: EntityId,
    pub name: String,
    /// Opaque start token (e.g. `"08:30"`), not validated.
    pub start: String,
    pub duration: GroupDuration,
    /// Opaque pass-through value, typically an epoch-ms next occurrence.
    pub next: Option<i64>,
    pub position: i64,
}

/// Complete flat content of the store.
///
/// Ordered so that inserting `categories`, then `groups`, then `tasks`
/// never references a row that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotRows {
    pub categories: Vec<CategoryRecord>,
    pub groups: Vec<GroupRecord>,
    pub tasks: Vec<FlatTaskRecord>,
}
