//! Nested snapshot shape exchanged with clients.
//!
//! Field names follow the JSON contract (`standard`, `groups`,
//! `isExpanded`, ...). `isExpanded` is omitted when unknown instead of
//! being defaulted.

use crate::model::ids::EntityId;
use serde::{Deserialize, Serialize};

/// Full nested view of all categories, groups and task trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotView {
    /// Categories, in display order.
    pub standard: Vec<CategoryView>,
    /// Scheduled groups, in display order.
    pub groups: Vec<GroupView>,
}

impl SnapshotView {
    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.groups.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub id: EntityId,
    pub name: String,
    pub start: String,
    pub duration: GroupDuration,
    /// Always serialized, as `null` when unset.
    #[serde(default)]
    pub next: Option<i64>,
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
}

/// Recurrence length of a scheduled group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDuration {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

/// One task with its ordered subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    pub id: EntityId,
    pub text: String,
    pub done: bool,
    #[serde(
        rename = "isExpanded",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_expanded: Option<bool>,
    #[serde(default)]
    pub subtasks: Vec<TaskNode>,
}
