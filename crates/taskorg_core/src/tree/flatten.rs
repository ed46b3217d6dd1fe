//! Task tree flattener.
//!
//! Walks client task nodes (raw JSON, lenient) in array order and emits one
//! `FlatTaskRecord` per well-formed node. Nodes that are not objects, or
//! whose trimmed text is empty, are dropped together with their subtasks.

use crate::ingest::coerce::{is_truthy, scalar_text, supplied_id};
use crate::model::ids::new_id;
use crate::model::record::{FlatTaskRecord, TaskOwner};
use serde_json::Value;

/// Accumulates flat records across several owner scopes.
#[derive(Debug, Default)]
pub struct TaskFlattener {
    records: Vec<FlatTaskRecord>,
    dropped: usize,
}

impl TaskFlattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens `nodes` as the ordered children of `owner`, recursing into
    /// subtasks with the node itself as owner.
    pub fn push_scope(&mut self, nodes: &[Value], owner: &TaskOwner) {
        let mut position = 0_i64;
        for node in nodes {
            let Some(fields) = node.as_object() else {
                self.dropped += 1;
                continue;
            };

            let text = scalar_text(fields.get("text"));
            let text = text.trim();
            if text.is_empty() {
                self.dropped += 1;
                continue;
            }

            let id = supplied_id(fields.get("id")).unwrap_or_else(new_id);
            let subtasks = fields
                .get("subtasks")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice);
            let is_expanded = match fields.get("isExpanded") {
                None | Some(Value::Null) => !subtasks.is_empty(),
                Some(value) => is_truthy(value),
            };

            self.records.push(FlatTaskRecord {
                id: id.clone(),
                text: text.to_string(),
                done: fields.get("done").is_some_and(is_truthy),
                is_expanded: Some(is_expanded),
                owner: owner.clone(),
                position,
            });
            position += 1;

            self.push_scope(subtasks, &TaskOwner::Task(id));
        }
    }

    /// Number of nodes skipped so far (their subtrees are not counted).
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_records(self) -> Vec<FlatTaskRecord> {
        self.records
    }
}

/// Flattens one owner scope and its descendants.
pub fn flatten_tasks(nodes: &[Value], owner: &TaskOwner) -> Vec<FlatTaskRecord> {
    let mut flattener = TaskFlattener::new();
    flattener.push_scope(nodes, owner);
    flattener.into_records()
}
