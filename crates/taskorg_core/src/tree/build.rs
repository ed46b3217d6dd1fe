//! Task tree builder, the inverse of the flattener.

use crate::model::record::{FlatTaskRecord, TaskOwner};
use crate::model::snapshot::TaskNode;
use std::collections::HashMap;

/// Flat task rows grouped by owner scope, each scope ordered by position.
#[derive(Debug, Default)]
pub struct TaskTree {
    scopes: HashMap<TaskOwner, Vec<FlatTaskRecord>>,
}

impl TaskTree {
    /// Groups `records` by owner; ties on `position` keep input order.
    pub fn build(records: impl IntoIterator<Item = FlatTaskRecord>) -> Self {
        let mut scopes: HashMap<TaskOwner, Vec<FlatTaskRecord>> = HashMap::new();
        for record in records {
            scopes.entry(record.owner.clone()).or_default().push(record);
        }
        for scope in scopes.values_mut() {
            scope.sort_by_key(|record| record.position);
        }
        Self { scopes }
    }

    /// Nested children of `owner`, in position order.
    ///
    /// Rows are unique by id and every chain ends at a category or group,
    /// so the recursion only visits each stored row once.
    pub fn children_of(&self, owner: &TaskOwner) -> Vec<TaskNode> {
        let Some(scope) = self.scopes.get(owner) else {
            return Vec::new();
        };
        scope
            .iter()
            .map(|record| TaskNode {
                id: record.id.clone(),
                text: record.text.clone(),
                done: record.done,
                is_expanded: record.is_expanded,
                subtasks: self.children_of(&TaskOwner::Task(record.id.clone())),
            })
            .collect()
    }

    /// Number of distinct owner scopes with at least one task.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::TaskTree;
    use crate::model::record::{FlatTaskRecord, TaskOwner};

    fn record(id: &str, owner: TaskOwner, position: i64) -> FlatTaskRecord {
        FlatTaskRecord {
            id: id.to_string(),
            text: id.to_uppercase(),
            done: false,
            is_expanded: None,
            owner,
            position,
        }
    }

    #[test]
    fn rebuilds_nested_children_in_position_order() {
        let category = TaskOwner::Category("c1".into());
        let tree = TaskTree::build(vec![
            record("b", category.clone(), 1),
            record("b1", TaskOwner::Task("b".into()), 0),
            record("a", category.clone(), 0),
        ]);

        let nodes = tree.children_of(&category);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "a");
        assert!(nodes[0].subtasks.is_empty());
        assert_eq!(nodes[1].id, "b");
        assert_eq!(nodes[1].subtasks.len(), 1);
        assert_eq!(nodes[1].subtasks[0].text, "B1");
        assert_eq!(tree.scope_count(), 2);
    }

    #[test]
    fn tolerates_gaps_and_duplicate_positions() {
        let group = TaskOwner::Group("g1".into());
        let tree = TaskTree::build(vec![
            record("x", group.clone(), 7),
            record("y", group.clone(), 3),
            record("z", group.clone(), 7),
        ]);
        let ids: Vec<_> = tree
            .children_of(&group)
            .into_iter()
            .map(|node| node.id)
            .collect();
        assert_eq!(ids, vec!["y", "x", "z"]);
    }

    #[test]
    fn keeps_is_expanded_tri_state() {
        let category = TaskOwner::Category("c1".into());
        let mut unknown = record("u", category.clone(), 0);
        unknown.is_expanded = None;
        let mut closed = record("f", category.clone(), 1);
        closed.is_expanded = Some(false);

        let nodes = TaskTree::build(vec![unknown, closed]).children_of(&category);
        assert_eq!(nodes[0].is_expanded, None);
        assert_eq!(nodes[1].is_expanded, Some(false));
    }

    #[test]
    fn scopes_with_same_id_but_different_kind_stay_apart() {
        let tree = TaskTree::build(vec![
            record("c-task", TaskOwner::Category("same".into()), 0),
            record("g-task", TaskOwner::Group("same".into()), 0),
        ]);
        assert_eq!(tree.children_of(&TaskOwner::Category("same".into()))[0].id, "c-task");
        assert_eq!(tree.children_of(&TaskOwner::Group("same".into()))[0].id, "g-task");
        assert!(tree.children_of(&TaskOwner::Task("same".into())).is_empty());
    }
}
