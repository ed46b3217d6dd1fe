//! Normalizes a full-snapshot payload into rows ready for insertion.

use super::coerce::{is_truthy, scalar_text, supplied_id, to_integer};
use super::{echo_value, ValidationError};
use crate::model::ids::new_id;
use crate::model::record::{CategoryRecord, GroupRecord, SnapshotRows, TaskOwner};
use crate::model::snapshot::GroupDuration;
use crate::tree::TaskFlattener;
use serde_json::{Map, Value};

const DEFAULT_CATEGORY_NAME: &str = "Category";
const DEFAULT_GROUP_NAME: &str = "Group";

/// Validated, fully resolved content of one replace request.
///
/// Building the plan is pure: ids are generated and numbers coerced here,
/// so a plan that exists can only fail to apply on store errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacePlan {
    pub rows: SnapshotRows,
    /// Entries skipped by lenient ingestion (categories, groups, tasks).
    pub dropped_nodes: usize,
}

impl ReplacePlan {
    /// Validates `payload` and resolves every entity it contains.
    ///
    /// # Errors
    /// - `PayloadNotObject` / `MissingArray` when `standard` or `groups`
    ///   is not an array.
    /// - `InvalidDuration`, `NotAnInteger`, `NegativeDuration` for group
    ///   numeric fields that cannot be coerced.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let fields = payload
            .as_object()
            .ok_or(ValidationError::PayloadNotObject)?;
        let categories = required_array(fields, "standard")?;
        let groups = required_array(fields, "groups")?;

        let mut rows = SnapshotRows::default();
        let mut flattener = TaskFlattener::new();
        let mut dropped_nodes = 0;

        for entry in categories {
            let Some(category) = entry.as_object() else {
                dropped_nodes += 1;
                continue;
            };
            let record = CategoryRecord {
                id: supplied_id(category.get("id")).unwrap_or_else(new_id),
                name: display_name(category.get("name"), DEFAULT_CATEGORY_NAME),
                position: rows.categories.len() as i64,
            };
            flattener.push_scope(
                task_nodes(category),
                &TaskOwner::Category(record.id.clone()),
            );
            rows.categories.push(record);
        }

        for (group_index, entry) in groups.iter().enumerate() {
            let Some(group) = entry.as_object() else {
                dropped_nodes += 1;
                continue;
            };
            let record = GroupRecord {
                id: supplied_id(group.get("id")).unwrap_or_else(new_id),
                name: display_name(group.get("name"), DEFAULT_GROUP_NAME),
                start: scalar_text(group.get("start")),
                duration: parse_duration(group.get("duration"), group_index)?,
                next: parse_next(group.get("next"), group_index)?,
                position: rows.groups.len() as i64,
            };
            flattener.push_scope(task_nodes(group), &TaskOwner::Group(record.id.clone()));
            rows.groups.push(record);
        }

        dropped_nodes += flattener.dropped();
        rows.tasks = flattener.into_records();
        Ok(Self {
            rows,
            dropped_nodes,
        })
    }
}

fn required_array<'a>(
    fields: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a [Value], ValidationError> {
    fields
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or(ValidationError::MissingArray(key))
}

fn task_nodes(owner: &Map<String, Value>) -> &[Value] {
    owner
        .get("tasks")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

fn display_name(value: Option<&Value>, fallback: &str) -> String {
    let name = scalar_text(value);
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_duration(
    value: Option<&Value>,
    group_index: usize,
) -> Result<GroupDuration, ValidationError> {
    let fields = match value {
        None => return Ok(GroupDuration::default()),
        Some(value) if !is_truthy(value) => return Ok(GroupDuration::default()),
        Some(Value::Object(fields)) => fields,
        Some(_) => return Err(ValidationError::InvalidDuration { group_index }),
    };

    Ok(GroupDuration {
        days: duration_component(fields, "days", "duration.days", group_index)?,
        hours: duration_component(fields, "hours", "duration.hours", group_index)?,
        minutes: duration_component(fields, "minutes", "duration.minutes", group_index)?,
    })
}

fn duration_component(
    fields: &Map<String, Value>,
    key: &str,
    field: &'static str,
    group_index: usize,
) -> Result<i64, ValidationError> {
    // Falsy components (missing, null, 0, "") mean zero.
    let Some(value) = fields.get(key).filter(|value| is_truthy(value)) else {
        return Ok(0);
    };
    let parsed = to_integer(value).ok_or_else(|| ValidationError::NotAnInteger {
        group_index,
        field,
        value: echo_value(value),
    })?;
    if parsed < 0 {
        return Err(ValidationError::NegativeDuration {
            group_index,
            field,
            value: parsed,
        });
    }
    Ok(parsed)
}

fn parse_next(value: Option<&Value>, group_index: usize) -> Result<Option<i64>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => to_integer(value)
            .map(Some)
            .ok_or_else(|| ValidationError::NotAnInteger {
                group_index,
                field: "next",
                value: echo_value(value),
            }),
    }
}
