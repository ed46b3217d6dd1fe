//! Snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist categories, groups and flat task rows.
//! - Keep SQL details and transaction boundaries inside the repository.
//!
//! # Invariants
//! - `replace_all` and `clear_all` run in one `BEGIN IMMEDIATE`
//!   transaction; on any error the transaction is rolled back on drop.
//! - `load_all` reads the three tables inside one read transaction so a
//!   concurrent replace is observed entirely or not at all.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::record::{CategoryRecord, FlatTaskRecord, GroupRecord, SnapshotRows, TaskOwner};
use crate::model::snapshot::GroupDuration;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by snapshot repository operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from snapshot repository operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error, including constraint violations.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "snapshot repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "snapshot repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid snapshot data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for whole-snapshot persistence.
pub trait SnapshotRepository {
    /// Deletes every stored entity and inserts `rows`, atomically.
    fn replace_all(&self, rows: &SnapshotRows) -> StoreResult<()>;
    /// Deletes every stored entity, atomically.
    fn clear_all(&self) -> StoreResult<()>;
    /// Loads every stored entity from one consistent snapshot.
    fn load_all(&self) -> StoreResult<SnapshotRows>;
}

/// SQLite-backed snapshot repository.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_snapshot_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn replace_all(&self, rows: &SnapshotRows) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        delete_everything(&tx)?;

        {
            let mut insert_category = tx.prepare(
                "INSERT INTO categories (id, name, position)
                 VALUES (?1, ?2, ?3);",
            )?;
            for category in &rows.categories {
                insert_category.execute(params![
                    category.id,
                    category.name,
                    category.position
                ])?;
            }

            let mut insert_group = tx.prepare(
                "INSERT INTO task_groups (
                    id,
                    name,
                    start,
                    duration_days,
                    duration_hours,
                    duration_minutes,
                    next,
                    position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for group in &rows.groups {
                insert_group.execute(params![
                    group.id,
                    group.name,
                    group.start,
                    group.duration.days,
                    group.duration.hours,
                    group.duration.minutes,
                    group.next,
                    group.position,
                ])?;
            }

            let mut insert_task = tx.prepare(
                "INSERT INTO tasks (
                    id,
                    text,
                    done,
                    is_expanded,
                    parent_id,
                    category_id,
                    group_id,
                    position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for task in &rows.tasks {
                insert_task.execute(params![
                    task.id,
                    task.text,
                    bool_to_int(task.done),
                    task.is_expanded.map(bool_to_int),
                    task.owner.parent_id(),
                    task.owner.category_id(),
                    task.owner.group_id(),
                    task.position,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn clear_all(&self) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        delete_everything(&tx)?;
        tx.commit()?;
        Ok(())
    }

    fn load_all(&self) -> StoreResult<SnapshotRows> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let rows = SnapshotRows {
            categories: load_categories(&tx)?,
            groups: load_groups(&tx)?,
            tasks: load_tasks(&tx)?,
        };
        tx.commit()?;
        Ok(rows)
    }
}

fn delete_everything(conn: &Connection) -> StoreResult<()> {
    // Children before owners.
    conn.execute_batch(
        "DELETE FROM tasks;
         DELETE FROM categories;
         DELETE FROM task_groups;",
    )?;
    Ok(())
}

fn load_categories(conn: &Connection) -> StoreResult<Vec<CategoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, position
         FROM categories
         ORDER BY position ASC, id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(CategoryRecord {
            id: row.get("id")?,
            name: row.get("name")?,
            position: row.get("position")?,
        });
    }
    Ok(items)
}

fn load_groups(conn: &Connection) -> StoreResult<Vec<GroupRecord>> {
    let mut stmt = conn.prepare(
        "SELECT
            id,
            name,
            start,
            duration_days,
            duration_hours,
            duration_minutes,
            next,
            position
         FROM task_groups
         ORDER BY position ASC, id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(GroupRecord {
            id: row.get("id")?,
            name: row.get("name")?,
            start: row.get("start")?,
            duration: GroupDuration {
                days: row.get("duration_days")?,
                hours: row.get("duration_hours")?,
                minutes: row.get("duration_minutes")?,
            },
            next: row.get("next")?,
            position: row.get("position")?,
        });
    }
    Ok(items)
}

fn load_tasks(conn: &Connection) -> StoreResult<Vec<FlatTaskRecord>> {
    let mut stmt = conn.prepare(
        "SELECT
            id,
            text,
            done,
            is_expanded,
            parent_id,
            category_id,
            group_id,
            position
         FROM tasks
         ORDER BY position ASC, id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_task_row(row)?);
    }
    Ok(items)
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<FlatTaskRecord> {
    let id: String = row.get("id")?;

    let owner = match (
        row.get::<_, Option<String>>("parent_id")?,
        row.get::<_, Option<String>>("category_id")?,
        row.get::<_, Option<String>>("group_id")?,
    ) {
        (Some(parent_id), None, None) => TaskOwner::Task(parent_id),
        (None, Some(category_id), None) => TaskOwner::Category(category_id),
        (None, None, Some(group_id)) => TaskOwner::Group(group_id),
        _ => {
            return Err(StoreError::InvalidData(format!(
                "task `{id}` must have exactly one owner"
            )));
        }
    };

    let done = int_to_bool(row.get("done")?, "tasks.done")?;
    let is_expanded = row
        .get::<_, Option<i64>>("is_expanded")?
        .map(|value| int_to_bool(value, "tasks.is_expanded"))
        .transpose()?;

    Ok(FlatTaskRecord {
        id,
        text: row.get("text")?,
        done,
        is_expanded,
        owner,
        position: row.get("position")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &'static str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn ensure_snapshot_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["categories", "task_groups", "tasks"] {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    for column in [
        "id",
        "text",
        "done",
        "is_expanded",
        "parent_id",
        "category_id",
        "group_id",
        "position",
    ] {
        if !table_has_column(conn, "tasks", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
