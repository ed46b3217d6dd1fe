use taskorg_core::db::migrations::latest_version;
use taskorg_core::db::{open_db, open_db_in_memory, DbError};
use taskorg_core::{SqliteSnapshotRepository, StoreError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "categories");
    assert_table_exists(&conn, "task_groups");
    assert_table_exists(&conn, "tasks");
}

#[test]
fn open_db_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("taskorg.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "tasks");

    let journal_mode: String = conn_second
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(journal_mode.to_ascii_lowercase(), "wal");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn tasks_require_exactly_one_owner() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO categories (id, name, position) VALUES ('c1', 'Work', 0);
         INSERT INTO task_groups (
            id, name, start, duration_days, duration_hours, duration_minutes, next, position
         ) VALUES ('g1', 'Daily', '08:00', 1, 0, 0, NULL, 0);",
    )
    .unwrap();

    let no_owner = conn.execute(
        "INSERT INTO tasks (id, text, position) VALUES ('t1', 'Loose', 0);",
        [],
    );
    assert!(no_owner.is_err());

    let two_owners = conn.execute(
        "INSERT INTO tasks (id, text, category_id, group_id, position)
         VALUES ('t2', 'Both', 'c1', 'g1', 0);",
        [],
    );
    assert!(two_owners.is_err());

    conn.execute(
        "INSERT INTO tasks (id, text, category_id, position) VALUES ('t3', 'Ok', 'c1', 0);",
        [],
    )
    .unwrap();
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteSnapshotRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
