use rusqlite::Connection;
use serde_json::{json, Value};
use std::thread;
use taskorg_core::db::{open_db, open_db_in_memory};
use taskorg_core::{
    SnapshotService, SnapshotServiceError, SnapshotView, SqliteSnapshotRepository, StoreError,
    ValidationError,
};

fn service(conn: &Connection) -> SnapshotService<SqliteSnapshotRepository<'_>> {
    SnapshotService::new(SqliteSnapshotRepository::try_new(conn).unwrap())
}

fn seed_payload() -> Value {
    json!({
        "standard": [{"id": "c1", "name": "Seed", "tasks": [
            {"id": "s1", "text": "Seed task", "subtasks": [{"id": "s1a", "text": "Seed child"}]}
        ]}],
        "groups": [{"id": "g1", "name": "Weekly", "start": "09:00",
                    "duration": {"days": 7}, "tasks": [{"id": "s2", "text": "Plan"}]}]
    })
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

fn seeded() -> (Connection, SnapshotView) {
    let conn = open_db_in_memory().unwrap();
    let seed = service(&conn).replace_all(&seed_payload()).unwrap();
    (conn, seed)
}

#[test]
fn validation_failure_leaves_store_untouched() {
    let (conn, seed) = seeded();
    let service = service(&conn);

    for payload in [
        json!({"standard": []}),
        json!({"groups": []}),
        json!({"standard": "nope", "groups": []}),
        json!("not an object"),
        json!({"standard": [], "groups": [{"duration": {"hours": "lots"}}]}),
        json!({"standard": [], "groups": [{"next": {"at": 5}}]}),
    ] {
        let err = service.replace_all(&payload).unwrap_err();
        assert!(
            matches!(err, SnapshotServiceError::Validation(_)),
            "payload {payload} gave {err}"
        );
        assert_eq!(service.fetch_all().unwrap(), seed);
    }
}

#[test]
fn validation_error_names_missing_collection() {
    let conn = open_db_in_memory().unwrap();
    let err = service(&conn)
        .replace_all(&json!({"standard": []}))
        .unwrap_err();
    match err {
        SnapshotServiceError::Validation(ValidationError::MissingArray(field)) => {
            assert_eq!(field, "groups");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_fault_mid_transaction_rolls_back_everything() {
    let (conn, seed) = seeded();
    conn.execute_batch(
        "CREATE TRIGGER fail_on_boom BEFORE INSERT ON tasks
         WHEN NEW.text = 'boom'
         BEGIN
             SELECT RAISE(ABORT, 'simulated store fault');
         END;",
    )
    .unwrap();
    let service = service(&conn);

    let err = service
        .replace_all(&json!({
            "standard": [
                {"id": "n1", "name": "New", "tasks": [{"text": "fine"}, {"text": "also fine"}]},
                {"id": "n2", "name": "Newer", "tasks": [{"text": "boom"}]}
            ],
            "groups": []
        }))
        .unwrap_err();
    assert!(matches!(err, SnapshotServiceError::Store(StoreError::Db(_))));
    assert!(err.to_string().contains("simulated store fault"));

    assert_eq!(service.fetch_all().unwrap(), seed);
    assert_eq!(count(&conn, "categories"), 1);
    assert_eq!(count(&conn, "tasks"), 3);
}

#[test]
fn duplicate_ids_fail_without_partial_state() {
    let (conn, seed) = seeded();
    let service = service(&conn);

    let err = service
        .replace_all(&json!({
            "standard": [{"id": "dup", "name": "A", "tasks": [
                {"id": "same", "text": "one"},
                {"id": "same", "text": "two"}
            ]}],
            "groups": []
        }))
        .unwrap_err();
    assert!(matches!(err, SnapshotServiceError::Store(_)));
    assert_eq!(service.fetch_all().unwrap(), seed);

    let err = service
        .replace_all(&json!({
            "standard": [{"id": "x", "name": "A"}, {"id": "x", "name": "B"}],
            "groups": []
        }))
        .unwrap_err();
    assert!(matches!(err, SnapshotServiceError::Store(_)));
    assert_eq!(service.fetch_all().unwrap(), seed);
}

#[test]
fn replace_removes_every_previous_row() {
    let (conn, _seed) = seeded();
    let service = service(&conn);

    let read = service
        .replace_all(&json!({"standard": [{"id": "fresh", "name": "Fresh"}], "groups": []}))
        .unwrap();
    assert_eq!(read.standard.len(), 1);
    assert!(read.groups.is_empty());
    assert_eq!(count(&conn, "tasks"), 0);
    assert_eq!(count(&conn, "task_groups"), 0);
}

#[test]
fn deleting_an_owner_cascades_to_all_descendants() {
    let (conn, _seed) = seeded();

    conn.execute("DELETE FROM categories WHERE id = 'c1';", [])
        .unwrap();
    let remaining: Vec<String> = {
        let mut stmt = conn.prepare("SELECT id FROM tasks ORDER BY id;").unwrap();
        let ids = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        ids
    };
    assert_eq!(remaining, vec!["s2".to_string()]);

    conn.execute("DELETE FROM task_groups WHERE id = 'g1';", [])
        .unwrap();
    assert_eq!(count(&conn, "tasks"), 0);
}

#[test]
fn deleting_a_parent_task_cascades_to_subtasks() {
    let (conn, _seed) = seeded();
    conn.execute("DELETE FROM tasks WHERE id = 's1';", []).unwrap();
    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM tasks WHERE id = 's1a';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn clear_all_empties_store_and_is_idempotent() {
    let (conn, _seed) = seeded();
    let service = service(&conn);

    service.clear_all().unwrap();
    service.clear_all().unwrap();

    let read = service.fetch_all().unwrap();
    assert_eq!(
        serde_json::to_value(&read).unwrap(),
        json!({"standard": [], "groups": []})
    );
    for table in ["tasks", "categories", "task_groups"] {
        assert_eq!(count(&conn, table), 0, "{table}");
    }
}

#[test]
fn readers_never_observe_a_partial_replace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.sqlite3");

    let big = json!({
        "standard": (0..4).map(|c| json!({
            "id": format!("c{c}"),
            "name": format!("Category {c}"),
            "tasks": (0..10).map(|t| json!({
                "id": format!("c{c}-t{t}"),
                "text": format!("task {t}"),
                "subtasks": [{"id": format!("c{c}-t{t}-s"), "text": "sub"}]
            })).collect::<Vec<_>>()
        })).collect::<Vec<_>>(),
        "groups": []
    });
    let small = json!({
        "standard": [{"id": "only", "name": "Only", "tasks": [{"id": "o1", "text": "one"}]}],
        "groups": []
    });

    let (expected_big, expected_small) = {
        let conn = open_db(&path).unwrap();
        let service = service(&conn);
        let expected_big = service.replace_all(&big).unwrap();
        let expected_small = service.replace_all(&small).unwrap();
        (expected_big, expected_small)
    };

    let writers: Vec<_> = [big, small]
        .into_iter()
        .map(|payload| {
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = service(&conn);
                for _ in 0..15 {
                    service.replace_all(&payload).unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let path = path.clone();
            let expected_big = expected_big.clone();
            let expected_small = expected_small.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = service(&conn);
                for _ in 0..30 {
                    let read = service.fetch_all().unwrap();
                    assert!(
                        read == expected_big || read == expected_small,
                        "observed a partial snapshot"
                    );
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    let conn = open_db(&path).unwrap();
    let last = service(&conn).fetch_all().unwrap();
    assert!(last == expected_big || last == expected_small);
}
