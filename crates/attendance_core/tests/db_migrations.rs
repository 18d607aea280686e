use attendance_core::db::migrations::{latest_version, schema_version};
use attendance_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "students");
    assert_table_exists(&conn, "attendance");
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO students (name, roll_number, department) VALUES ('Asha Rao', 'R100', 'CS');",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second).unwrap(), latest_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
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
fn schema_rejects_unknown_status_values() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO students (name, roll_number) VALUES ('Asha Rao', 'R100');",
        [],
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO attendance (student_id, date, status) VALUES (1, '2024-09-02', 'Late');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn attendance_timestamp_defaults_at_insert() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO students (name, roll_number) VALUES ('Asha Rao', 'R100');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO attendance (student_id, date, status) VALUES (1, '2024-09-02', 'Present');",
        [],
    )
    .unwrap();

    let timestamp: String = conn
        .query_row("SELECT timestamp FROM attendance;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timestamp.len(), "YYYY-MM-DD HH:MM:SS".len());
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
