use rusqlite::Connection;
use textstat_core::db::{open_db, open_db_in_memory, DbError, TEXTS_SCHEMA_VERSION};

#[test]
fn open_db_in_memory_creates_texts_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), TEXTS_SCHEMA_VERSION);
    assert_table_exists(&conn, "texts");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("textstat.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO texts (uuid, value, created_at, updated_at) VALUES ('x', 'kept', 1, 1);",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), TEXTS_SCHEMA_VERSION);
    let kept: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM texts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kept, 1);
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
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, TEXTS_SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("nested").join("texts.db");

    let conn = open_db(&path).unwrap();
    assert!(path.exists());
    assert_table_exists(&conn, "texts");
}

#[test]
fn open_db_reports_path_it_could_not_open() {
    let dir = tempfile::tempdir().unwrap();

    match open_db(dir.path()).unwrap_err() {
        DbError::Open { path, .. } => assert_eq!(path, dir.path()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_blank_values() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO texts (uuid, value, created_at, updated_at) VALUES ('y', '   ', 1, 1);",
        [],
    );
    assert!(result.is_err());
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
