#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use sql_shim::prelude::*;

fn empty_table() -> DatabaseConnection {
    let mut conn = DatabaseConnection::open_sqlite_in_memory().expect("open in-memory db");
    conn.execute_batch(
        "CREATE TABLE events (
             id INTEGER PRIMARY KEY,
             label TEXT,
             flag INTEGER NOT NULL DEFAULT 0,
             at TEXT
         );",
    )
    .expect("create schema");
    conn
}

#[test]
fn successful_insert_returns_true() {
    let mut conn = empty_table();
    let ok = conn
        .query_execute(
            "INSERT INTO events (id, label) VALUES (:id, :label)",
            &params!("id" => 1i64, "label" => "first"),
        )
        .unwrap();
    assert!(ok);
}

#[test]
fn constraint_violation_returns_false() {
    let mut conn = empty_table();
    assert!(
        conn.query_execute(
            "INSERT INTO events (id, label) VALUES (:id, :label)",
            &params!("id" => 1i64, "label" => "first"),
        )
        .unwrap()
    );
    // Same primary key: the statement prepares fine but execution fails.
    let ok = conn
        .query_execute(
            "INSERT INTO events (id, label) VALUES (:id, :label)",
            &params!("id" => 1i64, "label" => "dupe"),
        )
        .unwrap();
    assert!(!ok);
}

#[test]
fn preparation_failure_raises_a_driver_error() {
    let mut conn = empty_table();
    let err = conn
        .query_execute("INSERT INTOO events (id) VALUES (:id)", &params!("id" => 1i64))
        .unwrap_err();
    assert!(matches!(err, SqlShimError::SqliteError(_)));
}

#[test]
fn select_preparation_failure_raises_too() {
    let mut conn = empty_table();
    let err = conn
        .query_select("SELEC id FROM events", &params!())
        .unwrap_err();
    assert!(matches!(err, SqlShimError::SqliteError(_)));
}

#[test]
fn update_with_list_parameter() {
    let mut conn = empty_table();
    for id in 1i64..=4 {
        assert!(
            conn.query_execute(
                "INSERT INTO events (id, label) VALUES (:id, :label)",
                &params!("id" => id, "label" => format!("event-{id}")),
            )
            .unwrap()
        );
    }
    assert!(
        conn.query_execute(
            "UPDATE events SET flag = :flag WHERE id IN (:ids)",
            &params!("flag" => true, "ids" => vec![2i64, 4]),
        )
        .unwrap()
    );
    let flagged = conn
        .query_select_map(
            "SELECT id FROM events WHERE flag = :flag ORDER BY id",
            &params!("flag" => true),
            |row| row.get("id").and_then(SqlValue::as_int).copied(),
        )
        .unwrap();
    assert_eq!(flagged, vec![2, 4]);
}

#[test]
fn bool_binds_as_integer() {
    let mut conn = empty_table();
    assert!(
        conn.query_execute(
            "INSERT INTO events (id, flag) VALUES (:id, :flag)",
            &params!("id" => 1i64, "flag" => true),
        )
        .unwrap()
    );
    let row = conn
        .query_select_one("SELECT flag FROM events WHERE id = :id", &params!("id" => 1i64))
        .unwrap()
        .expect("row");
    assert_eq!(row.get("flag"), Some(&SqlValue::Int(1)));
    assert_eq!(row.get("flag").and_then(SqlValue::as_bool), Some(&true));
}

#[test]
fn null_round_trip() {
    let mut conn = empty_table();
    assert!(
        conn.query_execute(
            "INSERT INTO events (id, label) VALUES (:id, :label)",
            &params!("id" => 1i64, "label" => SqlValue::Null),
        )
        .unwrap()
    );
    let row = conn
        .query_select_one("SELECT label FROM events WHERE id = :id", &params!("id" => 1i64))
        .unwrap()
        .expect("row");
    assert!(row.get("label").is_some_and(SqlValue::is_null));
}

#[test]
fn timestamp_round_trip_via_text() {
    let mut conn = empty_table();
    let at = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    assert!(
        conn.query_execute(
            "INSERT INTO events (id, at) VALUES (:id, :at)",
            &params!("id" => 1i64, "at" => at),
        )
        .unwrap()
    );
    let row = conn
        .query_select_one("SELECT at FROM events WHERE id = :id", &params!("id" => 1i64))
        .unwrap()
        .expect("row");
    assert_eq!(row.get("at").and_then(SqlValue::as_timestamp), Some(at));
}

#[test]
fn binding_without_placeholder_is_a_parameter_error() {
    let mut conn = empty_table();
    let err = conn
        .query_select("SELECT id FROM events", &params!("nope" => 1i64))
        .unwrap_err();
    assert!(matches!(err, SqlShimError::ParameterError(_)));
}

#[test]
fn placeholder_without_binding_is_a_parameter_error() {
    let mut conn = empty_table();
    // SQLite would silently run this with :label left NULL.
    let err = conn
        .query_select(
            "SELECT id FROM events WHERE label = :label AND id = :id",
            &params!("id" => 1i64),
        )
        .unwrap_err();
    assert!(matches!(err, SqlShimError::ParameterError(_)));

    let err = conn
        .query_execute(
            "INSERT INTO events (id, label) VALUES (:id, :label)",
            &params!("id" => 1i64),
        )
        .unwrap_err();
    assert!(matches!(err, SqlShimError::ParameterError(_)));
}

#[test]
fn file_backed_database_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.db");

    let mut conn = DatabaseConnection::open_sqlite(&path).expect("open file db");
    conn.execute_batch("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT);")
        .expect("create schema");
    assert!(
        conn.query_execute(
            "INSERT INTO kv (k, v) VALUES (:k, :v)",
            &params!("k" => "greeting", "v" => "hello"),
        )
        .unwrap()
    );
    drop(conn);

    let mut reopened = DatabaseConnection::open_sqlite(&path).expect("reopen file db");
    let row = reopened
        .query_select_one("SELECT v FROM kv WHERE k = :k", &params!("k" => "greeting"))
        .unwrap()
        .expect("row");
    assert_eq!(row.get("v").and_then(SqlValue::as_text), Some("hello"));
}
