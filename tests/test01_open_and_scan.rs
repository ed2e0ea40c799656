#![cfg(feature = "sqlite")]

use sql_facade::prelude::*;
use sql_facade::{
    Connector, NullString, NullTime, TIMESTAMP_FORMAT, drivers, open, open_db_with, open_with,
};

fn memory_db() -> Result<SqlDb, SqlFacadeError> {
    PoolOptions::builder()
        .max_open_conns(1)
        .open("sqlite", ":memory:")
}

#[tokio::test]
async fn prepare_query_advance_scan_select_one() -> Result<(), Box<dyn std::error::Error>> {
    let db = open("sqlite", ":memory:")?;
    let ctx = Context::new();

    let mut stmt = db.prepare(&ctx, "SELECT 1").await?;
    assert_eq!(stmt.sql(), "SELECT 1");
    let mut rows = stmt.query(&ctx, &[]).await?;
    assert_eq!(rows.len(), 1);
    assert!(rows.advance());
    let (one,): (i64,) = rows.scan()?;
    assert_eq!(one, 1);
    assert!(!rows.advance());
    stmt.close()?;
    Ok(())
}

#[tokio::test]
async fn rows_report_columns_and_iterate_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db()?;
    let ctx = Context::new();
    db.exec(
        &ctx,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
        &[],
    )
    .await?;
    for (id, name) in [(1_i64, "alice"), (2, "bob"), (3, "carol")] {
        db.exec(
            &ctx,
            "INSERT INTO users (id, name) VALUES (?, ?)",
            &args![id, name],
        )
        .await?;
    }

    let mut rows = db
        .query(&ctx, "SELECT id, name FROM users ORDER BY id", &[])
        .await?;
    assert_eq!(rows.columns(), ["id", "name"]);
    let mut seen = Vec::new();
    while rows.advance() {
        let (id, name): (i64, String) = rows.scan()?;
        seen.push((id, name));
    }
    assert_eq!(
        seen,
        vec![
            (1, "alice".to_owned()),
            (2, "bob".to_owned()),
            (3, "carol".to_owned())
        ]
    );

    let mut rows = db.query(&ctx, "SELECT id FROM users", &[]).await?;
    assert!(matches!(
        rows.scan::<(i64,)>(),
        Err(SqlFacadeError::NoCurrentRow)
    ));
    assert!(rows.advance());
    rows.close();
    assert!(!rows.advance());
    Ok(())
}

#[tokio::test]
async fn query_row_defers_errors_to_scan() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db()?;
    let ctx = Context::new();

    let mut row = db.query_row(&ctx, "SELECT 40 + ?", &args![2]).await;
    assert!(row.err().is_none());
    let (answer,): (i64,) = row.scan()?;
    assert_eq!(answer, 42);

    let mut missing = db
        .query_row(&ctx, "SELECT 1 WHERE 1 = 0", &[])
        .await;
    let err = missing.scan::<(i64,)>().unwrap_err();
    assert!(matches!(err.as_driver(), Some(sqlx::Error::RowNotFound)));

    let mut broken = db.query_row(&ctx, "SELEC 1", &[]).await;
    assert!(broken.err().is_some());
    let err = broken.scan::<(i64,)>().unwrap_err();
    assert!(matches!(err.as_driver(), Some(sqlx::Error::Database(_))));
    Ok(())
}

#[tokio::test]
async fn null_and_blob_arguments_round_trip_through_sqlite() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db()?;
    let ctx = Context::new();
    db.exec(&ctx, "CREATE TABLE t (a INTEGER, b BLOB)", &[])
        .await?;
    db.exec(
        &ctx,
        "INSERT INTO t (a, b) VALUES (?, ?)",
        &args![None::<i64>, vec![1_u8, 2, 3]],
    )
    .await?;

    let mut row = db.query_row(&ctx, "SELECT a, b FROM t", &[]).await;
    let (a, b): (Option<i64>, Vec<u8>) = row.scan()?;
    assert_eq!(a, None);
    assert_eq!(b, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn drivers_and_open_variants() -> Result<(), Box<dyn std::error::Error>> {
    assert!(drivers().contains(&"sqlite"));

    let err = open("no-such-driver", "whatever").unwrap_err();
    assert!(matches!(
        err.as_driver(),
        Some(sqlx::Error::Configuration(_))
    ));
    assert!(err.to_string().contains("unknown driver"));

    let ctx = Context::new();
    let db = open("sqlite3", "sqlite::memory:")?;
    db.ping(&ctx).await?;
    assert_eq!(db.driver().database_url.scheme(), "sqlite");

    let connector: Connector = "sqlite::memory:".parse()?;
    let opts = PoolOptions::builder().max_open_conns(2).finish();
    let db = open_db_with(connector, &opts);
    db.ping(&ctx).await?;
    assert_eq!(db.stats().max_open_connections, 2);

    let db = open_with("sqlite", ":memory:", &opts)?;
    let conn = db.conn(&ctx).await?;
    let stats = db.stats();
    assert_eq!(stats.open_connections, 1);
    assert_eq!(stats.in_use, 1);
    assert_eq!(stats.idle, 0);
    conn.close()?;

    db.close().await;
    assert!(db.native().is_closed());
    Ok(())
}

#[test]
fn open_outside_a_runtime_is_an_error() {
    let err = open("sqlite", ":memory:").unwrap_err();
    assert!(matches!(
        err.as_driver(),
        Some(sqlx::Error::Configuration(_))
    ));
}

#[tokio::test]
async fn empty_results_report_columns_only_through_statements() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db()?;
    let ctx = Context::new();
    db.exec(&ctx, "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", &[])
        .await?;
    let sql = "SELECT id, name FROM users WHERE id = ?";

    let rows = db.query(&ctx, sql, &args![1]).await?;
    assert!(rows.is_empty());
    assert!(rows.columns().is_empty());

    let mut stmt = db.prepare(&ctx, sql).await?;
    let rows = stmt.query(&ctx, &args![1]).await?;
    assert!(rows.is_empty());
    assert_eq!(rows.columns(), ["id", "name"]);
    stmt.close()?;
    Ok(())
}

#[tokio::test]
async fn closed_statement_leaves_its_connection_usable() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db()?;
    let ctx = Context::new();
    let mut conn = db.conn(&ctx).await?;

    let mut stmt = conn.prepare(&ctx, "SELECT ? * 2").await?;
    let (doubled,): (i64,) = stmt.query_row(&ctx, &args![21]).await.scan()?;
    assert_eq!(doubled, 42);
    stmt.close()?;

    let mut again = conn.prepare(&ctx, "SELECT ? * 2").await?;
    let (doubled,): (i64,) = again.query_row(&ctx, &args![4]).await.scan()?;
    assert_eq!(doubled, 8);
    again.close()?;
    conn.close()?;
    Ok(())
}

#[tokio::test]
async fn timestamps_bind_as_text_and_parse_back() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db()?;
    let ctx = Context::new();
    db.exec(&ctx, "CREATE TABLE events (id INTEGER PRIMARY KEY, at TEXT)", &[])
        .await?;

    let at = chrono::NaiveDate::from_ymd_opt(2024, 5, 6)
        .and_then(|day| day.and_hms_milli_opt(12, 30, 45, 250))
        .expect("valid timestamp");
    let set: NullTime = Some(at);
    let unset: NullTime = None;
    db.exec(
        &ctx,
        "INSERT INTO events (id, at) VALUES (?, ?), (?, ?)",
        &args![1, set, 2, unset],
    )
    .await?;

    let mut rows = db
        .query(&ctx, "SELECT at, datetime(at) FROM events ORDER BY id", &[])
        .await?;
    assert!(rows.advance());
    let (stored, normalised): (NullString, NullString) = rows.scan()?;
    assert_eq!(stored.as_deref(), Some("2024-05-06 12:30:45.250"));
    assert_eq!(normalised.as_deref(), Some("2024-05-06 12:30:45"));
    let parsed = chrono::NaiveDateTime::parse_from_str(
        stored.as_deref().unwrap_or_default(),
        TIMESTAMP_FORMAT,
    )?;
    assert_eq!(parsed, at);

    assert!(rows.advance());
    let (stored, _): (NullString, NullString) = rows.scan()?;
    assert_eq!(stored, None);
    Ok(())
}

#[tokio::test]
async fn null_arguments_store_sql_null_in_typed_columns() -> Result<(), Box<dyn std::error::Error>> {
    let db = memory_db()?;
    let ctx = Context::new();
    db.exec(&ctx, "CREATE TABLE t (n INTEGER, f REAL, b BLOB)", &[])
        .await?;
    db.exec(
        &ctx,
        "INSERT INTO t (n, f, b) VALUES (?, ?, ?)",
        &args![Value::Null, None::<f64>, None::<Vec<u8>>],
    )
    .await?;

    let mut row = db
        .query_row(&ctx, "SELECT typeof(n), typeof(f), typeof(b) FROM t", &[])
        .await;
    let kinds: (String, String, String) = row.scan()?;
    assert_eq!(
        kinds,
        ("null".to_owned(), "null".to_owned(), "null".to_owned())
    );
    Ok(())
}
