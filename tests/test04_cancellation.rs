#![cfg(feature = "sqlite")]

use std::time::Duration;

use sql_facade::prelude::*;
use tokio::time::{Instant, sleep};

fn single_conn_db() -> Result<SqlDb, SqlFacadeError> {
    PoolOptions::builder()
        .max_open_conns(1)
        .open("sqlite", ":memory:")
}

fn expect_done<T: std::fmt::Debug>(what: &str, res: Result<T, SqlFacadeError>, canceled: bool) {
    match res {
        Err(SqlFacadeError::Canceled) if canceled => {}
        Err(SqlFacadeError::DeadlineExceeded) if !canceled => {}
        other => panic!("{what}: unexpected {other:?}"),
    }
}

async fn every_db_op_reports(db: &SqlDb, ctx: &Context, canceled: bool) {
    expect_done("ping", db.ping(ctx).await, canceled);
    expect_done("exec", db.exec(ctx, "SELECT 1", &[]).await, canceled);
    expect_done("query", db.query(ctx, "SELECT 1", &[]).await, canceled);
    expect_done(
        "query_row",
        db.query_row(ctx, "SELECT 1", &[]).await.scan::<(i64,)>(),
        canceled,
    );
    expect_done("prepare", db.prepare(ctx, "SELECT 1").await, canceled);
    expect_done("begin_tx", db.begin_tx(ctx, None).await, canceled);
    expect_done("conn", db.conn(ctx).await, canceled);
}

#[tokio::test]
async fn canceled_context_short_circuits_every_operation() -> Result<(), Box<dyn std::error::Error>> {
    let db = single_conn_db()?;
    let ctx = Context::new();
    ctx.cancel();
    every_db_op_reports(&db, &ctx, true).await;
    assert_eq!(db.stats().open_connections, 0);

    let live = Context::new();
    let mut conn = db.conn(&live).await?;
    expect_done("conn.ping", conn.ping(&ctx).await, true);
    expect_done("conn.exec", conn.exec(&ctx, "SELECT 1", &[]).await, true);
    expect_done(
        "conn.prepare",
        conn.prepare(&ctx, "SELECT 1").await,
        true,
    );
    expect_done("conn.begin_tx", conn.begin_tx(&ctx, None).await, true);
    conn.close()?;

    db.close().await;
    every_db_op_reports(&db, &ctx, true).await;
    Ok(())
}

#[tokio::test]
async fn expired_deadline_reports_deadline_exceeded() -> Result<(), Box<dyn std::error::Error>> {
    let db = single_conn_db()?;
    let ctx = Context::new().with_deadline(Instant::now());
    every_db_op_reports(&db, &ctx, false).await;

    let mut stmt = db.prepare(&Context::new(), "SELECT 1").await?;
    expect_done("stmt.exec", stmt.exec(&ctx, &[]).await, false);
    expect_done("stmt.query", stmt.query(&ctx, &[]).await, false);
    Ok(())
}

#[tokio::test]
async fn deadline_expires_while_waiting_for_a_connection() -> Result<(), Box<dyn std::error::Error>> {
    let db = single_conn_db()?;
    let held = db.conn(&Context::new()).await?;

    let started = Instant::now();
    let ctx = Context::new().with_timeout(Duration::from_millis(100));
    let err = db.exec(&ctx, "SELECT 1", &[]).await.unwrap_err();
    assert!(err.is_deadline_exceeded(), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));

    held.close()?;
    db.exec(&Context::new(), "SELECT 1", &[]).await?;
    Ok(())
}

#[tokio::test]
async fn cancel_from_another_task_interrupts_a_waiting_call() -> Result<(), Box<dyn std::error::Error>> {
    let db = single_conn_db()?;
    let held = db.conn(&Context::new()).await?;

    let ctx = Context::new();
    let canceller = ctx.clone();
    let handle = tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = match db.begin_tx(&ctx, None).await {
        Ok(_) => panic!("begin_tx finished while the only connection was held"),
        Err(err) => err,
    };
    assert!(err.is_canceled(), "{err:?}");
    handle.await?;
    held.close()?;
    Ok(())
}

#[tokio::test]
async fn parent_cancellation_reaches_derived_contexts() -> Result<(), Box<dyn std::error::Error>> {
    let db = single_conn_db()?;
    let parent = Context::new();
    let child = parent.with_timeout(Duration::from_secs(30));
    db.ping(&child).await?;

    parent.cancel();
    let err = db.ping(&child).await.unwrap_err();
    assert!(err.is_canceled());
    Ok(())
}
