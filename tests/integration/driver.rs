use anyhow::Result;
use chrono::{DateTime, Utc};
use sqliterpc::driver::{Connection, Context, NamedValue, Value};
use sqliterpc::transitive::connector;
use sqliterpc::{Error, Location, TypeCode};
use std::time::{Duration, Instant};
use tonic::Code;

async fn exec(connection: &Connection, sql: &str, args: Vec<NamedValue>) -> Result<()> {
    let statement = connection.prepare(sql)?;
    let _result = statement.exec_context(&Context::background(), args).await?;
    Ok(())
}

#[tokio::test]
async fn inserted_rows_read_back_in_order() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let connection = connector.connect();
    exec(&connection, "CREATE TABLE items (id INTEGER, label TEXT)", vec![]).await?;

    let insert = connection.prepare("INSERT INTO items VALUES (?, ?)")?;
    for id in 0..100_i64 {
        let result = insert
            .exec_context(
                &Context::background(),
                NamedValue::positional([Value::from(id), Value::from(format!("item {id}"))]),
            )
            .await?;
        assert_eq!(result.rows_affected(), 1);
        assert_eq!(result.last_insert_id(), id + 1);
    }

    let mut rows = connection
        .prepare("SELECT id, label FROM items ORDER BY id")?
        .query_context(&Context::background(), vec![])
        .await?;
    assert_eq!(rows.columns(), ["id", "label"]);

    let mut dest = [Value::Null, Value::Null];
    let mut expected = 0_i64;
    while rows.next(&mut dest)? {
        assert_eq!(dest, [Value::Integer(expected), Value::Text(format!("item {expected}"))]);
        expected += 1;
    }
    assert_eq!(expected, 100);
    rows.close()?;
    connection.close()?;
    Ok(())
}

#[tokio::test]
async fn native_values_round_trip() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let connection = connector.connect();
    exec(
        &connection,
        "CREATE TABLE mixed (i INTEGER, s TEXT, b BLOB, r REAL, n NUMERIC, f BOOL, ts TIMESTAMP)",
        vec![],
    )
    .await?;

    let when: DateTime<Utc> = "2024-05-06T07:08:09.5Z".parse()?;
    let row = vec![
        Value::Integer(-7),
        Value::from("text"),
        Value::from(vec![9_u8, 8, 7]),
        Value::Real(0.5),
        Value::Real(12.75),
        Value::Bool(false),
        Value::Time(when),
    ];
    exec(
        &connection,
        "INSERT INTO mixed VALUES (?, ?, ?, ?, ?, ?, ?)",
        NamedValue::positional(row.clone()),
    )
    .await?;
    exec(
        &connection,
        "INSERT INTO mixed VALUES (?, ?, ?, ?, ?, ?, ?)",
        NamedValue::positional(vec![Value::Null; 7]),
    )
    .await?;

    let mut rows = connection
        .prepare("SELECT * FROM mixed ORDER BY rowid")?
        .query_context(&Context::background(), vec![])
        .await?;
    let types: Vec<_> = (0..7).filter_map(|idx| rows.column_type(idx)).collect();
    assert_eq!(
        types,
        [
            TypeCode::Integer,
            TypeCode::Text,
            TypeCode::Blob,
            TypeCode::Real,
            TypeCode::Numeric,
            TypeCode::Bool,
            TypeCode::Time,
        ]
    );
    assert_eq!(rows.column_type_database_type_name(6), Some("TIMESTAMP"));

    assert_eq!(rows.next_row()?, Some(row));
    assert_eq!(rows.next_row()?, Some(vec![Value::Null; 7]));
    assert_eq!(rows.next_row()?, None);
    Ok(())
}

#[tokio::test]
async fn ordinals_may_arrive_out_of_order() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let connection = connector.connect();
    exec(&connection, "CREATE TABLE pairs (a INTEGER, b INTEGER)", vec![]).await?;
    exec(
        &connection,
        "INSERT INTO pairs VALUES (?, ?)",
        vec![NamedValue::new(2, 20_i64), NamedValue::new(1, 10_i64)],
    )
    .await?;

    let mut rows = connection
        .prepare("SELECT a, b FROM pairs")?
        .query_context(&Context::background(), vec![])
        .await?;
    assert_eq!(rows.next_row()?, Some(vec![Value::Integer(10), Value::Integer(20)]));
    Ok(())
}

#[tokio::test]
async fn invalid_ordinal_is_rejected() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let statement = connector.connect().prepare("SELECT ?")?;
    let res = statement
        .query_context(&Context::background(), vec![NamedValue::new(0, 1_i64)])
        .await;
    assert!(matches!(res, Err(Error::InvalidOrdinal(0))));
    Ok(())
}

#[tokio::test]
async fn server_failure_surfaces_as_rpc_error() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let statement = connector.connect().prepare("SELECT * FROM missing")?;
    let res = statement.query_context(&Context::background(), vec![]).await;
    match res {
        Err(Error::Rpc(status)) => {
            assert_eq!(status.code(), Code::Internal);
            assert!(status.message().contains("missing"));
        }
        other => panic!("expected an rpc error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn expired_context_is_not_sent() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let connection = connector.connect();
    let statement = connection.prepare("CREATE TABLE never (id INTEGER)")?;
    let res = statement
        .exec_context(&Context::with_deadline(Instant::now()), vec![])
        .await;
    assert!(matches!(res, Err(Error::DeadlineExceeded)));

    // The table was never created.
    let res = connection
        .prepare("SELECT id FROM never")?
        .query_context(&Context::background(), vec![])
        .await;
    assert!(matches!(res, Err(Error::Rpc(_))));
    Ok(())
}

#[tokio::test]
async fn context_with_time_left_succeeds() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let connection = connector.connect();
    let ctx = Context::with_timeout(Duration::from_secs(30));
    let result = connection
        .prepare("CREATE TABLE t (id INTEGER)")?
        .exec_context(&ctx, vec![])
        .await?;
    assert_eq!(result.rows_affected(), 0);
    Ok(())
}

#[tokio::test]
async fn lifecycle_errors() -> Result<()> {
    let connector = connector(Location::InMemory).await?;
    let connection = connector.connect();
    exec(&connection, "CREATE TABLE t (id INTEGER)", vec![]).await?;

    let mut rows = connection
        .prepare("SELECT id FROM t")?
        .query_context(&Context::background(), vec![])
        .await?;
    rows.close()?;
    assert!(rows.columns().is_empty());
    assert!(matches!(rows.next(&mut []), Err(Error::RowsClosed)));

    let mut statement = connection.prepare("SELECT id FROM t")?;
    statement.close()?;
    let res = statement.query_context(&Context::background(), vec![]).await;
    assert!(matches!(res, Err(Error::StatementClosed)));

    assert!(matches!(connection.begin(), Err(Error::TransactionsUnsupported)));

    connection.close()?;
    connection.close()?;
    assert!(matches!(connection.prepare("SELECT 1"), Err(Error::ConnectionClosed)));
    Ok(())
}
