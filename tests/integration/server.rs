use crate::helpers::TempDatabase;
use anyhow::Result;
use prost_types::Timestamp;
use serial_test::serial;
use sqliterpc::proto::{Column, ExecRequest, QueryRequest, Row, Value};
use sqliterpc::transitive::database_client;
use sqliterpc::{Location, TypeCode};
use tonic::Code;

const CREATE_ALL_TYPES: &str = "CREATE TABLE all_types (
    i INTEGER,
    s TEXT,
    b BLOB,
    r REAL,
    n NUMERIC,
    f BOOLEAN,
    ts DATETIME
)";

const INSERT_ALL_TYPES: &str = "INSERT INTO all_types VALUES (?, ?, ?, ?, ?, ?, ?)";

fn exec_request(sql: &str, parameters: Vec<Value>) -> ExecRequest {
    ExecRequest {
        sql: sql.to_owned(),
        parameters,
    }
}

fn query_request(sql: &str, parameters: Vec<Value>) -> QueryRequest {
    QueryRequest {
        sql: sql.to_owned(),
        parameters,
    }
}

fn timestamp() -> Timestamp {
    Timestamp {
        seconds: 1_714_979_289,
        nanos: 250_000_000,
    }
}

fn valid_row() -> Vec<Value> {
    vec![
        Value::integer(42),
        Value::text("hello"),
        Value::blob(vec![0, 1, 2, 255]),
        Value::real(2.5),
        Value::numeric(1.25),
        Value::boolean(true),
        Value::time(timestamp()),
    ]
}

fn typed_null_row() -> Vec<Value> {
    vec![
        Value::null_integer(),
        Value::null_text(),
        Value::null_blob(),
        Value::null_real(),
        Value::null_numeric(),
        Value::null_boolean(),
        Value::null_time(),
    ]
}

#[tokio::test]
async fn every_type_round_trips() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let _response = client.exec(exec_request(CREATE_ALL_TYPES, vec![])).await?;

    for (expected_id, parameters) in (1..).zip([
        valid_row(),
        typed_null_row(),
        vec![Value::generic_null(); 7],
    ]) {
        let response = client
            .exec(exec_request(INSERT_ALL_TYPES, parameters))
            .await?
            .into_inner();
        assert_eq!(response.rows_affected, 1);
        assert_eq!(response.last_insert_id, expected_id);
    }

    let response = client
        .query(query_request(
            "SELECT i, s, b, r, n, f, ts FROM all_types ORDER BY rowid",
            vec![],
        ))
        .await?
        .into_inner();

    let expected_columns = [
        ("i", TypeCode::Integer),
        ("s", TypeCode::Text),
        ("b", TypeCode::Blob),
        ("r", TypeCode::Real),
        ("n", TypeCode::Numeric),
        ("f", TypeCode::Bool),
        ("ts", TypeCode::Time),
    ]
    .map(|(name, code)| Column {
        name: name.to_owned(),
        r#type: code.into(),
    });
    assert_eq!(response.columns, expected_columns);

    assert_eq!(
        response.rows,
        [
            Row { values: valid_row() },
            Row { values: typed_null_row() },
            Row { values: typed_null_row() },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn parameters_filter_rows() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let _response = client
        .exec(exec_request("CREATE TABLE users (id INTEGER, name VARCHAR(32))", vec![]))
        .await?;
    for (id, name) in [(1, "ada"), (2, "grace"), (3, "barbara")] {
        let _response = client
            .exec(exec_request(
                "INSERT INTO users VALUES (?, ?)",
                vec![Value::integer(id), Value::text(name)],
            ))
            .await?;
    }

    let response = client
        .query(query_request(
            "SELECT name FROM users WHERE id >= ? ORDER BY id",
            vec![Value::integer(2)],
        ))
        .await?
        .into_inner();
    assert_eq!(
        response.rows,
        [
            Row { values: vec![Value::text("grace")] },
            Row { values: vec![Value::text("barbara")] },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn empty_result_keeps_columns() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let _response = client
        .exec(exec_request("CREATE TABLE t (id BIGINT)", vec![]))
        .await?;

    let response = client
        .query(query_request("SELECT id FROM t", vec![]))
        .await?
        .into_inner();
    assert_eq!(response.columns.len(), 1);
    assert_eq!(response.columns[0].r#type(), TypeCode::Integer);
    assert!(response.rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn exec_runs_every_statement_in_the_text() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let _response = client
        .exec(exec_request(
            "CREATE TABLE a (x INTEGER); CREATE TABLE b (y INTEGER)",
            vec![],
        ))
        .await?;

    for sql in ["SELECT x FROM a", "SELECT y FROM b"] {
        let response = client.query(query_request(sql, vec![])).await?.into_inner();
        assert!(response.rows.is_empty(), "{sql}");
    }
    Ok(())
}

#[tokio::test]
async fn exec_discards_returned_rows() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let _response = client
        .exec(exec_request("CREATE TABLE t (n INTEGER)", vec![]))
        .await?;

    let response = client
        .exec(exec_request(
            "INSERT INTO t VALUES (?) RETURNING n",
            vec![Value::integer(9)],
        ))
        .await?
        .into_inner();
    assert_eq!(response.rows_affected, 1);
    assert_eq!(response.last_insert_id, 1);

    let _response = client
        .exec(exec_request("PRAGMA journal_mode", vec![]))
        .await?;
    Ok(())
}

#[tokio::test]
async fn query_with_trailing_statement_is_rejected() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let _response = client
        .exec(exec_request("CREATE TABLE t (n INTEGER)", vec![]))
        .await?;

    let status = client
        .query(query_request("SELECT n FROM t; DROP TABLE t", vec![]))
        .await
        .expect_err("only one statement may produce rows");
    assert_eq!(status.code(), Code::Internal);

    // The trailing statement never ran.
    let response = client
        .query(query_request("SELECT n FROM t", vec![]))
        .await?
        .into_inner();
    assert!(response.rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn expression_column_is_rejected() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let status = client
        .query(query_request("SELECT 1 AS one", vec![]))
        .await
        .expect_err("expression columns have no declared type");
    assert_eq!(status.code(), Code::Internal);
    assert!(status.message().contains("one"), "{}", status.message());
    Ok(())
}

#[tokio::test]
async fn engine_errors_are_internal() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let status = client
        .exec(exec_request("INSERT INTO missing VALUES (1)", vec![]))
        .await
        .expect_err("table does not exist");
    assert_eq!(status.code(), Code::Internal);
    assert!(status.message().contains("missing"), "{}", status.message());
    Ok(())
}

#[tokio::test]
async fn empty_parameter_is_rejected() -> Result<()> {
    let mut client = database_client(Location::InMemory).await?;
    let status = client
        .query(query_request("SELECT ?", vec![Value::default()]))
        .await
        .expect_err("a parameter without a variant cannot be bound");
    assert_eq!(status.code(), Code::Internal);
    Ok(())
}

#[tokio::test]
#[serial]
async fn on_disk_database_persists() -> Result<()> {
    let database = TempDatabase::new("test_sqliterpc_persist.db");

    {
        let mut client = database_client(database.location()).await?;
        let _response = client
            .exec(exec_request("CREATE TABLE notes (body TEXT)", vec![]))
            .await?;
        let _response = client
            .exec(exec_request(
                "INSERT INTO notes VALUES (?)",
                vec![Value::text("kept")],
            ))
            .await?;
    }

    let mut client = database_client(database.location()).await?;
    let response = client
        .query(query_request("SELECT body FROM notes", vec![]))
        .await?
        .into_inner();
    assert_eq!(response.rows, [Row { values: vec![Value::text("kept")] }]);
    Ok(())
}

#[tokio::test]
#[serial]
async fn concurrent_writers_wait_for_each_other() -> Result<()> {
    let database = TempDatabase::new("test_sqliterpc_concurrent.db");
    let mut client = database_client(database.location()).await?;
    let _response = client
        .exec(exec_request("CREATE TABLE counter (n INTEGER)", vec![]))
        .await?;

    let mut tasks = Vec::new();
    for n in 0..8 {
        let mut client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .exec(exec_request(
                    "INSERT INTO counter VALUES (?)",
                    vec![Value::integer(n)],
                ))
                .await
        }));
    }
    for task in tasks {
        assert_eq!(task.await??.into_inner().rows_affected, 1);
    }

    let response = client
        .query(query_request("SELECT n FROM counter", vec![]))
        .await?
        .into_inner();
    assert_eq!(response.rows.len(), 8);
    Ok(())
}
