//! Serve a SQLite database over gRPC, or run statements against a running server.
//!
//! For usage, run `cargo run --features binary -- --help`.

mod cli;

use crate::cli::{Args, ClientArgs, Command, RunArgs};
use clap::Parser as _;
use sqliterpc::backend::SqliteConfig;
use sqliterpc::driver::{Connector, Context, NamedValue, Value};
use sqliterpc::handler::DatabaseHandler;
use sqliterpc::Location;
use std::io::{self, BufWriter, Write as _};
use std::process::ExitCode;
use std::time::Duration;
use tonic::transport::Server;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Args { command } = Args::parse();

    let future = async {
        match command {
            Command::Run(args) => run(args).await,
            Command::Exec(args) => exec(args).await,
            Command::Query(args) => query(args).await,
        }
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(future)
}

/// Serve the database until Ctrl-C is pressed.
async fn run(
    RunArgs {
        database,
        in_memory,
        journal_mode,
        cache,
        busy_timeout_ms,
        max_idle,
        addr,
    }: RunArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let location = if in_memory {
        Location::InMemory
    } else {
        Location::OnDisk { path: database }
    };
    let config = SqliteConfig {
        journal_mode,
        cache,
        busy_timeout: Duration::from_millis(busy_timeout_ms),
        max_idle,
    };
    let handler = DatabaseHandler::with_config(location, config)?;

    #[cfg(feature = "tracing")]
    tracing::info!(%addr, "listening");
    Server::builder()
        .add_service(handler.into_server())
        .serve_with_shutdown(addr, async {
            if tokio::signal::ctrl_c().await.is_err() {
                // Without a signal handler, run until killed.
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(ExitCode::SUCCESS)
}

/// Execute a statement.
///
/// # stdout
///
/// The number of rows affected and the last inserted row id, one per line.
async fn exec(
    ClientArgs { url, sql, params }: ClientArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let connection = Connector::new(&url)?.with_compression(true).connect();
    let statement = connection.prepare(sql)?;
    let result = statement
        .exec_context(&Context::background(), NamedValue::positional(params))
        .await?;
    connection.close()?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "rows affected: {}", result.rows_affected())?;
    writeln!(stdout, "last insert id: {}", result.last_insert_id())?;
    Ok(ExitCode::SUCCESS)
}

/// Run a query.
///
/// # stdout
///
/// A line of column names followed by one line per row, with values separated by tabs.
async fn query(
    ClientArgs { url, sql, params }: ClientArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let connection = Connector::new(&url)?.with_compression(true).connect();
    let statement = connection.prepare(sql)?;
    let mut rows = statement
        .query_context(&Context::background(), NamedValue::positional(params))
        .await?;
    connection.close()?;

    let mut stdout = BufWriter::new(io::stdout().lock());
    writeln!(stdout, "{}", rows.columns().join("\t"))?;
    while let Some(row) = rows.next_row()? {
        let line: Vec<_> = row.iter().map(render).collect();
        writeln!(stdout, "{}", line.join("\t"))?;
    }
    rows.close()?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

/// Format a value for tabular output.
fn render(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_owned(),
        Value::Integer(value) => value.to_string(),
        Value::Real(value) => value.to_string(),
        Value::Text(value) => value.clone(),
        Value::Blob(value) => value.iter().map(|byte| format!("{byte:02x}")).collect(),
        Value::Bool(value) => value.to_string(),
        Value::Time(value) => value.to_rfc3339(),
    }
}
