//! Command-line interface for sqliterpc.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sqliterpc::backend::{CacheMode, JournalMode};
use sqliterpc::driver::Value;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments for sqliterpc.
#[derive(Debug, Parser)]
#[command(version, propagate_version = true)]
pub(crate) struct Args {
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// What operation to perform.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Serve a database over gRPC until interrupted with Ctrl-C.
    #[clap(alias = "serve")]
    Run(RunArgs),
    /// Execute a statement on a server and report its effect.
    Exec(ClientArgs),
    /// Run a query on a server and write its rows to stdout.
    ///
    /// The first line holds the column names. Values are separated by tabs, and nulls are
    /// written as `NULL`.
    #[clap(alias = "select")]
    Query(ClientArgs),
}

/// Arguments for running the server.
#[derive(Debug, Parser)]
pub(crate) struct RunArgs {
    /// The database file. It is created if it does not exist.
    #[clap(long, default_value = "sqliterpc.db", conflicts_with = "in_memory")]
    pub(crate) database: PathBuf,
    /// Serve a fresh in-memory database instead of a file.
    #[clap(long)]
    pub(crate) in_memory: bool,
    /// Journal mode for the database file.
    #[clap(long, value_enum, default_value_t)]
    pub(crate) journal_mode: JournalMode,
    /// Whether connections to the database file share a page cache.
    #[clap(long, value_enum, default_value_t)]
    pub(crate) cache: CacheMode,
    /// How long a writer waits for a lock before failing, in milliseconds.
    #[clap(long, default_value_t = 5000)]
    pub(crate) busy_timeout_ms: u64,
    /// How many idle connections are kept for reuse.
    #[clap(long, default_value_t = 16)]
    pub(crate) max_idle: usize,
    /// The address to listen on.
    #[clap(default_value = "127.0.0.1:8080")]
    pub(crate) addr: SocketAddr,
}

/// Arguments for running a statement against a server.
#[derive(Debug, Parser)]
pub(crate) struct ClientArgs {
    /// The server to connect to.
    #[clap(long, default_value = "http://127.0.0.1:8080")]
    pub(crate) url: String,
    /// The statement, with `?` placeholders.
    pub(crate) sql: String,
    /// Values for the placeholders, in order.
    ///
    /// Each is `null` or `KIND:VALUE`, where `KIND` is one of `int`, `real`, `text`, `bool`,
    /// `blob` (hex, as printed by `query`), or `time` (RFC 3339).
    #[clap(value_parser = parse_param)]
    pub(crate) params: Vec<Value>,
}

/// Parse a parameter written as `null` or `KIND:VALUE`.
fn parse_param(param: &str) -> Result<Value, String> {
    if param == "null" {
        return Ok(Value::Null);
    }
    let Some((kind, value)) = param.split_once(':') else {
        return Err(format!("expected `null` or KIND:VALUE, found {param:?}"));
    };
    match kind {
        "int" => value.parse().map(Value::Integer).map_err(|err| err.to_string()),
        "real" => value.parse().map(Value::Real).map_err(|err| err.to_string()),
        "text" => Ok(Value::Text(value.to_owned())),
        "bool" => value.parse().map(Value::Bool).map_err(|err| err.to_string()),
        "blob" => parse_hex(value).map(Value::Blob),
        "time" => DateTime::parse_from_rfc3339(value)
            .map(|time| Value::Time(time.with_timezone(&Utc)))
            .map_err(|err| err.to_string()),
        _ => Err(format!("unknown parameter kind {kind:?}")),
    }
}

/// Decode lowercase or uppercase hex, two digits per byte.
fn parse_hex(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(format!("invalid hex {hex:?}"));
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex {hex:?}"))
        })
        .collect()
}
