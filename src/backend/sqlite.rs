use crate::backend::{DatabaseBackend, QueryBackend};
use crate::conv::{values_to_params, NativeArg};
use crate::decode::query_rows;
use crate::proto::{ExecResponse, QueryResponse, Value};
use crate::tracing_shim::{debug, trace, warn};
use crate::{Error, Location, Result};
use crossbeam::queue::ArrayQueue;
use rusqlite::{Batch, Connection, InterruptHandle, OpenFlags, Statement};
use std::sync::Mutex;
use std::time::Duration;

/// How SQLite journals writes to an on-disk database.
///
/// See <https://www.sqlite.org/pragma.html#pragma_journal_mode>. Ignored for in-memory databases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "binary", derive(clap::ValueEnum))]
pub enum JournalMode {
    /// Delete the rollback journal at the end of each transaction.
    Delete,
    /// Truncate the rollback journal instead of deleting it.
    Truncate,
    /// Overwrite the rollback journal header instead of deleting it.
    Persist,
    /// Keep the rollback journal in memory.
    Memory,
    /// Write-ahead logging. Readers do not block the writer.
    #[default]
    Wal,
    /// No journal. A crash mid-transaction can corrupt the database.
    Off,
}

impl JournalMode {
    /// The value passed to `PRAGMA journal_mode`.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }
}

/// Whether connections to an on-disk database share one page cache.
///
/// In-memory databases always use a shared cache, as that is the only way for several connections
/// to see the same data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "binary", derive(clap::ValueEnum))]
pub enum CacheMode {
    /// One cache for every connection in the process, with table-level locking.
    Shared,
    /// A cache per connection.
    #[default]
    Private,
}

/// Options applied to every connection a [`Sqlite`] backend opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Journal mode for on-disk databases.
    pub journal_mode: JournalMode,
    /// Cache mode for on-disk databases.
    pub cache: CacheMode,
    /// How long a connection waits for a lock held by another writer before failing.
    pub busy_timeout: Duration,
    /// How many idle connections are kept for reuse. Zero disables reuse.
    pub max_idle: usize,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            journal_mode: JournalMode::Wal,
            cache: CacheMode::Private,
            busy_timeout: Duration::from_secs(5),
            max_idle: 16,
        }
    }
}

/// SQLite, through `rusqlite`.
#[derive(Debug)]
pub struct Sqlite {
    location: Location,
    /// The name every connection is opened with.
    target: String,
    config: SqliteConfig,
    /// Connections waiting to be reused. `None` when reuse is disabled.
    idle: Option<ArrayQueue<Connection>>,
    /// Keeps an in-memory database alive while no other connection is open.
    _anchor: Option<Mutex<Connection>>,
}

impl Sqlite {
    /// Create a backend with the given options.
    ///
    /// For an in-memory location, one connection is opened immediately and held until the
    /// backend is dropped.
    pub fn with_config(location: Location, config: SqliteConfig) -> Result<Self> {
        let target = location.open_target();
        let idle = (config.max_idle > 0).then(|| ArrayQueue::new(config.max_idle));
        let mut backend = Self {
            location,
            target,
            config,
            idle,
            _anchor: None,
        };
        if backend.location == Location::InMemory {
            backend._anchor = Some(Mutex::new(backend.open()?));
        }
        Ok(backend)
    }

    /// The options connections are opened with.
    #[must_use]
    pub const fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Open and configure a new connection.
    fn open(&self) -> Result<Connection> {
        let mut flags = OpenFlags::default();
        if let Location::OnDisk { .. } = self.location {
            flags |= match self.config.cache {
                CacheMode::Shared => OpenFlags::SQLITE_OPEN_SHARED_CACHE,
                CacheMode::Private => OpenFlags::SQLITE_OPEN_PRIVATE_CACHE,
            };
        }

        let connection = Connection::open_with_flags(&self.target, flags)?;
        connection.busy_timeout(self.config.busy_timeout)?;

        if let Location::OnDisk { .. } = self.location {
            let mode: String = connection.pragma_update_and_check(
                None,
                "journal_mode",
                self.config.journal_mode.as_str(),
                |row| row.get(0),
            )?;
            debug!(journal_mode = %mode, "opened connection");
        } else {
            debug!(target = %self.target, "opened connection");
        }

        Ok(connection)
    }
}

impl DatabaseBackend for Sqlite {
    type Connection = Connection;
    type Error = Error;

    fn at_location(location: Location) -> Result<Self> {
        Self::with_config(location, SqliteConfig::default())
    }

    fn location(&self) -> &Location {
        &self.location
    }

    fn connect(&self) -> Result<Connection> {
        match self.idle.as_ref().and_then(ArrayQueue::pop) {
            Some(connection) => Ok(connection),
            None => self.open(),
        }
    }

    fn recycle(&self, connection: Connection) {
        // A connection left inside a transaction would leak it into the next call.
        if !connection.is_autocommit() {
            warn!("closing connection with an open transaction");
            return;
        }
        if let Some(idle) = &self.idle {
            if idle.push(connection).is_err() {
                trace!("idle pool full, closing connection");
            }
        }
    }
}

impl QueryBackend for Sqlite {
    type InterruptHandle = InterruptHandle;

    fn interrupt_handle(connection: &Connection) -> InterruptHandle {
        connection.get_interrupt_handle()
    }

    fn interrupt(handle: &InterruptHandle) {
        handle.interrupt();
    }

    fn execute(connection: &Connection, sql: &str, parameters: Vec<Value>) -> Result<ExecResponse> {
        let params = values_to_params(parameters)?;
        let mut batch = Batch::new(connection, sql);
        let mut remaining = params.as_slice();
        let mut changed = 0;

        // Each statement is prepared only after the previous one has run, so later statements
        // can refer to tables created earlier in the same text.
        while let Some(mut statement) = batch.next()? {
            let own = take_params(&statement, &mut remaining, params.len())?;
            run_to_completion(&mut statement, own)?;
            changed = connection.changes();
        }
        if !remaining.is_empty() {
            return Err(rusqlite::Error::InvalidParameterCount(
                params.len(),
                params.len() - remaining.len(),
            )
            .into());
        }

        // The statements have already taken effect, so this is reported rather than failed.
        let rows_affected = i64::try_from(changed).unwrap_or_else(|_| {
            warn!(changed, "rows affected does not fit in an i64");
            0
        });

        Ok(ExecResponse {
            last_insert_id: connection.last_insert_rowid(),
            rows_affected,
        })
    }

    fn query(connection: &Connection, sql: &str, parameters: Vec<Value>) -> Result<QueryResponse> {
        let params = values_to_params(parameters)?;
        let mut batch = Batch::new(connection, sql);
        let Some(mut statement) = batch.next()? else {
            return Ok(QueryResponse::default());
        };
        // Anything after the first statement, including text that fails to prepare.
        if !matches!(batch.next(), Ok(None)) {
            return Err(Error::MultipleStatements);
        }
        query_rows(&mut statement, &params)
    }
}

/// Split off the parameters `statement` binds from the front of `remaining`.
fn take_params<'p>(
    statement: &Statement<'_>,
    remaining: &mut &'p [NativeArg],
    total: usize,
) -> Result<&'p [NativeArg]> {
    let count = statement.parameter_count();
    if remaining.len() < count {
        let needed = total - remaining.len() + count;
        return Err(rusqlite::Error::InvalidParameterCount(total, needed).into());
    }
    let (own, rest) = remaining.split_at(count);
    *remaining = rest;
    Ok(own)
}

/// Bind `params` and step `statement` until it is done, discarding any rows it returns.
fn run_to_completion(statement: &mut Statement<'_>, params: &[NativeArg]) -> Result<()> {
    for (idx, param) in params.iter().enumerate() {
        statement.raw_bind_parameter(idx + 1, param)?;
    }
    let mut rows = statement.raw_query();
    while rows.next()?.is_some() {}
    Ok(())
}
