//! Storage engines a [`DatabaseHandler`](crate::handler::DatabaseHandler) can run statements on.

mod sqlite;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::sqlite::Sqlite {}
}

pub use self::sqlite::{CacheMode, JournalMode, Sqlite, SqliteConfig};
use crate::proto::{ExecResponse, QueryResponse, Value};
use crate::Location;

/// A database that connections can be opened to.
pub trait DatabaseBackend: sealed::Sealed + Sized {
    /// A single connection. It is used by at most one call at a time.
    type Connection;
    /// The error returned by every fallible operation.
    type Error;

    /// Create a backend for the database at the given location. No connection is opened unless
    /// the location requires one to exist for the database to persist.
    fn at_location(location: Location) -> Result<Self, Self::Error>;

    /// Where the database lives.
    fn location(&self) -> &Location;

    /// Obtain a connection, reusing an idle one when available.
    fn connect(&self) -> Result<Self::Connection, Self::Error>;

    /// Hand a connection back once a call has finished with it.
    ///
    /// The default closes the connection.
    fn recycle(&self, connection: Self::Connection) {
        drop(connection);
    }
}

/// A database that can execute parameterized SQL.
///
/// The statement methods block until the engine finishes and are run off the async runtime by
/// the caller.
pub trait QueryBackend: DatabaseBackend {
    /// A handle that can stop an in-flight call on a connection from another thread.
    type InterruptHandle: Send + 'static;

    /// Obtain the interrupt handle for a connection.
    fn interrupt_handle(connection: &Self::Connection) -> Self::InterruptHandle;

    /// Stop whatever the connection behind the handle is doing. The interrupted call fails.
    fn interrupt(handle: &Self::InterruptHandle);

    /// Run a statement that does not return rows.
    fn execute(
        connection: &Self::Connection,
        sql: &str,
        parameters: Vec<Value>,
    ) -> Result<ExecResponse, Self::Error>;

    /// Run a statement and decode every row it returns.
    fn query(
        connection: &Self::Connection,
        sql: &str,
        parameters: Vec<Value>,
    ) -> Result<QueryResponse, Self::Error>;
}
