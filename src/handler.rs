//! The RPC surface: `Exec` and `Query`.

use crate::backend::{DatabaseBackend, QueryBackend, Sqlite, SqliteConfig};
use crate::interop::{into_tonic_status, IntoTonicStatus};
use crate::proto::{ExecRequest, ExecResponse, QueryRequest, QueryResponse};
use crate::tracing_shim::debug;
use crate::{DatabaseRpc, DatabaseServer, Error, Location, RpcResponse};
use std::path::PathBuf;
use tonic::codec::CompressionEncoding;
use tonic::{Request, Response, Status};

/// Serves statements against one database.
///
/// Each call takes a connection from the backend, runs the statement on the blocking thread pool,
/// and hands the connection back. Nothing is cached between calls.
#[must_use]
#[derive(Debug)]
pub struct DatabaseHandler<Backend> {
    backend: Backend,
}

impl<Backend> DatabaseHandler<Backend>
where
    Backend: DatabaseBackend,
{
    /// Create a handler for the database at the given location.
    #[inline]
    pub fn at_location(location: Location) -> Result<Self, Backend::Error> {
        Ok(Self {
            backend: Backend::at_location(location)?,
        })
    }

    /// Create a handler for the database file at the given path.
    #[inline]
    pub fn at_path<P>(path: P) -> Result<Self, Backend::Error>
    where
        P: Into<PathBuf>,
    {
        Self::at_location(Location::OnDisk { path: path.into() })
    }

    /// Create a handler for a fresh in-memory database.
    #[inline]
    pub fn in_memory() -> Result<Self, Backend::Error> {
        Self::at_location(Location::InMemory)
    }

    /// The backend statements run on.
    #[inline]
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }
}

impl DatabaseHandler<Sqlite> {
    /// Create a handler whose connections are opened with the given options.
    #[inline]
    pub fn with_config(location: Location, config: SqliteConfig) -> crate::Result<Self> {
        Ok(Self {
            backend: Sqlite::with_config(location, config)?,
        })
    }
}

impl<Backend> DatabaseHandler<Backend>
where
    Backend: QueryBackend<Connection: Send + 'static, Error: IntoTonicStatus + Send + 'static>
        + Send
        + Sync
        + 'static,
{
    /// Wrap the handler in a gRPC service that accepts and sends gzip-compressed messages.
    pub fn into_server(self) -> DatabaseServer<Self> {
        DatabaseServer::new(self)
            .accept_compressed(CompressionEncoding::Gzip)
            .send_compressed(CompressionEncoding::Gzip)
    }

    /// Run `f` on a connection without blocking the async runtime.
    ///
    /// If the returned future is dropped before `f` finishes, the connection is interrupted so the
    /// engine stops working on a call nobody is waiting for.
    async fn run_blocking<T, F>(&self, f: F) -> Result<T, Status>
    where
        F: FnOnce(&Backend::Connection) -> Result<T, Backend::Error> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.backend.connect().map_err(into_tonic_status)?;
        let guard = InterruptOnDrop::<Backend> {
            handle: Some(Backend::interrupt_handle(&connection)),
        };

        let joined = tokio::task::spawn_blocking(move || {
            let res = f(&connection);
            (res, connection)
        })
        .await;
        guard.disarm();

        let (res, connection) = joined.map_err(|err| Error::TaskFailed(err).into_tonic_status())?;
        self.backend.recycle(connection);
        res.map_err(into_tonic_status)
    }
}

#[tonic::async_trait]
impl<Backend> DatabaseRpc for DatabaseHandler<Backend>
where
    Backend: QueryBackend<Connection: Send + 'static, Error: IntoTonicStatus + Send + 'static>
        + Send
        + Sync
        + 'static,
{
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(sql = %request.get_ref().sql))
    )]
    async fn exec(&self, request: Request<ExecRequest>) -> RpcResponse<ExecResponse> {
        let ExecRequest { sql, parameters } = request.into_inner();
        let response = self
            .run_blocking(move |connection| Backend::execute(connection, &sql, parameters))
            .await?;
        Ok(Response::new(response))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(sql = %request.get_ref().sql))
    )]
    async fn query(&self, request: Request<QueryRequest>) -> RpcResponse<QueryResponse> {
        let QueryRequest { sql, parameters } = request.into_inner();
        let response = self
            .run_blocking(move |connection| Backend::query(connection, &sql, parameters))
            .await?;
        debug!(rows = response.rows.len(), "query complete");
        Ok(Response::new(response))
    }
}

/// Interrupts a connection when dropped, unless disarmed first.
struct InterruptOnDrop<Backend: QueryBackend> {
    handle: Option<Backend::InterruptHandle>,
}

impl<Backend: QueryBackend> InterruptOnDrop<Backend> {
    /// The call finished; nothing needs interrupting.
    fn disarm(mut self) {
        self.handle = None;
    }
}

impl<Backend: QueryBackend> Drop for InterruptOnDrop<Backend> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("call abandoned, interrupting connection");
            Backend::interrupt(&handle);
        }
    }
}
