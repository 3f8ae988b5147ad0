use crate::driver::Statement;
use crate::proto::database_client::DatabaseClient;
use crate::{Error, Result};
use std::sync::{Arc, PoisonError, RwLock};
use tonic::codec::CompressionEncoding;
use tonic::transport::{Channel, Endpoint, Uri};

/// Creates [`Connection`]s to a server.
#[derive(Debug, Clone)]
pub struct Connector {
    /// Where connections go.
    target: Target,
    /// Whether requests are gzip-compressed and compressed responses are accepted.
    compression: bool,
}

/// A server address, or a channel that is already set up.
#[derive(Debug, Clone)]
enum Target {
    /// Dialed lazily on the first call.
    Endpoint(Endpoint),
    /// Used as-is.
    Channel(Channel),
}

impl Connector {
    /// A connector for the server at `url`, such as `http://127.0.0.1:8080`.
    ///
    /// The url must parse and must carry a scheme.
    pub fn new(url: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidUrl {
            url: url.to_owned(),
            reason,
        };
        let uri = url.parse::<Uri>().map_err(|err| invalid(err.to_string()))?;
        if uri.scheme().is_none() {
            return Err(invalid("scheme must be set in url".to_owned()));
        }
        Ok(Self {
            target: Target::Endpoint(Endpoint::from(uri)),
            compression: false,
        })
    }

    /// A connector that reuses an existing channel.
    #[inline]
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            target: Target::Channel(channel),
            compression: false,
        }
    }

    /// Enable or disable gzip compression for connections created after this call.
    #[inline]
    #[must_use]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    /// Open a connection.
    ///
    /// Nothing is dialed until the first call, so this never fails. It must be called from
    /// within a Tokio runtime.
    #[must_use]
    pub fn connect(&self) -> Connection {
        let channel = match &self.target {
            Target::Endpoint(endpoint) => endpoint.connect_lazy(),
            Target::Channel(channel) => channel.clone(),
        };
        let mut client = DatabaseClient::new(channel);
        if self.compression {
            client = client
                .send_compressed(CompressionEncoding::Gzip)
                .accept_compressed(CompressionEncoding::Gzip);
        }
        Connection {
            handle: Handle::open(client),
        }
    }
}

/// A logical connection. Statements prepared on it share its open/closed state.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Shared with every statement prepared on this connection.
    handle: Handle,
}

impl Connection {
    /// Prepare `sql` for execution. No round trip is made.
    pub fn prepare(&self, sql: impl Into<String>) -> Result<Statement> {
        self.handle.ensure_open()?;
        Ok(Statement::new(self.handle.clone(), sql.into()))
    }

    /// Transactions are not supported; this always fails.
    pub fn begin(&self) -> Result<Transaction> {
        self.handle.ensure_open()?;
        Err(Error::TransactionsUnsupported)
    }

    /// Close the connection. Closing twice is a no-op.
    #[inline]
    pub fn close(&self) -> Result<()> {
        self.handle.close();
        Ok(())
    }

    /// Whether the connection has been closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }
}

/// A transaction. No value of this type can exist, as [`Connection::begin`] always fails.
#[derive(Debug, Clone, Copy)]
pub enum Transaction {}

/// The open/closed state shared by a connection and its statements.
#[derive(Debug, Clone)]
pub(crate) struct Handle(Arc<RwLock<Option<DatabaseClient<Channel>>>>);

impl Handle {
    /// An open handle wrapping `client`.
    fn open(client: DatabaseClient<Channel>) -> Self {
        Self(Arc::new(RwLock::new(Some(client))))
    }

    /// A client for one call, or `ConnectionClosed`.
    pub(crate) fn client(&self) -> Result<DatabaseClient<Channel>> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::ConnectionClosed)
    }

    /// Fail with `ConnectionClosed` once closed.
    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::ConnectionClosed)
        } else {
            Ok(())
        }
    }

    /// Drop the client. Later calls fail.
    fn close(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether [`Handle::close`] has been called.
    fn is_closed(&self) -> bool {
        self.0.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}
