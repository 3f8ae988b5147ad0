use crate::proto::TypeCode;
use thiserror::Error;

/// A specialized [`Result`](std::result::Result) for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while encoding, executing, decoding, or driving a statement.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter carried no value the wire format can represent.
    #[error("unsupported parameter type: {0}")]
    UnsupportedParameterType(&'static str),
    /// A parameter's 1-based ordinal was out of range or repeated.
    #[error("invalid ordinal in value: {0}")]
    InvalidOrdinal(usize),
    /// A result column's declared type does not map to a [`TypeCode`].
    #[error("unable to handle column type {declared:?} for column {column:?}")]
    UnclassifiableColumnType {
        /// Name of the offending column.
        column: String,
        /// The declared type as reported by the engine.
        declared: String,
    },
    /// A timestamp fell outside the range the native time type supports.
    #[error("timestamp out of range: {seconds}s {nanos}ns")]
    InvalidTimestamp {
        /// Seconds since the Unix epoch.
        seconds: i64,
        /// Sub-second nanoseconds.
        nanos: i32,
    },
    /// A row value's variant disagrees with its column type.
    #[error("value for column {column:?} is not of type {expected}")]
    ValueTypeMismatch {
        /// Name of the offending column.
        column: String,
        /// The type declared by the column.
        expected: TypeCode,
    },
    /// A row has fewer values than the caller asked for.
    #[error("not enough values for receivers: {values} < {receivers}")]
    NotEnoughValues {
        /// Number of values in the row.
        values: usize,
        /// Number of destination slots supplied.
        receivers: usize,
    },
    /// A query's text held more than one statement.
    #[error("query must contain exactly one statement")]
    MultipleStatements,
    /// The underlying engine rejected an execute, query, or scan.
    #[error("engine failure: {0}")]
    Engine(#[from] rusqlite::Error),
    /// The blocking task running an engine call panicked or was aborted.
    #[error("engine task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
    /// The connection was used after being closed.
    #[error("connection closed")]
    ConnectionClosed,
    /// The statement was used after being closed.
    #[error("statement is closed")]
    StatementClosed,
    /// The row cursor was used after being closed.
    #[error("rows closed")]
    RowsClosed,
    /// Transactions cannot be started through this driver.
    #[error("transactions are not supported")]
    TransactionsUnsupported,
    /// The entry point is not supported; the message names the one to use instead.
    #[error("{0}")]
    UnsupportedOperation(&'static str),
    /// The server address could not be used.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl {
        /// The address as given.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The caller's deadline passed before the call was sent.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// The transport could not be established.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
    /// The server reported a failure.
    #[error("rpc failed: {}", .0.message())]
    Rpc(#[from] tonic::Status),
}
