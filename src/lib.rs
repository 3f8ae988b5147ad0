//! SQL statements and typed result sets over gRPC.
//!
//! The server half ([`handler::DatabaseHandler`]) exposes a SQLite database through two RPCs,
//! `Exec` and `Query`. Parameters and result values cross the wire as a tagged union
//! ([`proto::Value`]) that keeps both the nullability and the column type of every value. The
//! client half ([`driver`]) re-exposes those RPCs through the familiar
//! connect → prepare → execute/query → iterate → close lifecycle.

pub mod backend;
mod classify;
mod conv;
mod decode;
pub mod driver;
mod error;
pub mod handler;
mod interop;
mod location;
pub mod transitive;
mod tracing_shim;
mod value;

/// Types generated from `proto/sqliterpc.proto`.
pub mod proto {
    #![allow(
        missing_docs,
        clippy::missing_docs_in_private_items,
        clippy::derive_partial_eq_without_eq,
        unreachable_pub,
        unused_qualifications,
        unused_results,
        variant_size_differences
    )]

    tonic::include_proto!("sqliterpc");
}

/// The response type of every RPC.
pub type RpcResponse<T> = Result<tonic::Response<T>, tonic::Status>;

pub use self::classify::classify;
pub use self::error::{Error, Result};
pub use self::interop::IntoTonicStatus;
pub use self::location::Location;
pub use self::proto::database_client::DatabaseClient;
pub use self::proto::database_server::{Database as DatabaseRpc, DatabaseServer};
pub use self::proto::TypeCode;
