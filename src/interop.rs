//! Conversion of crate errors into gRPC statuses.

use crate::tracing_shim::warn;
use crate::Error;
use std::sync::Arc;
use tonic::Status;

/// Convert an error into a [`Status`] suitable for returning from an RPC.
pub trait IntoTonicStatus {
    /// Perform the conversion.
    fn into_tonic_status(self) -> Status;
}

impl IntoTonicStatus for Status {
    fn into_tonic_status(self) -> Status {
        self
    }
}

impl IntoTonicStatus for rusqlite::Error {
    fn into_tonic_status(self) -> Status {
        Error::Engine(self).into_tonic_status()
    }
}

impl IntoTonicStatus for Error {
    fn into_tonic_status(self) -> Status {
        // A status returned by the client half is passed through untouched.
        let err = match self {
            Self::Rpc(status) => return status,
            err => err,
        };

        let mut status = if is_interrupt(&err) {
            Status::cancelled(err.to_string())
        } else {
            warn!(error = %err, "statement failed");
            Status::internal(err.to_string())
        };
        status.set_source(Arc::new(err));
        status
    }
}

/// Whether the engine call was stopped by an interrupt rather than failing on its own.
fn is_interrupt(err: &Error) -> bool {
    matches!(
        err,
        Error::Engine(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::OperationInterrupted,
                ..
            },
            _,
        ))
    )
}

/// Shorthand for use with `map_err`.
pub(crate) fn into_tonic_status<E: IntoTonicStatus>(err: E) -> Status {
    err.into_tonic_status()
}
