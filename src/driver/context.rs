use crate::{Error, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tonic::{Request, Response, Status};

/// The deadline a call must finish by.
///
/// The remaining time is sent to the server as the call's timeout and is also enforced locally.
/// A call can additionally be cancelled by dropping its future.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    deadline: Option<Instant>,
}

impl Context {
    /// A context without a deadline.
    #[inline]
    #[must_use]
    pub const fn background() -> Self {
        Self { deadline: None }
    }

    /// A context whose deadline is `timeout` from now.
    #[inline]
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// A context with the given deadline.
    #[inline]
    #[must_use]
    pub const fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// The deadline, if any.
    #[inline]
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. Fails once it has passed.
    fn remaining(&self) -> Result<Option<Duration>> {
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    Err(Error::DeadlineExceeded)
                } else {
                    Ok(Some(remaining))
                }
            }
        }
    }

    /// Wrap a message in a request carrying the remaining time as its timeout.
    pub(crate) fn request<T>(&self, message: T) -> Result<Request<T>> {
        let mut request = Request::new(message);
        if let Some(remaining) = self.remaining()? {
            request.set_timeout(remaining);
        }
        Ok(request)
    }

    /// Await a call, giving up once the deadline passes.
    pub(crate) async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<Response<T>, Status>>,
    {
        let response = match self.remaining()? {
            Some(remaining) => tokio::time::timeout(remaining, call)
                .await
                .map_err(|_| Error::DeadlineExceeded)?,
            None => call.await,
        };
        Ok(response?.into_inner())
    }
}
