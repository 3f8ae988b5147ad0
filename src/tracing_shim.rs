//! Either `tracing` or no-op stand-ins for the handful of its macros this crate uses.
//!
//! Import logging macros from here rather than from `tracing`, so that call sites need no
//! `#[cfg]`. The `#[instrument]` attribute is the exception and must be written as
//! `#[cfg_attr(feature = "tracing", tracing::instrument)]`.

#![allow(unused_imports, unused_macros)]

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, info, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! event {
    ($($x:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {event as debug, event as info, event as trace, event as warn};
