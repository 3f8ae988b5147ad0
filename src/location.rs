use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Distinguishes the in-memory databases opened by one process.
static IN_MEMORY_ID: AtomicUsize = AtomicUsize::new(0);

/// Where a database lives.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// A private in-memory database. Its contents are lost once the backend that opened it is
    /// dropped.
    InMemory,
    /// A database file on disk.
    OnDisk {
        /// Path to the database file. It is created if it does not exist.
        path: PathBuf,
    },
}

impl Location {
    /// The string handed to SQLite when opening a connection.
    ///
    /// Every connection to an in-memory database must use the same name with a shared cache, or
    /// each would see a database of its own. A fresh name is therefore allocated per call; the
    /// backend calls this once and reuses the result.
    pub(crate) fn open_target(&self) -> String {
        match self {
            Self::InMemory => format!(
                "file:sqliterpc-memory-{}?mode=memory&cache=shared",
                IN_MEMORY_ID.fetch_add(1, Ordering::Relaxed)
            ),
            Self::OnDisk { path } => path.to_string_lossy().into_owned(),
        }
    }
}

impl<T> From<T> for Location
where
    T: Into<PathBuf>,
{
    fn from(path: T) -> Self {
        Self::OnDisk { path: path.into() }
    }
}
