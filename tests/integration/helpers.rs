use sqliterpc::Location;
use std::path::{Path, PathBuf};

/// A database file that is removed, along with its WAL and shared-memory files, when dropped.
pub(crate) struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    pub(crate) fn new(name: &str) -> Self {
        let database = Self {
            path: PathBuf::from(name),
        };
        database.remove();
        database
    }

    pub(crate) fn location(&self) -> Location {
        Location::OnDisk {
            path: self.path.clone(),
        }
    }

    fn remove(&self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _res = std::fs::remove_file(Path::new(&path));
        }
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        self.remove();
    }
}
