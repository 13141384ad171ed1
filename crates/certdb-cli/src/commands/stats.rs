//! Stats command implementation

use certdb::prelude::*;
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreChoice {
    Sqlite,
    Lmdb,
    Both,
}

impl StoreChoice {
    fn includes(self, backend: BackendKind) -> bool {
        match self {
            Self::Both => true,
            Self::Sqlite => backend == BackendKind::Sqlite,
            Self::Lmdb => backend == BackendKind::Lmdb,
        }
    }
}

/// Print one line per selected store. Missing stores are reported inline.
pub fn execute(choice: StoreChoice, sqlite_path: PathBuf, lmdb_path: PathBuf) {
    for (backend, path) in [
        (BackendKind::Sqlite, sqlite_path),
        (BackendKind::Lmdb, lmdb_path),
    ] {
        if choice.includes(backend) {
            tracing::debug!("Reading {} stats from {}", backend, path.display());
            println!("{}", StatsReport::for_store(backend, path));
        }
    }
}
