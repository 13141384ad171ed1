pub mod collect;
pub mod query;
pub mod stats;

use certdb::BackendKind;
use clap::Args;
use std::path::PathBuf;

/// Store selection shared by every command that opens a store
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend: sqlite or lmdb
    #[arg(short, long, default_value = "sqlite", env = "CERTDB_BACKEND")]
    pub backend: BackendKind,

    /// Database file (sqlite) or directory (lmdb); defaults per backend
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

impl StoreArgs {
    pub fn store_config(&self) -> certdb::StoreConfig {
        match &self.path {
            Some(path) => certdb::StoreConfig::new(self.backend, path.clone()),
            None => certdb::StoreConfig::with_default_path(self.backend),
        }
    }
}
