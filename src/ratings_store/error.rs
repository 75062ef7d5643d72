use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open ratings database {path:?}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Incompatible ratings database schema: {0:#}")]
    Schema(anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}
