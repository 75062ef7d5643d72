use std::path::PathBuf;
use thiserror::Error;

pub const POSITIVE_INT_ERR_MESSAGE: &str = "top_n must be a positive integer";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

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
