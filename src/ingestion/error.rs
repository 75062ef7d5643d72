use std::path::PathBuf;
use thiserror::Error;

use crate::ratings_store::StoreError;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Failed to open ratings file {path:?}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ratings file has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("Malformed ratings file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
