//! Moviestats Library
//!
//! Ingests a personal ratings export into SQLite, enriches every title with
//! its contributors and runs aggregate reports over the result.

pub mod analysis;
pub mod category;
pub mod config;
pub mod enrichment;
pub mod ingestion;
pub mod ratings_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisError, AnalysisSettings, RatingsAnalyser};
pub use category::Category;
pub use enrichment::{EnrichmentClient, NoOpEnrichmentClient, RetryPolicy, TmdbClient};
pub use ingestion::{EnrichmentFailurePolicy, IngestionPipeline, IngestionReport, RatingsSource};
pub use ratings_store::{SqliteRatingsStore, StoreError};
