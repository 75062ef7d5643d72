//! Contributor metadata fetched from an external title database.

mod client;
mod error;
mod retry_policy;
mod tmdb;

pub use client::{EnrichmentClient, NoOpEnrichmentClient};
pub use error::{EnrichmentError, EnrichmentErrorKind};
pub use retry_policy::RetryPolicy;
pub use tmdb::{TmdbClient, DEFAULT_TMDB_BASE_URL};
