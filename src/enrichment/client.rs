//! EnrichmentClient trait definition.

use super::EnrichmentError;

/// Source of contributor names for a title, keyed by its external title key.
pub trait EnrichmentClient: Send + Sync {
    /// Names of the credited cast, in billing order.
    fn cast(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError>;

    /// Names of the credited directors.
    fn directors(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError>;

    /// Names of the credited music contributors.
    fn music_contributors(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError>;
}

/// Client used when no metadata endpoint is configured. Every title has no
/// known contributors.
pub struct NoOpEnrichmentClient;

impl EnrichmentClient for NoOpEnrichmentClient {
    fn cast(&self, _title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        Ok(Vec::new())
    }

    fn directors(&self, _title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        Ok(Vec::new())
    }

    fn music_contributors(&self, _title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        Ok(Vec::new())
    }
}
