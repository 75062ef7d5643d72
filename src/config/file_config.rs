use crate::analysis::TitleTypeFilter;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub ratings_file: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub enrichment_timeout_sec: Option<u64>,
    /// "rollback" or "keep-partial"
    pub failure_policy: Option<String>,

    // Sections
    pub retry: Option<RetryConfig>,
    pub analysis: Option<AnalysisConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub max_backoff_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_votes_prior: Option<u32>,
    pub max_combination_size: Option<usize>,
    pub top_n: Option<i64>,
    /// "movies" or "series"
    pub combination_title_type: Option<TitleTypeFilter>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
