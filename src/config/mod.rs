mod file_config;

pub use file_config::{AnalysisConfig, FileConfig, RetryConfig};

use crate::analysis::AnalysisSettings;
use crate::ingestion::EnrichmentFailurePolicy;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub ratings_file: Option<PathBuf>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub enrichment_timeout_sec: u64,
    pub failure_policy: EnrichmentFailurePolicy,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub ratings_file: PathBuf,
    pub tmdb_api_key: Option<String>,
    pub tmdb_base_url: String,
    pub enrichment_timeout_sec: u64,
    pub failure_policy: EnrichmentFailurePolicy,

    pub retry: RetrySettings,
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

pub const DEFAULT_DB_PATH: &str = "imdb_ratings.db";
pub const DEFAULT_RATINGS_FILE: &str = "data/imdb_ratings.csv";

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let ratings_file = file
            .ratings_file
            .map(PathBuf::from)
            .or_else(|| cli.ratings_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RATINGS_FILE));

        let tmdb_api_key = file
            .tmdb_api_key
            .or_else(|| cli.tmdb_api_key.clone())
            .filter(|key| !key.trim().is_empty());
        let tmdb_base_url = file
            .tmdb_base_url
            .unwrap_or_else(|| cli.tmdb_base_url.clone());
        let enrichment_timeout_sec = file
            .enrichment_timeout_sec
            .unwrap_or(cli.enrichment_timeout_sec);
        if enrichment_timeout_sec == 0 {
            bail!("enrichment_timeout_sec must be greater than zero");
        }

        let failure_policy = match file.failure_policy {
            Some(s) => parse_failure_policy(&s)?,
            None => cli.failure_policy,
        };

        let retry_file = file.retry.unwrap_or_default();
        let retry_defaults = RetrySettings::default();
        let retry = RetrySettings {
            max_retries: retry_file.max_retries.unwrap_or(retry_defaults.max_retries),
            initial_backoff_ms: retry_file
                .initial_backoff_ms
                .unwrap_or(retry_defaults.initial_backoff_ms),
            max_backoff_ms: retry_file
                .max_backoff_ms
                .unwrap_or(retry_defaults.max_backoff_ms),
            backoff_multiplier: retry_file
                .backoff_multiplier
                .unwrap_or(retry_defaults.backoff_multiplier),
        };
        if retry.backoff_multiplier < 1.0 {
            bail!(
                "retry.backoff_multiplier must be at least 1.0, got {}",
                retry.backoff_multiplier
            );
        }

        let analysis_file = file.analysis.unwrap_or_default();
        let analysis_defaults = AnalysisSettings::default();
        let analysis = AnalysisSettings {
            min_votes_prior: analysis_file
                .min_votes_prior
                .unwrap_or(analysis_defaults.min_votes_prior),
            max_combination_size: analysis_file
                .max_combination_size
                .unwrap_or(analysis_defaults.max_combination_size),
            top_n: analysis_file.top_n.unwrap_or(analysis_defaults.top_n),
            combination_title_type: analysis_file
                .combination_title_type
                .or(analysis_defaults.combination_title_type),
        };
        if analysis.top_n < 1 {
            bail!("analysis.top_n must be a positive integer, got {}", analysis.top_n);
        }

        Ok(Self {
            db_path,
            ratings_file,
            tmdb_api_key,
            tmdb_base_url,
            enrichment_timeout_sec,
            failure_policy,
            retry,
            analysis,
        })
    }
}

fn parse_failure_policy(s: &str) -> Result<EnrichmentFailurePolicy> {
    EnrichmentFailurePolicy::from_str(s, true)
        .map_err(|_| anyhow!("Unknown failure_policy {:?}, expected rollback or keep-partial", s))
}
