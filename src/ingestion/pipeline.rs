//! Insert-only ingestion of a ratings export.
//!
//! For every new title the contributor categories are fetched in parallel,
//! then the rating and all of its links are written in one transaction.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::source::{RatingsSource, SourceRow};
use super::IngestionError;
use crate::category::{Category, CategorySource, FetchFn};
use crate::enrichment::{EnrichmentClient, EnrichmentError, EnrichmentErrorKind, RetryPolicy};
use crate::ratings_store::{CategoryNames, SqliteRatingsStore};

/// What to do with a row whose enrichment could not be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EnrichmentFailurePolicy {
    /// Write nothing for the row. It is picked up again by the next run.
    #[default]
    Rollback,
    /// Write the row with the categories that succeeded and flag it incomplete.
    KeepPartial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRow {
    pub title_key: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Inserted {
        title_key: String,
        movie_id: i64,
    },
    InsertedIncomplete {
        title_key: String,
        movie_id: i64,
        missing: Vec<Category>,
    },
    SkippedExisting {
        title_key: String,
    },
    Failed(FailedRow),
}

#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub rows_read: usize,
    /// Rows written, complete or not.
    pub inserted: usize,
    pub skipped_existing: usize,
    pub inserted_incomplete: usize,
    pub failed: Vec<FailedRow>,
    pub count_before: usize,
    pub count_after: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IngestionReport {
    fn new(rows_read: usize, count_before: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            rows_read,
            inserted: 0,
            skipped_existing: 0,
            inserted_incomplete: 0,
            failed: Vec::new(),
            count_before,
            count_after: count_before,
            started_at,
            finished_at: started_at,
        }
    }

    fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Inserted { .. } => self.inserted += 1,
            RowOutcome::InsertedIncomplete { .. } => {
                self.inserted += 1;
                self.inserted_incomplete += 1;
            }
            RowOutcome::SkippedExisting { .. } => self.skipped_existing += 1,
            RowOutcome::Failed(failed) => self.failed.push(failed.clone()),
        }
    }

    pub fn summary(&self) -> String {
        if self.count_after > self.count_before {
            format!("{} new entries added", self.count_after - self.count_before)
        } else {
            "No new entries found".to_string()
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub examined: usize,
    pub completed: usize,
    pub still_incomplete: usize,
    pub links_added: usize,
}

pub struct IngestionPipeline<'a> {
    store: &'a mut SqliteRatingsStore,
    client: &'a dyn EnrichmentClient,
    retry_policy: RetryPolicy,
    failure_policy: EnrichmentFailurePolicy,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        store: &'a mut SqliteRatingsStore,
        client: &'a dyn EnrichmentClient,
        retry_policy: RetryPolicy,
        failure_policy: EnrichmentFailurePolicy,
    ) -> Self {
        Self {
            store,
            client,
            retry_policy,
            failure_policy,
        }
    }

    /// Ingests every row that is not stored yet. `on_outcome` is called once
    /// per row, after the row has been committed or given up on.
    pub fn ingest<F>(
        &mut self,
        source: &RatingsSource,
        mut on_outcome: F,
    ) -> Result<IngestionReport, IngestionError>
    where
        F: FnMut(&RowOutcome),
    {
        let count_before = self.store.count_ratings()?;
        let rows_read = source.rows.len() + source.malformed.len();
        let mut report = IngestionReport::new(rows_read, count_before, Utc::now());
        report.failed.extend(source.malformed.iter().cloned());
        info!(
            "Ingesting {} rows, {} ratings already stored",
            rows_read, count_before
        );

        for row in &source.rows {
            let outcome = self.ingest_row(row)?;
            report.record(&outcome);
            on_outcome(&outcome);
        }

        report.count_after = self.store.count_ratings()?;
        report.finished_at = Utc::now();
        info!(
            "Ingestion finished in {:.1}s: {} inserted ({} incomplete), {} already stored, {} failed",
            report.elapsed_secs(),
            report.inserted,
            report.inserted_incomplete,
            report.skipped_existing,
            report.failed.len()
        );
        Ok(report)
    }

    fn ingest_row(&mut self, row: &SourceRow) -> Result<RowOutcome, IngestionError> {
        let rating = row.to_rating();
        let title_key = rating.title_key.clone();
        if title_key.is_empty() {
            warn!("Skipping ratings row without a title key");
            return Ok(RowOutcome::Failed(FailedRow {
                title_key,
                reason: "missing title key".to_string(),
            }));
        }
        if self.store.contains_title(&title_key)? {
            debug!("{} already stored", title_key);
            return Ok(RowOutcome::SkippedExisting { title_key });
        }

        let mut fetched = fetch_contributors(self.client, &self.retry_policy, &title_key);
        let mut links = Vec::with_capacity(Category::ALL.len());
        let mut failures = Vec::new();
        for category in Category::ALL {
            let mut names = match fetched.remove(&category) {
                Some(Ok(names)) => names,
                Some(Err(err)) if err.kind == EnrichmentErrorKind::NotFound => {
                    warn!(
                        "{} is unknown to the enrichment endpoint, storing it without {} names: {}",
                        title_key, category, err
                    );
                    Vec::new()
                }
                Some(Err(err)) => {
                    warn!("Failed to fetch {} names for {}: {}", category, title_key, err);
                    failures.push((category, err));
                    Vec::new()
                }
                None => Vec::new(),
            };
            names.extend(row.names_from_file(category));
            if names.is_empty() && matches!(category.source(), CategorySource::RatingsFile) {
                warn!("{} has no {} entries, skipping {} links", title_key, category, category);
            }
            links.push(CategoryNames::new(category, names));
        }

        if !failures.is_empty() && self.failure_policy == EnrichmentFailurePolicy::Rollback {
            return Ok(RowOutcome::Failed(FailedRow {
                title_key,
                reason: describe_failures(&failures),
            }));
        }

        let complete = failures.is_empty();
        let movie_id = self.store.insert_rating(&rating, &links, complete)?;
        if complete {
            Ok(RowOutcome::Inserted {
                title_key,
                movie_id,
            })
        } else {
            Ok(RowOutcome::InsertedIncomplete {
                title_key,
                movie_id,
                missing: failures.into_iter().map(|(category, _)| category).collect(),
            })
        }
    }

    /// Re-fetches contributors for up to `limit` incomplete titles, oldest first.
    pub fn backfill(&mut self, limit: usize) -> Result<BackfillReport, IngestionError> {
        let titles = self.store.incomplete_titles(limit)?;
        let mut report = BackfillReport {
            examined: titles.len(),
            ..Default::default()
        };

        for title in titles {
            let fetched = fetch_contributors(self.client, &self.retry_policy, &title.title_key);
            let mut links = Vec::new();
            let mut failed = false;
            for (category, result) in fetched {
                match result {
                    Ok(names) => links.push(CategoryNames::new(category, names)),
                    Err(err) if err.kind == EnrichmentErrorKind::NotFound => {
                        debug!(
                            "{} is unknown to the enrichment endpoint, no {} names: {}",
                            title.title_key, category, err
                        );
                    }
                    Err(err) => {
                        warn!(
                            "Backfill of {} names for {} failed: {}",
                            category, title.title_key, err
                        );
                        failed = true;
                    }
                }
            }

            report.links_added += self.store.add_links(title.movie_id, &links, !failed)?;
            if failed {
                report.still_incomplete += 1;
            } else {
                debug!("{} is now complete", title.title_key);
                report.completed += 1;
            }
        }

        info!(
            "Backfill examined {} titles: {} completed, {} still incomplete",
            report.examined, report.completed, report.still_incomplete
        );
        Ok(report)
    }
}

/// Fetches every enriched category of one title on the rayon pool.
fn fetch_contributors(
    client: &dyn EnrichmentClient,
    retry_policy: &RetryPolicy,
    title_key: &str,
) -> HashMap<Category, Result<Vec<String>, EnrichmentError>> {
    Category::ALL
        .par_iter()
        .filter_map(|&category| match category.source() {
            CategorySource::Enrichment(fetch) => Some((
                category,
                fetch_with_retries(client, retry_policy, fetch, category, title_key),
            )),
            CategorySource::RatingsFile => None,
        })
        .collect()
}

fn fetch_with_retries(
    client: &dyn EnrichmentClient,
    retry_policy: &RetryPolicy,
    fetch: FetchFn,
    category: Category,
    title_key: &str,
) -> Result<Vec<String>, EnrichmentError> {
    let started = Instant::now();
    let what = format!("{} fetch for {}", category, title_key);
    let result = retry_policy.run(&what, || fetch(client, title_key));
    debug!(
        "{} took {:.3}s",
        what,
        started.elapsed().as_secs_f64()
    );
    result
}

fn describe_failures(failures: &[(Category, EnrichmentError)]) -> String {
    failures
        .iter()
        .map(|(category, err)| format!("{}: {}", category, err))
        .collect::<Vec<_>>()
        .join("; ")
}
