//! Test fixtures: ratings exports on disk and a scripted enrichment client.

use super::constants::*;
use anyhow::Result;
use moviestats::enrichment::{EnrichmentClient, EnrichmentError, EnrichmentErrorKind};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Writes a ratings export with the given rows under `dir`.
pub fn write_ratings_file(dir: &TempDir, name: &str, rows: &[&str]) -> Result<PathBuf> {
    let path = dir.path().join(name);
    let mut content = String::from(RATINGS_HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content)?;
    Ok(path)
}

/// Creates a temp dir holding `ratings.csv` with every fixture title.
/// Returns (temp_dir, ratings_path, db_path)
pub fn create_test_export() -> Result<(TempDir, PathBuf, PathBuf)> {
    let dir = TempDir::new()?;
    let ratings_path = write_ratings_file(
        &dir,
        "ratings.csv",
        &[
            MATRIX_ROW,
            HEAT_ROW,
            BREAKING_BAD_ROW,
            SUPERBAD_ROW,
            CARMENCITA_ROW,
        ],
    )?;
    let db_path = dir.path().join("ratings.db");
    Ok((dir, ratings_path, db_path))
}

#[derive(Default, Clone)]
struct Credits {
    cast: Vec<String>,
    directors: Vec<String>,
    music: Vec<String>,
}

/// Enrichment client answering from an in-memory table.
///
/// Titles in `failing` time out on every call; unknown titles have no
/// contributors.
#[derive(Default)]
pub struct FakeEnrichmentClient {
    credits: HashMap<String, Credits>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl FakeEnrichmentClient {
    /// Client knowing the contributors of every fixture title.
    pub fn with_fixture_titles() -> Self {
        let mut client = Self::default();
        client.insert(MATRIX_KEY, &[KEANU, CARRIE_ANNE], &["Lana Wachowski"], &[DON_DAVIS]);
        client.insert(
            HEAT_KEY,
            &[AL_PACINO, ROBERT_DE_NIRO],
            &["Michael Mann"],
            &[ELLIOT_GOLDENTHAL],
        );
        client.insert(BREAKING_BAD_KEY, &[BRYAN_CRANSTON], &["Vince Gilligan"], &[]);
        client.insert(SUPERBAD_KEY, &[JONAH_HILL], &[], &[]);
        client
    }

    pub fn insert(&mut self, key: &str, cast: &[&str], directors: &[&str], music: &[&str]) {
        let owned = |names: &[&str]| -> Vec<String> { names.iter().map(|n| n.to_string()).collect() };
        self.credits.insert(
            key.to_string(),
            Credits {
                cast: owned(cast),
                directors: owned(directors),
                music: owned(music),
            },
        );
    }

    pub fn fail_title(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, key: &str, pick: fn(&Credits) -> &Vec<String>) -> Result<Vec<String>, EnrichmentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(key) {
            return Err(EnrichmentError::new(
                EnrichmentErrorKind::Timeout,
                format!("{} timed out", key),
            ));
        }
        Ok(self.credits.get(key).map(|c| pick(c).clone()).unwrap_or_default())
    }
}

impl EnrichmentClient for FakeEnrichmentClient {
    fn cast(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        self.lookup(title_key, |c| &c.cast)
    }

    fn directors(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        self.lookup(title_key, |c| &c.directors)
    }

    fn music_contributors(&self, title_key: &str) -> Result<Vec<String>, EnrichmentError> {
        self.lookup(title_key, |c| &c.music)
    }
}
