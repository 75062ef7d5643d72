//! Read-only aggregate queries over the ratings database.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;

use super::models::{
    FrequencyEntry, GenreCombinationScore, MeanEntry, RatingBucket, RatingGap, RuntimeUnit,
    TitleRatings, TitleScore, TopN,
};
use super::weighting::{weighted_score, AnalysisSettings};
use super::AnalysisError;
use crate::category::Category;
use crate::ratings_store::RATINGS_SCHEMA;

/// Holds a read-only connection for as long as the analyser lives.
pub struct RatingsAnalyser {
    conn: Connection,
}

impl RatingsAnalyser {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, AnalysisError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| AnalysisError::Connection {
            path: db_path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Wraps an already open connection, checking that it holds a ratings database.
    pub fn from_connection(conn: Connection) -> Result<Self, AnalysisError> {
        RATINGS_SCHEMA.validate(&conn).map_err(AnalysisError::Schema)?;
        Ok(Self { conn })
    }

    /// Number of stored ratings.
    pub fn count(&self) -> Result<usize, AnalysisError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM ratings", [], |r| r.get(0))?)
    }

    /// Highest personal scores first. Titles without a score are left out.
    pub fn top_ratings(&self, n: i64) -> Result<Vec<TitleScore>, AnalysisError> {
        let n = TopN::new(n)?;
        let mut stmt = self.conn.prepare_cached(
            "SELECT title, personal_rating FROM ratings \
             WHERE personal_rating IS NOT NULL \
             ORDER BY personal_rating DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![n.as_sql()], |r| {
                Ok(TitleScore {
                    title: r.get(0)?,
                    personal_rating: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Names with the highest mean personal score.
    pub fn leaderboard_by_mean(
        &self,
        category: Category,
        n: i64,
    ) -> Result<Vec<MeanEntry>, AnalysisError> {
        let n = TopN::new(n)?;
        let tables = category.tables();
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT d.name, AVG(r.personal_rating) FROM ratings AS r \
             JOIN {junction} AS j ON r.id = j.movie_id \
             JOIN {dimension} AS d ON j.{id} = d.{id} \
             WHERE r.personal_rating IS NOT NULL \
             GROUP BY d.name ORDER BY AVG(r.personal_rating) DESC LIMIT ?1",
            junction = tables.junction,
            dimension = tables.dimension,
            id = tables.id_column
        ))?;
        let rows = stmt
            .query_map(params![n.as_sql()], |r| {
                Ok(MeanEntry {
                    name: r.get(0)?,
                    mean: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Names linked to the most titles, with their mean personal score.
    pub fn leaderboard_by_frequency(
        &self,
        category: Category,
        n: i64,
    ) -> Result<Vec<FrequencyEntry>, AnalysisError> {
        let n = TopN::new(n)?;
        let tables = category.tables();
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT d.name, COUNT(r.id), AVG(r.personal_rating) FROM ratings AS r \
             JOIN {junction} AS j ON r.id = j.movie_id \
             JOIN {dimension} AS d ON j.{id} = d.{id} \
             GROUP BY d.name ORDER BY COUNT(r.id) DESC LIMIT ?1",
            junction = tables.junction,
            dimension = tables.dimension,
            id = tables.id_column
        ))?;
        let rows = stmt
            .query_map(params![n.as_sql()], |r| {
                Ok(FrequencyEntry {
                    name: r.get(0)?,
                    count: r.get(1)?,
                    mean: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Personal minus external score for every title, in insertion order.
    pub fn rating_gaps(&self) -> Result<Vec<RatingGap>, AnalysisError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT title, personal_rating - external_rating FROM ratings ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(RatingGap {
                    title: r.get(0)?,
                    gap: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Mean over every non-NULL personal score.
    pub fn mean_personal_score(&self) -> Result<Option<f64>, AnalysisError> {
        Ok(self.conn.query_row(
            "SELECT AVG(personal_rating) FROM ratings",
            [],
            |r| r.get(0),
        )?)
    }

    /// Total runtime of titles whose type is exactly "movie".
    pub fn total_runtime(&self, unit: RuntimeUnit) -> Result<f64, AnalysisError> {
        let minutes: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(runtime_mins), 0) FROM ratings WHERE title_type = 'movie'",
            [],
            |r| r.get(0),
        )?;
        let hours = minutes as f64 / 60.0;
        Ok(match unit {
            RuntimeUnit::Hours => hours,
            RuntimeUnit::Days => hours / 24.0,
        })
    }

    /// Number of titles per personal score, highest score first.
    pub fn rating_distribution(&self) -> Result<Vec<RatingBucket>, AnalysisError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT personal_rating, COUNT(*) FROM ratings \
             WHERE personal_rating IS NOT NULL \
             GROUP BY personal_rating ORDER BY personal_rating DESC",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(RatingBucket {
                    personal_rating: r.get(0)?,
                    titles: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Personal and external score of every title, in insertion order.
    pub fn ratings(&self) -> Result<Vec<TitleRatings>, AnalysisError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT title, personal_rating, external_rating FROM ratings ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(TitleRatings {
                    title: r.get(0)?,
                    personal_rating: r.get(1)?,
                    external_rating: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Titles linked to `name` in a category, highest personal score first.
    pub fn titles_for(
        &self,
        category: Category,
        name: &str,
    ) -> Result<Vec<TitleScore>, AnalysisError> {
        let tables = category.tables();
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT r.title, r.personal_rating FROM ratings AS r \
             JOIN {junction} AS j ON r.id = j.movie_id \
             JOIN {dimension} AS d ON j.{id} = d.{id} \
             WHERE d.name = ?1 ORDER BY r.personal_rating DESC, r.id",
            junction = tables.junction,
            dimension = tables.dimension,
            id = tables.id_column
        ))?;
        let rows = stmt
            .query_map(params![name.trim()], |r| {
                Ok(TitleScore {
                    title: r.get(0)?,
                    personal_rating: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Scores every distinct genre set carried by a scored title, optionally
    /// only movies or only series. The prior mean is taken over every title.
    ///
    /// Sorted by weighted score, best first; equal scores are ordered by genre list.
    pub fn genre_combination_scores(
        &self,
        settings: &AnalysisSettings,
    ) -> Result<Vec<GenreCombinationScore>, AnalysisError> {
        let Some(prior_mean) = self.mean_personal_score()? else {
            return Ok(Vec::new());
        };

        let genre_table = Category::Genre.tables();
        let type_condition = settings
            .combination_title_type
            .map(|filter| format!(" AND {}", filter.sql_condition()))
            .unwrap_or_default();
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT r.id, r.personal_rating, d.name FROM ratings AS r \
             JOIN {junction} AS j ON r.id = j.movie_id \
             JOIN {dimension} AS d ON j.{id} = d.{id} \
             WHERE r.personal_rating IS NOT NULL{type_condition}",
            junction = genre_table.junction,
            dimension = genre_table.dimension,
            id = genre_table.id_column,
            type_condition = type_condition
        ))?;

        let mut titles: BTreeMap<i64, (i64, BTreeSet<String>)> = BTreeMap::new();
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?, r.get::<_, String>(2)?))
        })?;
        for row in rows {
            let (movie_id, rating, genre) = row?;
            titles
                .entry(movie_id)
                .or_insert_with(|| (rating, BTreeSet::new()))
                .1
                .insert(genre);
        }

        let mut by_combination: HashMap<Vec<String>, Vec<i64>> = HashMap::new();
        for (rating, genres) in titles.into_values() {
            by_combination
                .entry(genres.into_iter().collect())
                .or_default()
                .push(rating);
        }

        let mut scores: Vec<GenreCombinationScore> = by_combination
            .into_iter()
            .map(|(genres, ratings)| {
                let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
                GenreCombinationScore {
                    weighted: weighted_score(
                        ratings.len(),
                        mean,
                        prior_mean,
                        settings.min_votes_prior,
                    ),
                    genres,
                    titles: ratings.len(),
                    mean,
                }
            })
            .collect();
        scores.sort_by(|a, b| {
            b.weighted
                .total_cmp(&a.weighted)
                .then_with(|| a.genres.cmp(&b.genres))
        });

        debug!(
            "Scored {} genre combinations against a mean of {:.2}",
            scores.len(),
            prior_mean
        );
        Ok(scores)
    }
}
