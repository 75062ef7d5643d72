//! SQLite-backed ratings store.
//!
//! Owns the single write connection. Every rating is inserted together with
//! all of its category links inside one transaction.

use super::models::{normalize_names, CategoryNames, IncompleteTitle, NewRating, StoreStats};
use super::schema::RATINGS_SCHEMA;
use super::StoreError;
use crate::category::Category;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct SqliteRatingsStore {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteRatingsStore {
    /// Opens (or creates) the ratings database and makes sure the schema is in place.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Connection {
            path: db_path.clone(),
            source,
        })?;

        let store = Self::with_connection(conn, db_path)?;
        let stats = store.stats()?;
        info!(
            "Ratings store ready: {} ratings, {} actors, {} directors, {} musicians, {} genres ({} incomplete)",
            stats.ratings,
            stats.actors,
            stats.directors,
            stats.musicians,
            stats.genres,
            stats.incomplete
        );
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, db_path: PathBuf) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self { conn, db_path };
        store.ensure_schema()?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Creates every missing table and index. Safe to call any number of times.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        RATINGS_SCHEMA.ensure(&self.conn).map_err(StoreError::Schema)
    }

    pub fn count_ratings(&self) -> Result<usize, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM ratings", [], |r| r.get(0))?)
    }

    pub fn contains_title(&self, title_key: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .prepare_cached("SELECT id FROM ratings WHERE title_key = ?1")?
            .query_row(params![title_key], |r| r.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let count = |table: &str| -> Result<usize, StoreError> {
            Ok(self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        };
        let incomplete: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM ratings WHERE metadata_complete = 0",
            [],
            |r| r.get(0),
        )?;
        Ok(StoreStats {
            ratings: count("ratings")?,
            actors: count(Category::Actor.tables().dimension)?,
            directors: count(Category::Director.tables().dimension)?,
            musicians: count(Category::Musician.tables().dimension)?,
            genres: count(Category::Genre.tables().dimension)?,
            incomplete,
        })
    }

    /// Number of distinct names stored for a category.
    pub fn count_names(&self, category: Category) -> Result<usize, StoreError> {
        Ok(self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", category.tables().dimension),
            [],
            |r| r.get(0),
        )?)
    }

    /// Inserts a rating and all of its links in a single transaction.
    ///
    /// Returns the new row id. Nothing is written if any statement fails.
    pub fn insert_rating(
        &mut self,
        rating: &NewRating,
        links: &[CategoryNames],
        metadata_complete: bool,
    ) -> Result<i64, StoreError> {
        let tx = self.conn.transaction()?;
        tx.prepare_cached(
            "INSERT INTO ratings (title_key, personal_rating, date_rated, title, url, title_type, \
             external_rating, runtime_mins, year, num_votes, release_date, metadata_complete) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )?
        .execute(params![
            rating.title_key,
            rating.personal_rating,
            rating.date_rated,
            rating.title,
            rating.url,
            rating.title_type,
            rating.external_rating,
            rating.runtime_mins,
            rating.year,
            rating.num_votes,
            rating.release_date,
            metadata_complete,
        ])?;
        let movie_id = tx.last_insert_rowid();

        let mut linked = 0;
        for link in links {
            linked += link_names(&tx, movie_id, link.category, &link.names)?;
        }
        tx.commit()?;

        debug!(
            "Inserted {} as movie {} with {} links",
            rating.title_key, movie_id, linked
        );
        Ok(movie_id)
    }

    /// Adds links to an existing rating and updates its completeness flag.
    ///
    /// Returns the number of new links.
    pub fn add_links(
        &mut self,
        movie_id: i64,
        links: &[CategoryNames],
        metadata_complete: bool,
    ) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut linked = 0;
        for link in links {
            linked += link_names(&tx, movie_id, link.category, &link.names)?;
        }
        tx.execute(
            "UPDATE ratings SET metadata_complete = ?1 WHERE id = ?2",
            params![metadata_complete, movie_id],
        )?;
        tx.commit()?;
        Ok(linked)
    }

    /// Ratings written while some contributor category could not be fetched.
    pub fn incomplete_titles(&self, limit: usize) -> Result<Vec<IncompleteTitle>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, title_key, title FROM ratings WHERE metadata_complete = 0 ORDER BY id LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |r| {
                Ok(IncompleteTitle {
                    movie_id: r.get(0)?,
                    title_key: r.get(1)?,
                    title: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Names linked to a rating for one category, in name order.
    pub fn linked_names(&self, movie_id: i64, category: Category) -> Result<Vec<String>, StoreError> {
        let tables = category.tables();
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT d.name FROM {junction} AS j \
             JOIN {dimension} AS d ON j.{id} = d.{id} \
             WHERE j.movie_id = ?1 ORDER BY d.name",
            junction = tables.junction,
            dimension = tables.dimension,
            id = tables.id_column
        ))?;
        let names = stmt
            .query_map(params![movie_id], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    pub fn movie_id(&self, title_key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self
            .conn
            .prepare_cached("SELECT id FROM ratings WHERE title_key = ?1")?
            .query_row(params![title_key], |r| r.get(0))
            .optional()?)
    }
}

/// Looks a name up in the category's dimension table, inserting it when absent.
fn resolve_or_create(conn: &Connection, category: Category, name: &str) -> Result<i64, StoreError> {
    let tables = category.tables();
    conn.prepare_cached(&format!(
        "INSERT OR IGNORE INTO {} (name) VALUES (?1)",
        tables.dimension
    ))?
    .execute(params![name])?;

    let id = conn
        .prepare_cached(&format!(
            "SELECT {} FROM {} WHERE name = ?1",
            tables.id_column, tables.dimension
        ))?
        .query_row(params![name], |r| r.get(0))?;
    Ok(id)
}

/// Links every name to the movie. Existing links are left untouched.
fn link_names(
    conn: &Connection,
    movie_id: i64,
    category: Category,
    names: &[String],
) -> Result<usize, StoreError> {
    let tables = category.tables();
    let mut linked = 0;
    for name in normalize_names(names) {
        let dimension_id = resolve_or_create(conn, category, &name)?;
        linked += conn
            .prepare_cached(&format!(
                "INSERT OR IGNORE INTO {} (movie_id, {}) VALUES (?1, ?2)",
                tables.junction, tables.id_column
            ))?
            .execute(params![movie_id, dimension_id])?;
    }
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rating(title_key: &str) -> NewRating {
        NewRating {
            title_key: title_key.to_string(),
            personal_rating: Some(8),
            title: Some(format!("Title {}", title_key)),
            title_type: Some("movie".to_string()),
            runtime_mins: Some(120),
            ..Default::default()
        }
    }

    fn names(category: Category, names: &[&str]) -> CategoryNames {
        CategoryNames::new(category, names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_open_creates_schema_on_disk() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("ratings.db");

        let store = SqliteRatingsStore::open(&db_path).unwrap();
        assert_eq!(store.count_ratings().unwrap(), 0);
        assert!(db_path.exists());
        drop(store);

        // reopening an existing database keeps it
        let store = SqliteRatingsStore::open(&db_path).unwrap();
        assert_eq!(store.count_ratings().unwrap(), 0);
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("missing").join("ratings.db");

        let result = SqliteRatingsStore::open(&db_path);
        assert!(matches!(result, Err(StoreError::Connection { .. })));
    }

    #[test]
    fn test_open_rejects_foreign_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("other.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.pragma_update(None, "user_version", 42).unwrap();
        }

        let result = SqliteRatingsStore::open(&db_path);
        assert!(matches!(result, Err(StoreError::Schema(_))));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let store = SqliteRatingsStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store.ensure_schema().unwrap();
        assert_eq!(store.stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_insert_rating_with_links() {
        let mut store = SqliteRatingsStore::open_in_memory().unwrap();

        let movie_id = store
            .insert_rating(
                &rating("tt1"),
                &[
                    names(Category::Actor, &["Alice", "Bob"]),
                    names(Category::Director, &["Carol"]),
                    names(Category::Genre, &["Drama", "Comedy"]),
                ],
                true,
            )
            .unwrap();

        assert!(store.contains_title("tt1").unwrap());
        assert!(!store.contains_title("tt2").unwrap());
        assert_eq!(store.movie_id("tt1").unwrap(), Some(movie_id));
        assert_eq!(
            store.linked_names(movie_id, Category::Actor).unwrap(),
            vec!["Alice", "Bob"]
        );
        assert_eq!(
            store.linked_names(movie_id, Category::Genre).unwrap(),
            vec!["Comedy", "Drama"]
        );
        assert!(store.linked_names(movie_id, Category::Musician).unwrap().is_empty());
    }

    #[test]
    fn test_shared_names_reuse_dimension_rows() {
        let mut store = SqliteRatingsStore::open_in_memory().unwrap();

        store
            .insert_rating(&rating("tt1"), &[names(Category::Actor, &["Alice", "Bob"])], true)
            .unwrap();
        store
            .insert_rating(&rating("tt2"), &[names(Category::Actor, &["Bob", "Dan"])], true)
            .unwrap();

        assert_eq!(store.count_names(Category::Actor).unwrap(), 3);
    }

    #[test]
    fn test_names_are_trimmed_and_deduplicated() {
        let mut store = SqliteRatingsStore::open_in_memory().unwrap();

        let movie_id = store
            .insert_rating(
                &rating("tt1"),
                &[names(Category::Genre, &[" Drama", "Drama ", "", "Comedy"])],
                true,
            )
            .unwrap();

        assert_eq!(store.count_names(Category::Genre).unwrap(), 2);
        assert_eq!(
            store.linked_names(movie_id, Category::Genre).unwrap(),
            vec!["Comedy", "Drama"]
        );
    }

    #[test]
    fn test_duplicate_title_key_is_rejected_without_partial_writes() {
        let mut store = SqliteRatingsStore::open_in_memory().unwrap();
        store
            .insert_rating(&rating("tt1"), &[names(Category::Actor, &["Alice"])], true)
            .unwrap();

        let result = store.insert_rating(&rating("tt1"), &[names(Category::Actor, &["Zed"])], true);

        assert!(matches!(result, Err(StoreError::Database(_))));
        assert_eq!(store.count_ratings().unwrap(), 1);
        assert_eq!(store.count_names(Category::Actor).unwrap(), 1);
    }

    #[test]
    fn test_incomplete_titles_and_add_links() {
        let mut store = SqliteRatingsStore::open_in_memory().unwrap();
        store.insert_rating(&rating("tt1"), &[], true).unwrap();
        let incomplete_id = store
            .insert_rating(&rating("tt2"), &[names(Category::Genre, &["Drama"])], false)
            .unwrap();

        let incomplete = store.incomplete_titles(10).unwrap();
        assert_eq!(incomplete.len(), 1);
        assert_eq!(incomplete[0].movie_id, incomplete_id);
        assert_eq!(incomplete[0].title_key, "tt2");
        assert_eq!(store.stats().unwrap().incomplete, 1);

        let linked = store
            .add_links(incomplete_id, &[names(Category::Actor, &["Alice"])], true)
            .unwrap();
        assert_eq!(linked, 1);
        assert!(store.incomplete_titles(10).unwrap().is_empty());

        // linking the same name again adds nothing
        let linked = store
            .add_links(incomplete_id, &[names(Category::Actor, &["Alice"])], true)
            .unwrap();
        assert_eq!(linked, 0);
    }

    #[test]
    fn test_link_to_unknown_movie_violates_foreign_key() {
        let mut store = SqliteRatingsStore::open_in_memory().unwrap();

        let result = store.add_links(999, &[names(Category::Actor, &["Alice"])], true);

        assert!(result.is_err());
        assert_eq!(store.count_names(Category::Actor).unwrap(), 0);
    }
}
