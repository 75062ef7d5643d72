//! The fixed set of relational categories attached to a rating.
//!
//! Each category knows its dimension table, its junction table and where its
//! names come from, so callers iterate [`Category::ALL`] instead of looking
//! tables or fetch methods up by string.

use crate::enrichment::{EnrichmentClient, EnrichmentError};
use clap::ValueEnum;
use std::fmt;

/// Fetches the names for one category of one title.
pub type FetchFn = fn(&dyn EnrichmentClient, &str) -> Result<Vec<String>, EnrichmentError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Category {
    Actor,
    Director,
    Musician,
    Genre,
}

/// Table layout backing a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTables {
    pub dimension: &'static str,
    pub id_column: &'static str,
    pub junction: &'static str,
}

/// Where the names of a category come from during ingestion.
#[derive(Clone, Copy)]
pub enum CategorySource {
    Enrichment(FetchFn),
    RatingsFile,
}

fn fetch_cast(client: &dyn EnrichmentClient, title_key: &str) -> Result<Vec<String>, EnrichmentError> {
    client.cast(title_key)
}

fn fetch_directors(
    client: &dyn EnrichmentClient,
    title_key: &str,
) -> Result<Vec<String>, EnrichmentError> {
    client.directors(title_key)
}

fn fetch_music_contributors(
    client: &dyn EnrichmentClient,
    title_key: &str,
) -> Result<Vec<String>, EnrichmentError> {
    client.music_contributors(title_key)
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Actor,
        Category::Director,
        Category::Musician,
        Category::Genre,
    ];

    pub fn tables(self) -> CategoryTables {
        match self {
            Category::Actor => CategoryTables {
                dimension: "actors",
                id_column: "actor_id",
                junction: "movie_actors",
            },
            Category::Director => CategoryTables {
                dimension: "directors",
                id_column: "director_id",
                junction: "movie_directors",
            },
            Category::Musician => CategoryTables {
                dimension: "musicians",
                id_column: "musician_id",
                junction: "movie_musicians",
            },
            Category::Genre => CategoryTables {
                dimension: "genres",
                id_column: "genre_id",
                junction: "movie_genres",
            },
        }
    }

    pub fn source(self) -> CategorySource {
        match self {
            Category::Actor => CategorySource::Enrichment(fetch_cast),
            Category::Director => CategorySource::Enrichment(fetch_directors),
            Category::Musician => CategorySource::Enrichment(fetch_music_contributors),
            Category::Genre => CategorySource::RatingsFile,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Actor => "actor",
            Category::Director => "director",
            Category::Musician => "musician",
            Category::Genre => "genre",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
