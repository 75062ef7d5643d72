//! Reader for the ratings CSV export.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{FailedRow, IngestionError};
use crate::category::Category;
use crate::ratings_store::NewRating;

const TITLE_KEY_COLUMN: &str = "Const";

/// One row of the ratings export. Unknown columns are ignored; empty cells
/// and unparsable numbers are absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SourceRow {
    #[serde(rename = "Const")]
    pub title_key: String,
    #[serde(rename = "Your Rating", default, deserialize_with = "csv::invalid_option")]
    pub personal_rating: Option<i64>,
    #[serde(rename = "Date Rated", default)]
    pub date_rated: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "Title Type", default)]
    pub title_type: Option<String>,
    #[serde(rename = "IMDb Rating", default, deserialize_with = "csv::invalid_option")]
    pub external_rating: Option<f64>,
    #[serde(rename = "Runtime (mins)", default, deserialize_with = "csv::invalid_option")]
    pub runtime_mins: Option<i64>,
    #[serde(rename = "Year", default, deserialize_with = "csv::invalid_option")]
    pub year: Option<i64>,
    #[serde(rename = "Genres", default)]
    pub genres: Option<String>,
    #[serde(rename = "Num Votes", default, deserialize_with = "csv::invalid_option")]
    pub num_votes: Option<i64>,
    #[serde(rename = "Release Date", default)]
    pub release_date: Option<String>,
    #[serde(rename = "Directors", default)]
    pub directors: Option<String>,
}

impl SourceRow {
    pub fn to_rating(&self) -> NewRating {
        NewRating {
            title_key: self.title_key.trim().to_string(),
            personal_rating: self.personal_rating,
            date_rated: non_blank(&self.date_rated),
            title: non_blank(&self.title),
            url: non_blank(&self.url),
            title_type: non_blank(&self.title_type),
            external_rating: self.external_rating.filter(|r| r.is_finite()),
            runtime_mins: self.runtime_mins,
            year: self.year,
            num_votes: self.num_votes,
            release_date: non_blank(&self.release_date),
        }
    }

    /// Names this row itself carries for a category.
    pub fn names_from_file(&self, category: Category) -> Vec<String> {
        let field = match category {
            Category::Genre => &self.genres,
            Category::Director => &self.directors,
            Category::Actor | Category::Musician => return Vec::new(),
        };
        field.as_deref().map(split_list).unwrap_or_default()
    }
}

/// Rows read from a ratings export, plus the records that could not be parsed.
#[derive(Debug, Default)]
pub struct RatingsSource {
    pub rows: Vec<SourceRow>,
    pub malformed: Vec<FailedRow>,
}

impl RatingsSource {
    pub fn from_path(path: &Path) -> Result<Self, IngestionError> {
        let file = File::open(path).map_err(|source| IngestionError::Source {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IngestionError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if !headers.iter().any(|h| h == TITLE_KEY_COLUMN) {
            return Err(IngestionError::MissingColumn(TITLE_KEY_COLUMN));
        }

        let mut source = RatingsSource::default();
        for (index, record) in rdr.deserialize::<SourceRow>().enumerate() {
            match record {
                Ok(row) => source.rows.push(row),
                Err(err) => {
                    // header is line 1
                    let line = err
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(index as u64 + 2);
                    warn!("Skipping malformed ratings record at line {}: {}", line, err);
                    source.malformed.push(FailedRow {
                        title_key: format!("line {}", line),
                        reason: err.to_string(),
                    });
                }
            }
        }
        debug!(
            "Read {} ratings rows ({} malformed)",
            source.rows.len(),
            source.malformed.len()
        );
        Ok(source)
    }
}

/// Splits a comma separated cell, trimming every entry and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Const,Your Rating,Date Rated,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

    fn parse(body: &str) -> RatingsSource {
        RatingsSource::from_reader(format!("{}\n{}", HEADER, body).as_bytes()).unwrap()
    }

    #[test]
    fn test_full_row() {
        let source = parse(
            "tt0133093,9,2020-01-02,The Matrix,https://www.imdb.com/title/tt0133093/,movie,8.7,136,1999,\"Action, Sci-Fi\",2000000,1999-03-31,\"Lana Wachowski, Lilly Wachowski\"",
        );

        assert_eq!(source.rows.len(), 1);
        let row = &source.rows[0];
        let rating = row.to_rating();
        assert_eq!(rating.title_key, "tt0133093");
        assert_eq!(rating.personal_rating, Some(9));
        assert_eq!(rating.title.as_deref(), Some("The Matrix"));
        assert_eq!(rating.title_type.as_deref(), Some("movie"));
        assert_eq!(rating.external_rating, Some(8.7));
        assert_eq!(rating.runtime_mins, Some(136));
        assert_eq!(rating.year, Some(1999));
        assert_eq!(rating.num_votes, Some(2000000));
        assert_eq!(
            row.names_from_file(Category::Genre),
            vec!["Action", "Sci-Fi"]
        );
        assert_eq!(
            row.names_from_file(Category::Director),
            vec!["Lana Wachowski", "Lilly Wachowski"]
        );
        assert!(row.names_from_file(Category::Actor).is_empty());
    }

    #[test]
    fn test_empty_cells_are_absent() {
        let source = parse("tt1,,,,,,,,,,,,");

        let rating = source.rows[0].to_rating();
        assert_eq!(
            rating,
            NewRating {
                title_key: "tt1".to_string(),
                ..Default::default()
            }
        );
        assert!(source.rows[0].names_from_file(Category::Genre).is_empty());
    }

    #[test]
    fn test_unparsable_numbers_are_absent() {
        let source = parse("tt1,n/a,,,,,?,long,,,many,,");

        let rating = source.rows[0].to_rating();
        assert_eq!(rating.personal_rating, None);
        assert_eq!(rating.external_rating, None);
        assert_eq!(rating.runtime_mins, None);
        assert_eq!(rating.num_votes, None);
    }

    #[test]
    fn test_optional_and_extra_columns() {
        let csv = "Const,Title,Genres,Extra\ntt1,Heat,Crime,whatever\n";
        let source = RatingsSource::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(source.rows.len(), 1);
        assert_eq!(source.rows[0].title.as_deref(), Some("Heat"));
        assert_eq!(source.rows[0].directors, None);
        assert!(source.malformed.is_empty());
    }

    #[test]
    fn test_missing_title_key_column_fails() {
        let csv = "Title,Genres\nHeat,Crime\n";
        let result = RatingsSource::from_reader(csv.as_bytes());

        assert!(matches!(result, Err(IngestionError::MissingColumn("Const"))));
    }

    #[test]
    fn test_short_record_is_reported_as_malformed() {
        let source = parse("tt1,8\ntt2,7,,,,,,,,,,,");

        assert_eq!(source.rows.len(), 1);
        assert_eq!(source.rows[0].title_key, "tt2");
        assert_eq!(source.malformed.len(), 1);
    }

    #[test]
    fn test_split_list_trims_entries() {
        assert_eq!(split_list("Action, Drama"), vec!["Action", "Drama"]);
        assert_eq!(split_list(" Drama ,, "), vec!["Drama"]);
        assert!(split_list("").is_empty());
    }
}
