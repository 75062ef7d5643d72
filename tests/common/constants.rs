//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (title keys, contributors, etc.),
//! update only this file.

// ============================================================================
// Ratings Export
// ============================================================================

pub const RATINGS_HEADER: &str = "Const,Your Rating,Date Rated,Title,URL,Title Type,IMDb Rating,Runtime (mins),Year,Genres,Num Votes,Release Date,Directors";

/// The Matrix, movie, rated 9
pub const MATRIX_KEY: &str = "tt0133093";

/// Heat, movie, rated 8
pub const HEAT_KEY: &str = "tt0113277";

/// Breaking Bad, TV series, rated 10
pub const BREAKING_BAD_KEY: &str = "tt0903747";

/// Superbad, movie, rated 6
pub const SUPERBAD_KEY: &str = "tt0829482";

/// Carmencita, short without a personal score and without genres
pub const CARMENCITA_KEY: &str = "tt0000001";

pub const MATRIX_ROW: &str = "tt0133093,9,2021-03-01,The Matrix,https://www.imdb.com/title/tt0133093/,movie,8.7,136,1999,\"Action, Sci-Fi\",2100000,1999-03-31,\"Lana Wachowski, Lilly Wachowski\"";
pub const HEAT_ROW: &str = "tt0113277,8,2021-03-02,Heat,https://www.imdb.com/title/tt0113277/,movie,8.3,170,1995,\"Action, Crime, Drama\",700000,1995-12-15,Michael Mann";
pub const BREAKING_BAD_ROW: &str = "tt0903747,10,2021-03-03,Breaking Bad,https://www.imdb.com/title/tt0903747/,tvSeries,9.5,49,2008,\"Crime, Drama, Thriller\",2200000,2008-01-20,";
pub const SUPERBAD_ROW: &str = "tt0829482,6,2021-03-04,Superbad,https://www.imdb.com/title/tt0829482/,movie,7.6,114,2007,Comedy,620000,2007-08-17,Greg Mottola";
pub const CARMENCITA_ROW: &str = "tt0000001,,2021-03-05,Carmencita,https://www.imdb.com/title/tt0000001/,short,5.7,1,1894,,2100,1894-03-10,";

// ============================================================================
// Contributors
// ============================================================================

pub const KEANU: &str = "Keanu Reeves";
pub const CARRIE_ANNE: &str = "Carrie-Anne Moss";
pub const AL_PACINO: &str = "Al Pacino";
pub const ROBERT_DE_NIRO: &str = "Robert De Niro";
pub const BRYAN_CRANSTON: &str = "Bryan Cranston";
pub const JONAH_HILL: &str = "Jonah Hill";

pub const DON_DAVIS: &str = "Don Davis";
pub const ELLIOT_GOLDENTHAL: &str = "Elliot Goldenthal";

// ============================================================================
// TMDB Stub
// ============================================================================

pub const STUB_API_KEY: &str = "test-api-key";
pub const STUB_MATRIX_ID: u64 = 603;
pub const STUB_BREAKING_BAD_ID: u64 = 1396;
