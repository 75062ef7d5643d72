//! SQLite schema definitions for the ratings database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, ForeignKey, ForeignKeyOnChange, Schema, SqlType, Table};

pub const SCHEMA_VERSION: usize = 0;

const RATINGS_FK: ForeignKey = ForeignKey {
    foreign_table: "ratings",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// One row per title the user has rated, keyed by the external title key.
const RATINGS_TABLE: Table = Table {
    name: "ratings",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!("title_key", &SqlType::Text, non_null = true),
        sqlite_column!("personal_rating", &SqlType::Integer),
        sqlite_column!("date_rated", &SqlType::Text),
        sqlite_column!("title", &SqlType::Text),
        sqlite_column!("url", &SqlType::Text),
        sqlite_column!("title_type", &SqlType::Text),
        sqlite_column!("external_rating", &SqlType::Real),
        sqlite_column!("runtime_mins", &SqlType::Integer),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("num_votes", &SqlType::Integer),
        sqlite_column!("release_date", &SqlType::Text),
        // 0 while some contributor category is still missing
        sqlite_column!(
            "metadata_complete",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
    ],
    indices: &[],
    unique_constraints: &[&["title_key"]],
};

macro_rules! dimension_table {
    ($name:expr, $id_column:expr) => {
        Table {
            name: $name,
            columns: &[
                sqlite_column!(
                    $id_column,
                    &SqlType::Integer,
                    is_primary_key = true,
                    is_autoincrement = true
                ),
                sqlite_column!("name", &SqlType::Text, non_null = true),
            ],
            indices: &[],
            unique_constraints: &[&["name"]],
        }
    };
}

const ACTORS_TABLE: Table = dimension_table!("actors", "actor_id");
const DIRECTORS_TABLE: Table = dimension_table!("directors", "director_id");
const MUSICIANS_TABLE: Table = dimension_table!("musicians", "musician_id");
const GENRES_TABLE: Table = dimension_table!("genres", "genre_id");

const ACTORS_FK: ForeignKey = ForeignKey {
    foreign_table: "actors",
    foreign_column: "actor_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const DIRECTORS_FK: ForeignKey = ForeignKey {
    foreign_table: "directors",
    foreign_column: "director_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const MUSICIANS_FK: ForeignKey = ForeignKey {
    foreign_table: "musicians",
    foreign_column: "musician_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const GENRES_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "genre_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

macro_rules! junction_table {
    ($name:expr, $id_column:expr, $fk:expr, $index:expr) => {
        Table {
            name: $name,
            columns: &[
                sqlite_column!(
                    "movie_id",
                    &SqlType::Integer,
                    non_null = true,
                    foreign_key = Some(&RATINGS_FK)
                ),
                sqlite_column!(
                    $id_column,
                    &SqlType::Integer,
                    non_null = true,
                    foreign_key = Some($fk)
                ),
            ],
            indices: &[($index, $id_column)],
            unique_constraints: &[&["movie_id", $id_column]],
        }
    };
}

const MOVIE_ACTORS_TABLE: Table =
    junction_table!("movie_actors", "actor_id", &ACTORS_FK, "idx_movie_actors_actor");
const MOVIE_DIRECTORS_TABLE: Table = junction_table!(
    "movie_directors",
    "director_id",
    &DIRECTORS_FK,
    "idx_movie_directors_director"
);
const MOVIE_MUSICIANS_TABLE: Table = junction_table!(
    "movie_musicians",
    "musician_id",
    &MUSICIANS_FK,
    "idx_movie_musicians_musician"
);
const MOVIE_GENRES_TABLE: Table =
    junction_table!("movie_genres", "genre_id", &GENRES_FK, "idx_movie_genres_genre");

pub const RATINGS_SCHEMA: Schema = Schema {
    version: SCHEMA_VERSION,
    tables: &[
        RATINGS_TABLE,
        ACTORS_TABLE,
        DIRECTORS_TABLE,
        MUSICIANS_TABLE,
        GENRES_TABLE,
        MOVIE_ACTORS_TABLE,
        MOVIE_DIRECTORS_TABLE,
        MOVIE_MUSICIANS_TABLE,
        MOVIE_GENRES_TABLE,
    ],
};
