mod error;
mod models;
mod schema;
mod store;

pub use error::StoreError;
pub use models::{normalize_names, CategoryNames, IncompleteTitle, NewRating, StoreStats};
pub use schema::{RATINGS_SCHEMA, SCHEMA_VERSION};
pub use store::SqliteRatingsStore;
