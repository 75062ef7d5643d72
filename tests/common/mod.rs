//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{create_test_export, FakeEnrichmentClient, MATRIX_KEY};
//!
//! #[test]
//! fn test_ingest_export() {
//!     let (_dir, ratings_path, db_path) = create_test_export().unwrap();
//!     let client = FakeEnrichmentClient::with_fixture_titles();
//!     // ingest ratings_path into db_path with client...
//! }
//! ```

mod constants;
mod fixtures;
mod tmdb_stub;

// Public API - this is what tests import
pub use constants::*;
pub use fixtures::{create_test_export, write_ratings_file, FakeEnrichmentClient};
#[allow(unused_imports)]
pub use tmdb_stub::TmdbStub;
