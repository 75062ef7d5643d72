//! Aggregate reports over the ratings database.

mod analyser;
mod error;
mod format;
mod models;
mod weighting;

pub use analyser::RatingsAnalyser;
pub use error::{AnalysisError, POSITIVE_INT_ERR_MESSAGE};
pub use format::{format_genre_combinations, format_ranked};
pub use models::{
    FrequencyEntry, GenreCombinationScore, MeanEntry, RatingBucket, RatingGap, RuntimeUnit,
    TitleRatings, TitleScore, TitleTypeFilter, TopN,
};
pub use weighting::{
    weighted_score, AnalysisSettings, DEFAULT_MAX_COMBINATION_SIZE, DEFAULT_MIN_VOTES_PRIOR,
    DEFAULT_TOP_N,
};
