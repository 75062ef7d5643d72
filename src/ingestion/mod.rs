mod error;
mod pipeline;
mod source;

pub use error::IngestionError;
pub use pipeline::{
    BackfillReport, EnrichmentFailurePolicy, FailedRow, IngestionPipeline, IngestionReport,
    RowOutcome,
};
pub use source::{split_list, RatingsSource, SourceRow};
