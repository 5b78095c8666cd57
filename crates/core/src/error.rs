//! Error types for the page-graph extraction library.

use thiserror::Error;

/// Primary error type for graph extraction operations.
///
/// The page-carrying variants are fatal for that page only; a batch run
/// records them as skip reasons and keeps going.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("bounding box over empty point set")]
    EmptyPointSet,

    #[error("page {page}: no text regions")]
    NoTextRegions { page: String },

    #[error("page {page}: {count} region(s) left after discard, need at least 2")]
    TooFewRegions { page: String, count: usize },

    #[error("page {page}: degenerate layout, triangulation failed on rounded and raw positions")]
    DegenerateLayout { page: String },

    #[error("page {page}: no line metrics available: {reason}")]
    MissingLineMetrics { page: String, reason: String },

    #[error("thread pool: {0}")]
    ThreadPool(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type alias for GraphError.
pub type Result<T> = std::result::Result<T, GraphError>;
