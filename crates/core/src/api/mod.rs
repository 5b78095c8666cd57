//! High-level API module for page-graph extraction.
//!
//! This module provides the main public API for extracting page graphs.
//!
//! # Example
//!
//! ```ignore
//! use pagegraph_core::api::{GraphOptions, build_page_graph};
//!
//! let page = serde_json::from_reader(std::fs::File::open("page.json")?)?;
//! let (graph, stats) = build_page_graph(&page, &GraphOptions::default(), None, None, &[])?;
//! ```

pub mod builder;
pub mod high_level;

// Re-export for convenience
pub use builder::GraphBuilder;
pub use high_level::{
    BatchOutput, GraphOptions, PageGraphResult, SkippedPage, build_batch, build_page_graph,
};
