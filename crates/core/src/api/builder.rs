//! Builder pattern for graph extraction.
//!
//! Provides a fluent API for configuring and executing page-graph
//! extraction.
//!
//! # Example
//! ```ignore
//! use pagegraph_core::api::GraphBuilder;
//! use pagegraph_core::topology::Interaction;
//!
//! let output = GraphBuilder::new()
//!     .interaction(Interaction::Fully)
//!     .visual_regions(true)
//!     .parallel(4)
//!     .build_batch(&pages)?;
//! ```

use rayon::ThreadPoolBuilder;

use crate::error::{GraphError, Result};
use crate::features::external::ExternalFeatures;
use crate::graph::{PageGraph, PageStats};
use crate::page::PageDocument;
use crate::providers::{LineMetricsSource, TextSimilaritySource};
use crate::separators::SeparatorStrategy;
use crate::topology::Interaction;

use super::high_level::{BatchOutput, GraphOptions, build_batch, build_page_graph};

/// A builder for configuring page-graph extraction.
///
/// This provides a fluent API that wraps the underlying `GraphOptions`,
/// collaborator sources and extraction functions.
#[derive(Default)]
pub struct GraphBuilder {
    options: GraphOptions,
    threads: Option<usize>,
    line_metrics: Option<Box<dyn LineMetricsSource>>,
    similarity: Option<Box<dyn TextSimilaritySource>>,
    external: Vec<ExternalFeatures>,
}

impl GraphBuilder {
    /// Creates a builder with default options: Delaunay topology,
    /// bounding-box separators, no visual regions, no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the edge-set construction strategy.
    pub fn interaction(mut self, interaction: Interaction) -> Self {
        self.options.interaction = interaction;
        self
    }

    /// Sets the separator classification strategy.
    pub fn separators(mut self, strategy: SeparatorStrategy) -> Self {
        self.options.separators = strategy;
        self
    }

    /// Enables or disables visual regions for nodes and edges.
    pub fn visual_regions(mut self, enabled: bool) -> Self {
        self.options.visual_regions = enabled;
        self
    }

    /// Sets the stroke-width/text-height collaborator.
    pub fn line_metrics(mut self, source: impl LineMetricsSource + 'static) -> Self {
        self.line_metrics = Some(Box::new(source));
        self
    }

    /// Sets the text-similarity collaborator.
    pub fn similarity(mut self, source: impl TextSimilaritySource + 'static) -> Self {
        self.similarity = Some(Box::new(source));
        self
    }

    /// Adds one external feature source. Sources contribute feature blocks
    /// in the order they were added.
    pub fn external_features(mut self, source: ExternalFeatures) -> Self {
        self.external.push(source);
        self
    }

    /// Enables parallel batch processing with the specified thread count.
    /// Use 1 or less for the current rayon pool.
    pub fn parallel(mut self, thread_count: usize) -> Self {
        self.threads = if thread_count > 1 {
            Some(thread_count)
        } else {
            None
        };
        self
    }

    /// Builds the graph for a single page document.
    pub fn build_page(&self, page: &PageDocument) -> Result<(PageGraph, PageStats)> {
        build_page_graph(
            page,
            &self.options,
            self.line_metrics.as_deref(),
            self.similarity.as_deref(),
            &self.external,
        )
    }

    /// Builds graphs for a batch of pages, on a dedicated thread pool when
    /// a thread count was configured.
    pub fn build_batch(&self, pages: &[PageDocument]) -> Result<BatchOutput> {
        let run = || {
            build_batch(
                pages,
                &self.options,
                self.line_metrics.as_deref(),
                self.similarity.as_deref(),
                &self.external,
            )
        };
        match self.threads {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| GraphError::ThreadPool(e.to_string()))?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }
}
