//! High-level graph extraction API.
//!
//! Provides the main public entry points:
//! - `build_page_graph()` - extract the graph for one page document
//! - `build_batch()` - extract graphs for a batch of pages in parallel
//!
//! A page runs through a fixed pipeline: degenerate-region discard, line
//! metrics, node features, interaction topology, text similarity, edge
//! features, optional visual regions, ground-truth relations. Failures are
//! fatal for their page only; `build_batch` records them as skip reasons and
//! keeps going.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::features::edge::{EdgeFeatureInputs, edge_feature};
use crate::features::external::{ExternalFeatures, PageFeatureTables};
use crate::features::node::node_feature;
use crate::geometry::PointF;
use crate::graph::{PageGraph, PageStats};
use crate::ground_truth::same_article_relations;
use crate::page::{PageDocument, discard_degenerate_regions};
use crate::providers::{LineMetrics, LineMetricsSource, TextSimilaritySource};
use crate::separators::SeparatorStrategy;
use crate::topology::{Interaction, interacting_nodes};
use crate::visual::{edge_batch, node_batch};

/// Options for graph extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphOptions {
    /// Edge-set construction strategy.
    pub interaction: Interaction,

    /// Separator classification strategy for the edge separator block.
    pub separators: SeparatorStrategy,

    /// Also build visual regions for nodes and edges.
    pub visual_regions: bool,
}

/// A successfully built page graph with its diagnostics.
#[derive(Debug, Clone)]
pub struct PageGraphResult {
    pub page_id: String,
    pub graph: PageGraph,
    pub stats: PageStats,
}

/// A page skipped by a batch run, with the reason.
#[derive(Debug)]
pub struct SkippedPage {
    pub page_id: String,
    pub reason: GraphError,
}

/// Outcome of a batch run. Graphs keep the input page order, with skipped
/// pages removed.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub graphs: Vec<PageGraphResult>,
    pub skipped: Vec<SkippedPage>,
}

/// Builds the graph representation for a single page document.
///
/// `metrics_source` is the stroke-width/text-height collaborator; without
/// one, both blocks are 0.0 for every node. `similarity_source` contributes
/// the pairwise text-similarity edge block when present. Each entry of
/// `external` contributes one node and/or edge block per its per-page
/// tables.
///
/// Returns the graph together with the diagnostics accumulated while
/// building it.
pub fn build_page_graph(
    page: &PageDocument,
    options: &GraphOptions,
    metrics_source: Option<&dyn LineMetricsSource>,
    similarity_source: Option<&dyn TextSimilaritySource>,
    external: &[ExternalFeatures],
) -> Result<(PageGraph, PageStats)> {
    let mut stats = PageStats::default();

    if page.text_regions.is_empty() {
        return Err(GraphError::NoTextRegions {
            page: page.id.clone(),
        });
    }

    let mut regions = page.text_regions.clone();
    stats.discarded_regions = discard_degenerate_regions(&mut regions);
    let num_nodes = regions.len();
    if num_nodes < 2 {
        return Err(GraphError::TooFewRegions {
            page: page.id.clone(),
            count: num_nodes,
        });
    }

    let norm_x = f64::from(page.width);
    let norm_y = f64::from(page.height);

    let metrics = match metrics_source {
        Some(source) => source.line_metrics(page)?,
        None => LineMetrics::default(),
    };
    let (stroke_norm, height_norm) = metrics.maxima(regions.iter().flat_map(|r| r.lines.iter()));

    // Resolve each external source's tables for this page once; a source
    // without the page contributes nothing to any feature vector.
    let page_tables: Vec<Option<&PageFeatureTables>> = external
        .iter()
        .map(|source| source.page(&page.id))
        .collect();
    stats.missing_page_entries = page_tables.iter().filter(|tables| tables.is_none()).count();

    let mut node_features = Vec::with_capacity(num_nodes);
    for region in &regions {
        node_features.push(node_feature(
            region,
            norm_x,
            norm_y,
            &metrics,
            stroke_norm,
            height_norm,
            &page_tables,
            &mut stats,
        )?);
    }

    // Node positions for the topology come from the geometric block,
    // de-normalized back to pixel coordinates.
    let positions: Vec<PointF> = node_features
        .iter()
        .map(|feature| (feature[2] * norm_x, feature[3] * norm_y))
        .collect();
    let (edges, pass) = interacting_nodes(&page.id, options.interaction, &positions)?;
    stats.triangulation = pass;
    debug!(
        page = %page.id,
        num_nodes,
        num_edges = edges.len(),
        "built interaction topology"
    );

    let similarity = similarity_source.map(|source| {
        let texts: Vec<(String, String)> = regions
            .iter()
            .map(|region| (region.id.clone(), region.text()))
            .collect();
        source.pairwise(&page.id, &texts)
    });

    let inputs = EdgeFeatureInputs {
        separators: &page.separator_regions,
        policy: options.separators.policy(),
        similarity: similarity.as_ref(),
        external: &page_tables,
    };
    let mut edge_features = Vec::with_capacity(edges.len());
    for &[i, j] in &edges {
        edge_features.push(edge_feature(&regions[i], &regions[j], &inputs, &mut stats));
    }

    let (visual_regions_nodes, num_points_visual_regions_nodes) = if options.visual_regions {
        let batch = node_batch(&regions)?;
        (Some(batch.regions), Some(batch.num_points))
    } else {
        (None, None)
    };
    let (visual_regions_edges, num_points_visual_regions_edges) = if options.visual_regions {
        let batch = edge_batch(&regions, &edges);
        (Some(batch.regions), Some(batch.num_points))
    } else {
        (None, None)
    };

    let (gt_relations, ambiguous) = same_article_relations(&regions, &page.articles);
    stats.ambiguous_assignments = ambiguous;

    let graph = PageGraph {
        num_nodes,
        num_interacting_nodes: edges.len(),
        interacting_nodes: edges,
        node_features,
        edge_features,
        visual_regions_nodes,
        num_points_visual_regions_nodes,
        visual_regions_edges,
        num_points_visual_regions_edges,
        gt_num_relations: gt_relations.len(),
        gt_relations,
    };
    Ok((graph, stats))
}

/// Builds graphs for a batch of pages on the current rayon pool.
///
/// Pages are independent, so the batch is embarrassingly parallel. A page
/// that fails does not abort the batch; it lands in `skipped` with its
/// reason.
pub fn build_batch(
    pages: &[PageDocument],
    options: &GraphOptions,
    metrics_source: Option<&dyn LineMetricsSource>,
    similarity_source: Option<&dyn TextSimilaritySource>,
    external: &[ExternalFeatures],
) -> BatchOutput {
    let results: Vec<(String, Result<(PageGraph, PageStats)>)> = pages
        .par_iter()
        .map(|page| {
            (
                page.id.clone(),
                build_page_graph(page, options, metrics_source, similarity_source, external),
            )
        })
        .collect();

    let mut output = BatchOutput::default();
    for (page_id, result) in results {
        match result {
            Ok((graph, stats)) => output.graphs.push(PageGraphResult {
                page_id,
                graph,
                stats,
            }),
            Err(reason) => {
                warn!(page = %page_id, %reason, "skipping page");
                output.skipped.push(SkippedPage { page_id, reason });
            }
        }
    }
    output
}
