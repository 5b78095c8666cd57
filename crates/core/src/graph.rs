//! Graph output and per-page diagnostics.

use serde::Serialize;

use crate::features::external::FallbackTier;
use crate::topology::TriangulationPass;

/// The extracted page graph: topology, features and ground truth, ready for
/// serialization. Field names match the downstream consumer's keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageGraph {
    pub num_nodes: usize,
    pub interacting_nodes: Vec<[usize; 2]>,
    pub num_interacting_nodes: usize,
    pub node_features: Vec<Vec<f64>>,
    /// Empty when the page has no interacting pairs.
    pub edge_features: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_regions_nodes: Option<Vec<[Vec<f64>; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_points_visual_regions_nodes: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_regions_edges: Option<Vec<[Vec<f64>; 2]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_points_visual_regions_edges: Option<Vec<usize>>,
    /// (label, i, j) triples; label 1 marks "same article".
    pub gt_relations: Vec<[usize; 3]>,
    pub gt_num_relations: usize,
}

impl PageGraph {
    /// Width of the node feature vectors.
    pub fn node_width(&self) -> usize {
        self.node_features.first().map_or(0, Vec::len)
    }

    /// Width of the edge feature vectors.
    pub fn edge_width(&self) -> usize {
        self.edge_features.first().map_or(0, Vec::len)
    }
}

/// Fallback-tier hit counters for one lookup family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FallbackCounts {
    pub source_default: usize,
    pub hardcoded: usize,
}

impl FallbackCounts {
    pub fn record(&mut self, tier: FallbackTier) {
        match tier {
            FallbackTier::Exact => {}
            FallbackTier::SourceDefault => self.source_default += 1,
            FallbackTier::Hardcoded => self.hardcoded += 1,
        }
    }
}

/// Diagnostics accumulated while building one page graph, returned alongside
/// the graph so batch reporting needs no shared state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageStats {
    /// Regions removed before graph construction (no text or too small).
    pub discarded_regions: usize,
    /// Regions whose article assignment listed several ids.
    pub ambiguous_assignments: usize,
    /// External sources with no entry for this page.
    pub missing_page_entries: usize,
    pub node_fallbacks: FallbackCounts,
    pub similarity_fallbacks: FallbackCounts,
    pub edge_fallbacks: FallbackCounts,
    /// Which triangulation attempt produced the edge set; None for the
    /// fully-connected strategy (including the small-page fallback).
    pub triangulation: Option<TriangulationPass>,
}
