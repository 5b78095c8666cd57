//! Collaborator interfaces: stroke-width/text-height metrics and pairwise
//! text similarity.
//!
//! The image transform and the word-vector model behind these live outside
//! this crate; the library consumes their results through the traits below.
//! The `Precomputed*` adapters read per-page tables from JSON so drivers can
//! run against offline-computed data.

use std::io::Read;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::warn;

use crate::error::{GraphError, Result};
use crate::features::external::PairFeatureTable;
use crate::page::{PageDocument, TextLine};

/// Per-line scalars from the stroke-width/text-height collaborator.
///
/// Lines with degenerate or filtered connected components carry 0.0; lines
/// missing from a table are treated the same way.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineMetrics {
    #[serde(default)]
    pub stroke_widths: FxHashMap<String, f64>,
    #[serde(default)]
    pub text_heights: FxHashMap<String, f64>,
}

impl LineMetrics {
    /// Page-wide (stroke width, text height) maxima over `lines`, used as
    /// normalization constants. Empty-text lines count.
    pub fn maxima<'a>(&self, lines: impl Iterator<Item = &'a TextLine>) -> (f64, f64) {
        let mut stroke_max = 0.0_f64;
        let mut height_max = 0.0_f64;
        for line in lines {
            stroke_max = stroke_max.max(self.stroke_widths.get(&line.id).copied().unwrap_or(0.0));
            height_max = height_max.max(self.text_heights.get(&line.id).copied().unwrap_or(0.0));
        }
        (stroke_max, height_max)
    }
}

/// Stroke-width/text-height collaborator.
///
/// Implementations that cannot locate their backing data for a page return
/// an error, which is fatal for that page.
pub trait LineMetricsSource: Sync {
    fn line_metrics(&self, page: &PageDocument) -> Result<LineMetrics>;
}

/// Text-similarity collaborator.
pub trait TextSimilaritySource: Sync {
    /// Pairwise similarity table for `page_id`. `texts` maps region id to
    /// the region's newline-joined text, in region order.
    fn pairwise(&self, page_id: &str, texts: &[(String, String)]) -> PairFeatureTable;
}

/// Line metrics precomputed offline, keyed by page id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PrecomputedLineMetrics {
    pages: FxHashMap<String, LineMetrics>,
}

impl PrecomputedLineMetrics {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn insert_page(&mut self, page_id: impl Into<String>, metrics: LineMetrics) {
        self.pages.insert(page_id.into(), metrics);
    }
}

impl LineMetricsSource for PrecomputedLineMetrics {
    fn line_metrics(&self, page: &PageDocument) -> Result<LineMetrics> {
        self.pages
            .get(&page.id)
            .cloned()
            .ok_or_else(|| GraphError::MissingLineMetrics {
                page: page.id.clone(),
                reason: "no precomputed entry for page".to_string(),
            })
    }
}

/// Pairwise similarity tables precomputed offline, keyed by page id. Each
/// page entry carries an "edge_features" table in the external-source
/// format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PrecomputedSimilarity {
    pages: FxHashMap<String, SimilarityTables>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SimilarityTables {
    #[serde(default)]
    edge_features: Option<PairFeatureTable>,
}

impl PrecomputedSimilarity {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn insert_page(&mut self, page_id: impl Into<String>, table: PairFeatureTable) {
        self.pages.insert(
            page_id.into(),
            SimilarityTables {
                edge_features: Some(table),
            },
        );
    }
}

impl TextSimilaritySource for PrecomputedSimilarity {
    fn pairwise(&self, page_id: &str, _texts: &[(String, String)]) -> PairFeatureTable {
        match self
            .pages
            .get(page_id)
            .and_then(|tables| tables.edge_features.clone())
        {
            Some(table) => table,
            None => {
                warn!(page = page_id, "no similarity entry for page, every pair will use fallbacks");
                PairFeatureTable::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maxima_over_lines() {
        let mut metrics = LineMetrics::default();
        metrics.stroke_widths.insert("l0".to_string(), 2.0);
        metrics.stroke_widths.insert("l1".to_string(), 5.0);
        metrics.text_heights.insert("l0".to_string(), 30.0);
        let lines = vec![
            TextLine {
                id: "l0".to_string(),
                baseline: vec![],
                polygon: vec![],
                text: "a".to_string(),
            },
            TextLine {
                id: "l1".to_string(),
                baseline: vec![],
                polygon: vec![],
                text: String::new(),
            },
        ];
        // empty-text lines still count toward the maxima
        assert_eq!(metrics.maxima(lines.iter()), (5.0, 30.0));
    }

    #[test]
    fn test_precomputed_metrics_missing_page_is_fatal() {
        let source = PrecomputedLineMetrics::default();
        let page = PageDocument {
            id: "p0".to_string(),
            width: 100,
            height: 100,
            text_regions: vec![],
            separator_regions: vec![],
            articles: FxHashMap::default(),
        };
        assert!(matches!(
            source.line_metrics(&page),
            Err(GraphError::MissingLineMetrics { .. })
        ));
    }
}
