//! Node feature assembly.
//!
//! Fixed block order: geometric (4), baseline (8), stroke width (1), text
//! height (1), heading (1), then one block per external source.

use rustc_hash::FxHashMap;

use crate::error::{GraphError, Result};
use crate::features::external::PageFeatureTables;
use crate::geometry::{Point, bounding_box};
use crate::graph::PageStats;
use crate::page::TextRegion;
use crate::providers::LineMetrics;

/// 4-dim geometric block over a point set: bounding-box size (w, h) and
/// center (x, y), normalized by the page resolution. The size components use
/// (norm_x, norm_y), the center components use (2 norm_x, 2 norm_y).
pub fn geometric_features(points: &[Point], norm_x: f64, norm_y: f64) -> Result<[f64; 4]> {
    let bb = bounding_box(points)?;
    Ok([
        f64::from(bb.width()) / norm_x,
        f64::from(bb.height()) / norm_y,
        f64::from(bb.min_x + bb.max_x) / (2.0 * norm_x),
        f64::from(bb.min_y + bb.max_y) / (2.0 * norm_y),
    ])
}

/// 8-dim baseline block: the geometric encoding of the region's top (first
/// line) and bottom (last line) baselines.
pub fn baseline_features(region: &TextRegion, norm_x: f64, norm_y: f64) -> Result<[f64; 8]> {
    let first = region.lines.first().ok_or(GraphError::EmptyPointSet)?;
    let last = region.lines.last().ok_or(GraphError::EmptyPointSet)?;
    let top = geometric_features(&first.baseline, norm_x, norm_y)?;
    let bottom = geometric_features(&last.baseline, norm_x, norm_y)?;
    let mut feature = [0.0; 8];
    feature[..4].copy_from_slice(&top);
    feature[4..].copy_from_slice(&bottom);
    Ok(feature)
}

/// Normalized maximum of a per-line metric over the region's non-empty
/// lines; 0.0 when every line is empty.
///
/// The maximum (rather than a mean) keeps headings visible when they are
/// clustered in a block with body text. Lines missing from the table count
/// as 0.0, matching the collaborator contract for degenerate lines.
pub fn line_metric_feature(
    region: &TextRegion,
    per_line: &FxHashMap<String, f64>,
    norm: f64,
) -> f64 {
    if region.is_text_empty() {
        return 0.0;
    }
    let max = region
        .lines
        .iter()
        .filter(|line| !line.text.is_empty())
        .map(|line| per_line.get(&line.id).copied().unwrap_or(0.0))
        .fold(0.0_f64, f64::max);
    if norm > 0.0 { max / norm } else { 0.0 }
}

/// 1.0 for heading regions, else 0.0.
pub fn heading_feature(region: &TextRegion) -> f64 {
    if region.is_heading() { 1.0 } else { 0.0 }
}

/// Assembles the full node feature vector for `region`.
pub fn node_feature(
    region: &TextRegion,
    norm_x: f64,
    norm_y: f64,
    metrics: &LineMetrics,
    stroke_norm: f64,
    height_norm: f64,
    external: &[Option<&PageFeatureTables>],
    stats: &mut PageStats,
) -> Result<Vec<f64>> {
    let mut feature = Vec::with_capacity(super::NODE_BASE_WIDTH);
    feature.extend_from_slice(&geometric_features(&region.polygon, norm_x, norm_y)?);
    feature.extend_from_slice(&baseline_features(region, norm_x, norm_y)?);
    feature.push(line_metric_feature(region, &metrics.stroke_widths, stroke_norm));
    feature.push(line_metric_feature(region, &metrics.text_heights, height_norm));
    feature.push(heading_feature(region));
    for tables in external {
        if let Some(table) = tables.and_then(|t| t.node_features.as_ref()) {
            let (values, tier) = table.resolve(&region.id);
            stats.node_fallbacks.record(tier);
            feature.extend_from_slice(&values);
        }
    }
    Ok(feature)
}
