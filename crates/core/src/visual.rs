//! Visual regions for nodes and edges.
//!
//! Node visual regions are region bounding boxes; edge visual regions are
//! convex hulls over both endpoint polygons. Batches are laid out
//! coordinate-major per element ([x coordinates], [y coordinates]); edge
//! hulls are zero-padded to the page maximum point count, with per-element
//! valid-point counts so consumers can ignore the padding.

use crate::error::Result;
use crate::geometry::{Point, convex_hull};
use crate::page::TextRegion;

/// A batch of visual regions, coordinate-major, zero-padded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualRegionBatch {
    /// Per element: [x coordinates, y coordinates], padded with zeros.
    pub regions: Vec<[Vec<f64>; 2]>,
    /// Valid point count per element (padding excluded).
    pub num_points: Vec<usize>,
}

/// The region's bounding-box polygon, as its visual region.
pub fn node_visual_region(region: &TextRegion) -> Result<[Point; 4]> {
    Ok(region.bbox()?.corners())
}

/// Convex hull over the union of both endpoint polygons.
pub fn edge_visual_region(a: &TextRegion, b: &TextRegion) -> Vec<Point> {
    let mut points = Vec::with_capacity(a.polygon.len() + b.polygon.len());
    points.extend_from_slice(&a.polygon);
    points.extend_from_slice(&b.polygon);
    convex_hull(&points)
}

/// Stacks the node visual regions (4 points each, no padding needed).
pub fn node_batch(regions: &[TextRegion]) -> Result<VisualRegionBatch> {
    let mut batch = VisualRegionBatch::default();
    for region in regions {
        let corners = node_visual_region(region)?;
        batch.regions.push([
            corners.iter().map(|p| f64::from(p.0)).collect(),
            corners.iter().map(|p| f64::from(p.1)).collect(),
        ]);
        batch.num_points.push(corners.len());
    }
    Ok(batch)
}

/// Stacks the edge visual regions, zero-padded to the page maximum hull
/// size.
pub fn edge_batch(regions: &[TextRegion], edges: &[[usize; 2]]) -> VisualRegionBatch {
    let hulls: Vec<Vec<Point>> = edges
        .iter()
        .map(|&[i, j]| edge_visual_region(&regions[i], &regions[j]))
        .collect();
    let max_points = hulls.iter().map(Vec::len).max().unwrap_or(0);

    let mut batch = VisualRegionBatch::default();
    for hull in &hulls {
        let mut xs = vec![0.0; max_points];
        let mut ys = vec![0.0; max_points];
        for (k, p) in hull.iter().enumerate() {
            xs[k] = f64::from(p.0);
            ys[k] = f64::from(p.1);
        }
        batch.regions.push([xs, ys]);
        batch.num_points.push(hull.len());
    }
    batch
}
