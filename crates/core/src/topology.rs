//! Interaction topology - which region pairs receive edge features.
//!
//! Two strategies: the fully-connected set, and the 1-skeleton of a Delaunay
//! triangulation over the region centers. Both emit a directed edge list
//! whose order is stable for identical input, since edge features at index k
//! reference `interacting_nodes[k]`.

use std::collections::BTreeSet;

use delaunator::{Point as DPoint, triangulate};
use serde::Serialize;
use tracing::warn;

use crate::error::{GraphError, Result};
use crate::geometry::PointF;

/// Edge-set construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    /// Every ordered pair of distinct nodes.
    Fully,
    /// Neighbors in the Delaunay triangulation over node centers.
    #[default]
    Delaunay,
}

/// Which input the triangulation succeeded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangulationPass {
    /// Positions rounded to [`SMOOTHING_BASE`].
    Rounded,
    /// Raw positions, after the rounded attempt degenerated.
    Raw,
}

/// Node positions are rounded to the nearest multiple of this before
/// triangulation, reducing micro-jitter to a clean planar layout.
pub const SMOOTHING_BASE: f64 = 50.0;

/// Every ordered pair (i, j) with i != j, source-major order.
pub fn fully_connected(num_nodes: usize) -> Vec<[usize; 2]> {
    let mut edges = Vec::with_capacity(num_nodes.saturating_mul(num_nodes.saturating_sub(1)));
    for i in 0..num_nodes {
        for j in 0..num_nodes {
            if i != j {
                edges.push([i, j]);
            }
        }
    }
    edges
}

fn round_to_base(value: f64, base: f64) -> f64 {
    (value / base).round() * base
}

/// One triangulation attempt. None when the point set is degenerate
/// (collinear, or fewer than 3 distinct points).
fn try_triangulate(positions: &[PointF]) -> Option<Vec<[usize; 2]>> {
    let points: Vec<DPoint> = positions.iter().map(|&(x, y)| DPoint { x, y }).collect();
    let triangulation = triangulate(&points);
    if triangulation.triangles.is_empty() {
        return None;
    }

    let mut neighbors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); positions.len()];
    for triangle in triangulation.triangles.chunks_exact(3) {
        let (a, b, c) = (triangle[0], triangle[1], triangle[2]);
        neighbors[a].insert(b);
        neighbors[a].insert(c);
        neighbors[b].insert(a);
        neighbors[b].insert(c);
        neighbors[c].insert(a);
        neighbors[c].insert(b);
    }

    let mut edges = Vec::new();
    for (v, adjacent) in neighbors.iter().enumerate() {
        for &u in adjacent {
            edges.push([v, u]);
        }
    }
    Some(edges)
}

/// Delaunay 1-skeleton over the node centers, both directions per adjacent
/// pair, per-vertex neighbors in ascending index order.
///
/// Positions are rounded to [`SMOOTHING_BASE`] first; a degenerate rounded
/// layout falls back to the raw positions, and failure on both is fatal for
/// the page.
pub fn delaunay_edges(
    page: &str,
    positions: &[PointF],
) -> Result<(Vec<[usize; 2]>, TriangulationPass)> {
    let rounded: Vec<PointF> = positions
        .iter()
        .map(|&(x, y)| {
            (
                round_to_base(x, SMOOTHING_BASE),
                round_to_base(y, SMOOTHING_BASE),
            )
        })
        .collect();
    if let Some(edges) = try_triangulate(&rounded) {
        return Ok((edges, TriangulationPass::Rounded));
    }
    warn!(page, "rounded positions are degenerate, retrying with raw positions");
    match try_triangulate(positions) {
        Some(edges) => Ok((edges, TriangulationPass::Raw)),
        None => Err(GraphError::DegenerateLayout {
            page: page.to_string(),
        }),
    }
}

/// Builds the interaction edge list for `positions` under `interaction`.
///
/// Delaunay needs at least 4 nodes; below that it silently falls back to the
/// fully-connected set. The returned pass is None whenever the
/// fully-connected set was used.
pub fn interacting_nodes(
    page: &str,
    interaction: Interaction,
    positions: &[PointF],
) -> Result<(Vec<[usize; 2]>, Option<TriangulationPass>)> {
    match interaction {
        Interaction::Fully => Ok((fully_connected(positions.len()), None)),
        Interaction::Delaunay if positions.len() < 4 => {
            Ok((fully_connected(positions.len()), None))
        }
        Interaction::Delaunay => {
            let (edges, pass) = delaunay_edges(page, positions)?;
            Ok((edges, Some(pass)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_base() {
        assert_eq!(round_to_base(1237.0, 50.0), 1250.0);
        assert_eq!(round_to_base(1212.0, 50.0), 1200.0);
        assert_eq!(round_to_base(0.0, 50.0), 0.0);
        assert_eq!(round_to_base(-30.0, 50.0), -50.0);
    }

    #[test]
    fn test_fully_connected_order() {
        assert_eq!(
            fully_connected(3),
            vec![[0, 1], [0, 2], [1, 0], [1, 2], [2, 0], [2, 1]]
        );
    }

    #[test]
    fn test_delaunay_square_with_center() {
        let positions = [
            (0.0, 0.0),
            (1000.0, 0.0),
            (0.0, 1000.0),
            (1000.0, 1000.0),
            (500.0, 500.0),
        ];
        let (edges, pass) = delaunay_edges("p", &positions).unwrap();
        assert_eq!(pass, TriangulationPass::Rounded);
        // 4 sides + 4 spokes, both directions
        assert_eq!(edges.len(), 16);
        for &[i, j] in &edges {
            assert_ne!(i, j);
            assert!(edges.contains(&[j, i]));
        }
        // the center is adjacent to every corner
        let center_degree = edges.iter().filter(|e| e[0] == 4).count();
        assert_eq!(center_degree, 4);
    }
}
