//! Tests for interaction topology construction: the fully-connected edge
//! set, the Delaunay 1-skeleton, and the rounded/raw/fatal triangulation
//! branches.

use pagegraph_core::error::GraphError;
use pagegraph_core::geometry::PointF;
use pagegraph_core::topology::{
    Interaction, TriangulationPass, delaunay_edges, fully_connected, interacting_nodes,
};

fn grid_positions(n: usize) -> Vec<PointF> {
    (0..n)
        .map(|i| (((i % 3) * 700) as f64, ((i / 3) * 700) as f64))
        .collect()
}

// ============================================================================
// Fully-connected edges
// ============================================================================

#[test]
fn test_fully_connected_count_and_no_self_loops() {
    for n in 2..10 {
        let edges = fully_connected(n);
        assert_eq!(edges.len(), n * (n - 1));
        assert!(edges.iter().all(|&[i, j]| i != j));
    }
}

#[test]
fn test_fully_connected_contains_both_directions() {
    let edges = fully_connected(4);
    for i in 0..4 {
        for j in 0..4 {
            if i != j {
                assert!(edges.contains(&[i, j]));
            }
        }
    }
}

#[test]
fn test_fully_connected_trivial_sizes() {
    assert!(fully_connected(0).is_empty());
    assert!(fully_connected(1).is_empty());
    assert_eq!(fully_connected(2), vec![[0, 1], [1, 0]]);
}

// ============================================================================
// Delaunay edges
// ============================================================================

#[test]
fn test_small_page_falls_back_to_fully() {
    for n in 2..4 {
        let positions = grid_positions(n);
        let (edges, pass) = interacting_nodes("p", Interaction::Delaunay, &positions).unwrap();
        assert_eq!(edges, fully_connected(n));
        assert!(pass.is_none());
    }
}

#[test]
fn test_delaunay_is_sparser_than_fully() {
    let positions = grid_positions(9);
    let (delaunay, pass) = interacting_nodes("p", Interaction::Delaunay, &positions).unwrap();
    let (fully, _) = interacting_nodes("p", Interaction::Fully, &positions).unwrap();
    assert_eq!(pass, Some(TriangulationPass::Rounded));
    assert!(delaunay.len() < fully.len());
    assert_eq!(fully.len(), 72);
}

#[test]
fn test_delaunay_edges_are_symmetric_without_self_loops() {
    let positions = grid_positions(9);
    let (edges, _) = delaunay_edges("p", &positions).unwrap();
    for &[i, j] in &edges {
        assert_ne!(i, j);
        assert!(edges.contains(&[j, i]));
    }
}

#[test]
fn test_delaunay_rounding_merges_jitter() {
    // jittered corners of a square; rounding to 50 snaps them onto a clean
    // grid and the triangulation succeeds on the first attempt
    let positions = [
        (3.0, -4.0),
        (996.0, 2.0),
        (-2.0, 1004.0),
        (1001.0, 998.0),
        (503.0, 497.0),
    ];
    let (edges, pass) = delaunay_edges("p", &positions).unwrap();
    assert_eq!(pass, TriangulationPass::Rounded);
    let center_degree = edges.iter().filter(|e| e[0] == 4).count();
    assert_eq!(center_degree, 4);
}

// ============================================================================
// Degenerate-layout recovery
// ============================================================================

#[test]
fn test_rounded_degenerate_retries_raw() {
    // collinear after rounding to 50, but a genuine zigzag before
    let positions = [(0.0, 10.0), (500.0, -10.0), (1000.0, 10.0), (1500.0, -10.0)];
    let (edges, pass) = delaunay_edges("p", &positions).unwrap();
    assert_eq!(pass, TriangulationPass::Raw);
    assert!(!edges.is_empty());
}

#[test]
fn test_collinear_layout_is_fatal() {
    let positions = [(0.0, 0.0), (100.0, 100.0), (200.0, 200.0), (300.0, 300.0)];
    let result = delaunay_edges("p", &positions);
    assert!(matches!(result, Err(GraphError::DegenerateLayout { .. })));

    let result = interacting_nodes("p", Interaction::Delaunay, &positions);
    assert!(matches!(result, Err(GraphError::DegenerateLayout { .. })));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_edge_lists_are_reproducible() {
    let positions = grid_positions(9);
    let (first, _) = interacting_nodes("p", Interaction::Delaunay, &positions).unwrap();
    let (second, _) = interacting_nodes("p", Interaction::Delaunay, &positions).unwrap();
    assert_eq!(first, second);

    let (first, _) = interacting_nodes("p", Interaction::Fully, &positions).unwrap();
    let (second, _) = interacting_nodes("p", Interaction::Fully, &positions).unwrap();
    assert_eq!(first, second);
}
