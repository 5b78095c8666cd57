//! Geometry kernel - pure functions over page coordinates.
//!
//! Provides:
//! - Bounding boxes over integer point sets
//! - Convex hulls (monotone chain)
//! - Segment intersection and containment tests used by the separator
//!   classifier and the visual region builder

use itertools::Itertools;

use crate::error::{GraphError, Result};

/// A 2D point in page pixel coordinates.
pub type Point = (i32, i32);

/// A 2D point with fractional coordinates (bounding-box centers and the like).
pub type PointF = (f64, f64);

/// A line segment between two fractional points.
pub type Segment = (PointF, PointF);

/// Axis-aligned bounding box over a point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl BBox {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Center of the box, as fractional coordinates.
    pub fn center(&self) -> PointF {
        (
            (self.min_x + self.max_x) as f64 / 2.0,
            (self.min_y + self.max_y) as f64 / 2.0,
        )
    }

    /// Corner polygon, counter-clockwise from (min_x, min_y).
    pub fn corners(&self) -> [Point; 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }
}

/// Computes the bounding box over a set of points.
pub fn bounding_box(points: &[Point]) -> Result<BBox> {
    let (&(mut min_x, mut min_y), rest) = points.split_first().ok_or(GraphError::EmptyPointSet)?;
    let (mut max_x, mut max_y) = (min_x, min_y);
    for &(x, y) in rest {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    Ok(BBox {
        min_x,
        max_x,
        min_y,
        max_y,
    })
}

/// Convex hull over a point set (Andrew's monotone chain).
///
/// Returns the hull vertices in counter-clockwise order without repeating
/// the first point. Inputs with fewer than 3 distinct points come back as
/// the sorted distinct points.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point, a: Point, b: Point) -> i64 {
        i64::from(a.0 - o.0) * i64::from(b.1 - o.1) - i64::from(a.1 - o.1) * i64::from(b.0 - o.0)
    }

    let mut lower: Vec<Point> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    // the endpoints of each chain repeat in the other
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn orient(a: PointF, b: PointF, c: PointF) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn on_segment(a: PointF, b: PointF, p: PointF) -> bool {
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Tests whether two segments intersect. Touching endpoints and collinear
/// overlap count as intersections.
pub fn segments_intersect(s1: Segment, s2: Segment) -> bool {
    let (p1, p2) = s1;
    let (p3, p4) = s2;
    let d1 = orient(p3, p4, p1);
    let d2 = orient(p3, p4, p2);
    let d3 = orient(p1, p2, p3);
    let d4 = orient(p1, p2, p4);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

fn to_f(p: Point) -> PointF {
    (f64::from(p.0), f64::from(p.1))
}

/// Tests a segment against every edge of `polygon`, which is closed
/// implicitly. Returns true on the first intersecting edge.
pub fn segment_intersects_polygon(segment: Segment, polygon: &[Point]) -> bool {
    if polygon.len() < 2 {
        return false;
    }
    polygon
        .iter()
        .chain(std::iter::once(&polygon[0]))
        .tuple_windows()
        .any(|(&a, &b)| segments_intersect(segment, (to_f(a), to_f(b))))
}

/// Strict containment: both segment endpoints lie strictly inside `bbox`.
pub fn segment_within_bbox(segment: Segment, bbox: &BBox) -> bool {
    let inside = |p: PointF| {
        p.0 > f64::from(bbox.min_x)
            && p.0 < f64::from(bbox.max_x)
            && p.1 > f64::from(bbox.min_y)
            && p.1 < f64::from(bbox.max_y)
    };
    inside(segment.0) && inside(segment.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let bb = bounding_box(&[(3, 7), (1, 9), (5, 2)]).unwrap();
        assert_eq!(
            bb,
            BBox {
                min_x: 1,
                max_x: 5,
                min_y: 2,
                max_y: 9
            }
        );
        assert_eq!(bb.width(), 4);
        assert_eq!(bb.height(), 7);
        assert_eq!(bb.center(), (3.0, 5.5));
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(matches!(bounding_box(&[]), Err(GraphError::EmptyPointSet)));
    }

    #[test]
    fn test_convex_hull_drops_interior_points() {
        let hull = convex_hull(&[(0, 0), (10, 0), (10, 10), (0, 10), (5, 5)]);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&(5, 5)));
    }

    #[test]
    fn test_convex_hull_collinear() {
        let hull = convex_hull(&[(0, 0), (5, 5), (10, 10)]);
        assert_eq!(hull, vec![(0, 0), (10, 10)]);
    }

    #[test]
    fn test_segments_intersect_crossing_and_touching() {
        assert!(segments_intersect(
            ((0.0, 0.0), (10.0, 10.0)),
            ((0.0, 10.0), (10.0, 0.0))
        ));
        // touching at an endpoint counts
        assert!(segments_intersect(
            ((0.0, 0.0), (5.0, 5.0)),
            ((5.0, 5.0), (10.0, 0.0))
        ));
        assert!(!segments_intersect(
            ((0.0, 0.0), (1.0, 0.0)),
            ((0.0, 1.0), (1.0, 1.0))
        ));
    }

    #[test]
    fn test_segment_intersects_polygon_closing_edge() {
        // square; segment crosses only the implicit closing edge
        let square = [(0, 0), (10, 0), (10, 10), (0, 10)];
        assert!(segment_intersects_polygon(
            ((-5.0, 5.0), (5.0, 5.0)),
            &square
        ));
        assert!(!segment_intersects_polygon(
            ((-5.0, -5.0), (-1.0, -1.0)),
            &square
        ));
    }

    #[test]
    fn test_segment_within_bbox_is_strict() {
        let bb = BBox {
            min_x: 0,
            max_x: 10,
            min_y: 0,
            max_y: 10,
        };
        assert!(segment_within_bbox(((1.0, 1.0), (9.0, 9.0)), &bb));
        // endpoint on the boundary is not inside
        assert!(!segment_within_bbox(((0.0, 1.0), (9.0, 9.0)), &bb));
        assert!(!segment_within_bbox(((1.0, 1.0), (9.0, 10.0)), &bb));
    }
}
