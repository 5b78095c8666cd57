//! Separator classification - decides whether a region pair is divided by a
//! rule line, horizontally and/or vertically.
//!
//! Two interchangeable policies implement the same contract: the
//! bounding-box policy applies purely bbox-based rules, the line policy
//! intersects the segment joining the two region centers with each
//! separator polygon. Selection happens once, through
//! [`SeparatorStrategy::policy`].

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::geometry::{
    BBox, Segment, bounding_box, segment_intersects_polygon, segment_within_bbox,
};
use crate::page::{Orientation, SeparatorRegion, TextRegion};

/// 2-vector result of separator classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeparatorFlags {
    pub horizontal: bool,
    pub vertical: bool,
}

impl SeparatorFlags {
    fn is_complete(&self) -> bool {
        self.horizontal && self.vertical
    }

    /// The (horizontal, vertical) flag pair as feature values.
    pub fn to_feature(self) -> [f64; 2] {
        [
            if self.horizontal { 1.0 } else { 0.0 },
            if self.vertical { 1.0 } else { 0.0 },
        ]
    }
}

/// Strategy selector for the separator block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparatorStrategy {
    /// Rules over the bounding boxes of the regions and the separator.
    #[default]
    BoundingBox,
    /// Intersections of the region-center segment with separator polygons.
    Line,
}

impl SeparatorStrategy {
    /// The policy implementation behind this strategy.
    pub fn policy(self) -> &'static dyn SeparatorPolicy {
        match self {
            SeparatorStrategy::BoundingBox => &BoundingBoxPolicy,
            SeparatorStrategy::Line => &LineIntersectionPolicy,
        }
    }
}

/// A separator classification policy: region pair + separators -> flags.
///
/// Implementations are pure functions of geometry and symmetric in the two
/// regions.
pub trait SeparatorPolicy: Sync {
    fn classify(
        &self,
        a: &TextRegion,
        b: &TextRegion,
        separators: &[SeparatorRegion],
    ) -> SeparatorFlags;
}

/// Classifies via intersections of the segment joining the two regions'
/// bounding-box centers with each separator polygon. The separator's
/// bounding box acts as a cheap pre-filter before the exact polygon test.
pub struct LineIntersectionPolicy;

impl SeparatorPolicy for LineIntersectionPolicy {
    fn classify(
        &self,
        a: &TextRegion,
        b: &TextRegion,
        separators: &[SeparatorRegion],
    ) -> SeparatorFlags {
        let mut flags = SeparatorFlags::default();
        let (Ok(bb_a), Ok(bb_b)) = (a.bbox(), b.bbox()) else {
            return flags;
        };
        let segment: Segment = (bb_a.center(), bb_b.center());

        for separator in separators {
            let Ok(bb_sep) = separator.bbox() else {
                continue;
            };
            if !segment_intersects_polygon(segment, &bb_sep.corners())
                && !segment_within_bbox(segment, &bb_sep)
            {
                continue;
            }
            if !segment_intersects_polygon(segment, &separator.polygon) {
                continue;
            }
            match separator.resolve_orientation(&bb_sep) {
                Orientation::Horizontal => flags.horizontal = true,
                Orientation::Vertical => flags.vertical = true,
            }
            if flags.is_complete() {
                break;
            }
        }
        debug!(a = %a.id, b = %b.id, ?flags, "separator classification");
        flags
    }
}

/// Classifies via rules over bounding boxes only.
pub struct BoundingBoxPolicy;

impl SeparatorPolicy for BoundingBoxPolicy {
    fn classify(
        &self,
        a: &TextRegion,
        b: &TextRegion,
        separators: &[SeparatorRegion],
    ) -> SeparatorFlags {
        let mut flags = SeparatorFlags::default();
        let (Ok(bb_a), Ok(bb_b)) = (a.bbox(), b.bbox()) else {
            return flags;
        };

        for separator in separators {
            let Ok(bb_sep) = separator.bbox() else {
                continue;
            };
            match separator.resolve_orientation(&bb_sep) {
                Orientation::Vertical => {
                    if is_vertically_separated(&bb_a, &bb_b, &bb_sep) {
                        flags.vertical = true;
                    }
                }
                Orientation::Horizontal => {
                    if is_horizontally_separated(&bb_a, &bb_b, &bb_sep) {
                        flags.horizontal = true;
                    }
                }
            }
            if flags.is_complete() {
                break;
            }
        }
        debug!(a = %a.id, b = %b.id, ?flags, "separator classification");
        flags
    }
}

/// A vertical separator divides the pair iff its horizontal midpoint lies
/// between the two x-ranges (A - S - B or B - S - A) and its y-range
/// overlaps at least one of the regions.
pub fn is_vertically_separated(a: &BBox, b: &BBox, sep: &BBox) -> bool {
    let mid_x = f64::from(sep.min_x + sep.max_x) / 2.0;
    let between = (f64::from(a.max_x) <= mid_x && mid_x <= f64::from(b.min_x))
        || (f64::from(b.max_x) <= mid_x && mid_x <= f64::from(a.min_x));
    if !between {
        return false;
    }
    let overlaps_y = |r: &BBox| r.max_y >= sep.min_y && r.min_y <= sep.max_y;
    overlaps_y(a) || overlaps_y(b)
}

/// A horizontal separator divides the pair iff its y-range lies between the
/// two regions' y-ranges (one above, one below) and the regions do not both
/// sit on one side of its x-range.
pub fn is_horizontally_separated(a: &BBox, b: &BBox, sep: &BBox) -> bool {
    let between = (a.min_y <= sep.min_y && sep.max_y <= b.max_y)
        || (b.min_y <= sep.min_y && sep.max_y <= a.max_y);
    if !between {
        return false;
    }
    let both_left = a.max_x <= sep.min_x && b.max_x <= sep.min_x;
    let both_right = a.min_x >= sep.max_x && b.min_x >= sep.max_x;
    !(both_left || both_right)
}

/// For each horizontal separator, the ids of the text regions whose x-range
/// overlaps the separator's x-range.
pub fn aligned_regions(
    separators: &[SeparatorRegion],
    regions: &[TextRegion],
) -> FxHashMap<String, Vec<String>> {
    let mut aligned = FxHashMap::default();
    for separator in separators {
        let Ok(bb_sep) = separator.bbox() else {
            continue;
        };
        if separator.resolve_orientation(&bb_sep) == Orientation::Vertical {
            continue;
        }
        let ids = regions
            .iter()
            .filter(|region| {
                region
                    .bbox()
                    .map(|bb| bb.max_x >= bb_sep.min_x && bb.min_x <= bb_sep.max_x)
                    .unwrap_or(false)
            })
            .map(|region| region.id.clone())
            .collect();
        aligned.insert(separator.id.clone(), ids);
    }
    aligned
}

/// True iff some horizontal separator lies between the two regions' y-ranges
/// while both regions overlap its x-range.
pub fn is_aligned_horizontally_separated(
    a: &TextRegion,
    b: &TextRegion,
    separators: &[SeparatorRegion],
) -> bool {
    let (Ok(bb_a), Ok(bb_b)) = (a.bbox(), b.bbox()) else {
        return false;
    };
    separators.iter().any(|separator| {
        let Ok(bb_sep) = separator.bbox() else {
            return false;
        };
        if separator.resolve_orientation(&bb_sep) == Orientation::Vertical {
            return false;
        }
        let between = (bb_a.min_y <= bb_sep.min_y && bb_sep.max_y <= bb_b.max_y)
            || (bb_b.min_y <= bb_sep.min_y && bb_sep.max_y <= bb_a.max_y);
        if !between {
            return false;
        }
        bb_a.max_x >= bb_sep.min_x
            && bb_b.max_x >= bb_sep.min_x
            && bb_a.min_x <= bb_sep.max_x
            && bb_b.min_x <= bb_sep.max_x
    })
}

/// True iff exactly one of the two regions is a heading, the regions overlap
/// horizontally, and the heading sits fully below the other region.
pub fn is_aligned_heading_separated(a: &TextRegion, b: &TextRegion) -> bool {
    let (heading_a, heading_b) = (a.is_heading(), b.is_heading());
    if heading_a == heading_b {
        return false;
    }
    let (Ok(bb_a), Ok(bb_b)) = (a.bbox(), b.bbox()) else {
        return false;
    };
    if !(bb_a.min_x <= bb_b.max_x && bb_b.min_x <= bb_a.max_x) {
        return false;
    }
    if heading_a && bb_a.min_y < bb_b.max_y {
        return false;
    }
    if heading_b && bb_b.min_y < bb_a.max_y {
        return false;
    }
    true
}
