//! Page document model.
//!
//! The graph builder consumes already-parsed page documents: text regions
//! with their lines, separator regions, article assignments and the page
//! resolution. Drivers construct these from their own markup parser or
//! deserialize them from JSON; the core never parses markup.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::{BBox, Point, bounding_box};

/// Minimum bounding-box side length for a region to take part in graph
/// construction.
pub const MIN_REGION_SIZE: i32 = 10;

/// A single line of text with its baseline and surrounding polygon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub id: String,
    #[serde(default)]
    pub baseline: Vec<Point>,
    #[serde(default)]
    pub polygon: Vec<Point>,
    #[serde(default)]
    pub text: String,
}

/// A layout area containing text lines - a candidate article fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRegion {
    pub id: String,
    pub polygon: Vec<Point>,
    /// Category tag; "heading" (case-insensitive) switches on the heading
    /// feature.
    #[serde(default)]
    pub region_type: String,
    #[serde(default)]
    pub lines: Vec<TextLine>,
}

impl TextRegion {
    pub fn bbox(&self) -> Result<BBox> {
        bounding_box(&self.polygon)
    }

    pub fn is_heading(&self) -> bool {
        self.region_type.eq_ignore_ascii_case("heading")
    }

    /// True if every line of the region has empty text (or there are no
    /// lines at all).
    pub fn is_text_empty(&self) -> bool {
        self.lines.iter().all(|line| line.text.is_empty())
    }

    /// All line texts joined with newlines, in line order.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Separator orientation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A graphical rule or bar dividing page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparatorRegion {
    pub id: String,
    pub polygon: Vec<Point>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

impl SeparatorRegion {
    pub fn bbox(&self) -> Result<BBox> {
        bounding_box(&self.polygon)
    }

    /// The explicit orientation tag, or the aspect-ratio heuristic over
    /// `bbox` when unset: height/width < 5 means horizontal. Width and
    /// height are clamped to at least 1 before the ratio.
    pub fn resolve_orientation(&self, bbox: &BBox) -> Orientation {
        if let Some(orientation) = self.orientation {
            return orientation;
        }
        debug!(separator = %self.id, "no orientation tag, using aspect-ratio heuristic");
        let width = f64::from(bbox.width().max(1));
        let height = f64::from(bbox.height().max(1));
        if height / width < 5.0 {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// Article assignment for a region: one id, or (ambiguously) several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleRef {
    Single(String),
    Multiple(Vec<String>),
}

/// Everything the graph builder needs to know about one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDocument {
    /// Page identifier; also the key into external feature files.
    pub id: String,
    /// Pixel resolution of the page image.
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub text_regions: Vec<TextRegion>,
    #[serde(default)]
    pub separator_regions: Vec<SeparatorRegion>,
    /// region-id -> article assignment; regions may be absent.
    #[serde(default)]
    pub articles: FxHashMap<String, ArticleRef>,
}

impl PageDocument {
    /// Iterator over every line of every text region.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.text_regions.iter().flat_map(|region| region.lines.iter())
    }
}

/// Removes regions that cannot take part in graph construction: regions
/// with no text at all, and regions whose bounding box is smaller than
/// [`MIN_REGION_SIZE`] in either dimension. Lines go with their region.
/// Returns the number of discarded regions.
pub fn discard_degenerate_regions(regions: &mut Vec<TextRegion>) -> usize {
    let before = regions.len();
    regions.retain(|region| {
        if region.is_text_empty() {
            debug!(region = %region.id, "discarding region (no text)");
            return false;
        }
        match bounding_box(&region.polygon) {
            Ok(bb) if bb.width() >= MIN_REGION_SIZE && bb.height() >= MIN_REGION_SIZE => true,
            Ok(bb) => {
                debug!(
                    region = %region.id,
                    width = bb.width(),
                    height = bb.height(),
                    "discarding region (bounding box too small)"
                );
                false
            }
            Err(_) => {
                debug!(region = %region.id, "discarding region (no polygon)");
                false
            }
        }
    });
    let discarded = before - regions.len();
    if discarded > 0 {
        warn!(discarded, "discarded degenerate text region(s)");
    }
    discarded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: &str, polygon: Vec<Point>, texts: &[&str]) -> TextRegion {
        TextRegion {
            id: id.to_string(),
            polygon,
            region_type: "paragraph".to_string(),
            lines: texts
                .iter()
                .enumerate()
                .map(|(i, text)| TextLine {
                    id: format!("{id}-l{i}"),
                    baseline: vec![(0, 0), (1, 0)],
                    polygon: vec![],
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_discard_no_text_and_small_regions() {
        let big = vec![(0, 0), (100, 0), (100, 100), (0, 100)];
        let flat = vec![(0, 0), (100, 0), (100, 9), (0, 9)];
        let mut regions = vec![
            region("keep", big.clone(), &["text"]),
            region("empty", big.clone(), &["", ""]),
            region("no-lines", big, &[]),
            region("flat", flat, &["text"]),
        ];
        let discarded = discard_degenerate_regions(&mut regions);
        assert_eq!(discarded, 3);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].id, "keep");
    }

    #[test]
    fn test_discard_keeps_exactly_min_size() {
        let mut regions = vec![region(
            "min",
            vec![(0, 0), (10, 0), (10, 10), (0, 10)],
            &["text"],
        )];
        assert_eq!(discard_degenerate_regions(&mut regions), 0);
    }

    #[test]
    fn test_orientation_heuristic() {
        let mut sep = SeparatorRegion {
            id: "s0".to_string(),
            polygon: vec![(0, 0), (1000, 0), (1000, 8), (0, 8)],
            orientation: None,
        };
        let bb = sep.bbox().unwrap();
        assert_eq!(sep.resolve_orientation(&bb), Orientation::Horizontal);

        sep.polygon = vec![(0, 0), (8, 0), (8, 1000), (0, 1000)];
        let bb = sep.bbox().unwrap();
        assert_eq!(sep.resolve_orientation(&bb), Orientation::Vertical);

        // explicit tag wins over the ratio
        sep.orientation = Some(Orientation::Horizontal);
        assert_eq!(sep.resolve_orientation(&bb), Orientation::Horizontal);
    }

    #[test]
    fn test_article_ref_deserializes_both_shapes() {
        let single: ArticleRef = serde_json::from_str("\"a1\"").unwrap();
        assert_eq!(single, ArticleRef::Single("a1".to_string()));
        let multi: ArticleRef = serde_json::from_str("[\"a1\", \"a2\"]").unwrap();
        assert_eq!(
            multi,
            ArticleRef::Multiple(vec!["a1".to_string(), "a2".to_string()])
        );
    }
}
