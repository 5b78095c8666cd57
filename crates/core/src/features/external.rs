//! External feature tables and the three-tier fallback lookup.
//!
//! External sources are JSON files keyed by page identifier. Per page they
//! may carry a "node_features" table (region-id -> vector, with an optional
//! "default" entry) and an "edge_features" table (region-id -> region-id ->
//! vector, with an optional "default" entry). Lookups resolve through three
//! tiers - exact entry, source default, hardcoded scalar - and report which
//! tier answered, so callers can count fallback hits instead of unwinding
//! through errors.

use std::borrow::Cow;
use std::io::Read;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;

/// Hardcoded last-tier fallback for node lookups.
pub const NODE_FALLBACK: f64 = 0.0;

/// Hardcoded last-tier fallback for edge and similarity lookups.
pub const EDGE_FALLBACK: f64 = 0.5;

/// Which tier a lookup resolved at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTier {
    Exact,
    SourceDefault,
    Hardcoded,
}

/// region-id -> vector table with an optional default entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeFeatureTable {
    entries: FxHashMap<String, Vec<f64>>,
    default: Option<Vec<f64>>,
}

impl NodeFeatureTable {
    pub fn insert(&mut self, region_id: impl Into<String>, values: Vec<f64>) {
        self.entries.insert(region_id.into(), values);
    }

    pub fn set_default(&mut self, values: Vec<f64>) {
        self.default = Some(values);
    }

    /// Resolves the feature values for `region_id`: the exact entry, then
    /// the table default, then the literal [`NODE_FALLBACK`].
    pub fn resolve(&self, region_id: &str) -> (Cow<'_, [f64]>, FallbackTier) {
        if let Some(values) = self.entries.get(region_id) {
            return (Cow::Borrowed(values.as_slice()), FallbackTier::Exact);
        }
        if let Some(default) = &self.default {
            debug!(region = region_id, "node entry missing, using source default");
            return (Cow::Borrowed(default.as_slice()), FallbackTier::SourceDefault);
        }
        debug!(region = region_id, "node entry and default missing, using {NODE_FALLBACK}");
        (Cow::Owned(vec![NODE_FALLBACK]), FallbackTier::Hardcoded)
    }

    fn widths(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.values().chain(self.default.as_ref()).map(Vec::len)
    }
}

// In the file format the default lives inline under the "default" key, as a
// scalar or a vector, while region entries are vectors.
#[derive(Deserialize)]
#[serde(untagged)]
enum TableEntry {
    Vector(Vec<f64>),
    Scalar(f64),
}

impl TableEntry {
    fn into_values(self) -> Vec<f64> {
        match self {
            TableEntry::Vector(values) => values,
            TableEntry::Scalar(value) => vec![value],
        }
    }
}

impl<'de> Deserialize<'de> for NodeFeatureTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: FxHashMap<String, TableEntry> = FxHashMap::deserialize(deserializer)?;
        let mut table = NodeFeatureTable::default();
        for (key, entry) in raw {
            if key == "default" {
                table.default = Some(entry.into_values());
            } else {
                table.entries.insert(key, entry.into_values());
            }
        }
        Ok(table)
    }
}

/// (region-id, region-id) -> vector table with an optional default entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairFeatureTable {
    entries: FxHashMap<String, FxHashMap<String, Vec<f64>>>,
    default: Option<Vec<f64>>,
}

impl PairFeatureTable {
    pub fn insert(
        &mut self,
        id_a: impl Into<String>,
        id_b: impl Into<String>,
        values: Vec<f64>,
    ) {
        self.entries
            .entry(id_a.into())
            .or_default()
            .insert(id_b.into(), values);
    }

    pub fn set_default(&mut self, values: Vec<f64>) {
        self.default = Some(values);
    }

    /// Resolves the feature values for the ordered pair (id_a, id_b): the
    /// exact entry, then the table default, then the literal
    /// [`EDGE_FALLBACK`].
    pub fn resolve(&self, id_a: &str, id_b: &str) -> (Cow<'_, [f64]>, FallbackTier) {
        if let Some(values) = self.entries.get(id_a).and_then(|row| row.get(id_b)) {
            return (Cow::Borrowed(values.as_slice()), FallbackTier::Exact);
        }
        if let Some(default) = &self.default {
            debug!(from = id_a, to = id_b, "edge entry missing, using source default");
            return (Cow::Borrowed(default.as_slice()), FallbackTier::SourceDefault);
        }
        debug!(from = id_a, to = id_b, "edge entry and default missing, using {EDGE_FALLBACK}");
        (Cow::Owned(vec![EDGE_FALLBACK]), FallbackTier::Hardcoded)
    }

    fn widths(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .values()
            .flat_map(|row| row.values())
            .chain(self.default.as_ref())
            .map(Vec::len)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PairEntry {
    Row(FxHashMap<String, Vec<f64>>),
    Default(Vec<f64>),
    Scalar(f64),
}

impl<'de> Deserialize<'de> for PairFeatureTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: FxHashMap<String, PairEntry> = FxHashMap::deserialize(deserializer)?;
        let mut table = PairFeatureTable::default();
        for (key, entry) in raw {
            match (key.as_str(), entry) {
                ("default", PairEntry::Default(values)) => table.default = Some(values),
                ("default", PairEntry::Scalar(value)) => table.default = Some(vec![value]),
                ("default", PairEntry::Row(_)) => {
                    warn!("ignoring nested \"default\" entry in pair feature table");
                }
                (_, PairEntry::Row(row)) => {
                    table.entries.insert(key, row);
                }
                (_, _) => {
                    warn!(key, "ignoring non-nested pair feature entry");
                }
            }
        }
        Ok(table)
    }
}

/// Per-page node/edge feature tables from one external source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageFeatureTables {
    #[serde(default)]
    pub node_features: Option<NodeFeatureTable>,
    #[serde(default)]
    pub edge_features: Option<PairFeatureTable>,
}

/// One external feature source: page identifier -> per-page tables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ExternalFeatures {
    pages: FxHashMap<String, PageFeatureTables>,
}

impl ExternalFeatures {
    /// Loads a source from a JSON reader.
    ///
    /// Tables that mix feature widths are accepted with a warning; width
    /// consistency (including against the width-1 hardcoded fallbacks) is
    /// the configuration's contract, and the stacked feature matrix is
    /// invalid when it is broken.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let source: Self = serde_json::from_reader(reader)?;
        source.warn_on_mixed_widths();
        Ok(source)
    }

    /// The tables for `page_id`, if the source knows the page.
    pub fn page(&self, page_id: &str) -> Option<&PageFeatureTables> {
        let tables = self.pages.get(page_id);
        if tables.is_none() {
            warn!(page = page_id, "page not present in external feature source");
        }
        tables
    }

    pub fn insert_page(&mut self, page_id: impl Into<String>, tables: PageFeatureTables) {
        self.pages.insert(page_id.into(), tables);
    }

    fn warn_on_mixed_widths(&self) {
        for (page_id, tables) in &self.pages {
            if let Some(nodes) = &tables.node_features {
                let mut widths: Vec<usize> = nodes.widths().collect();
                widths.sort_unstable();
                widths.dedup();
                if widths.len() > 1 {
                    warn!(page = %page_id, ?widths, "node feature table mixes widths");
                }
            }
            if let Some(edges) = &tables.edge_features {
                let mut widths: Vec<usize> = edges.widths().collect();
                widths.sort_unstable();
                widths.dedup();
                if widths.len() > 1 {
                    warn!(page = %page_id, ?widths, "edge feature table mixes widths");
                }
            }
        }
    }
}
