//! Edge feature assembly.
//!
//! Fixed block order: separator flags (2), then the text-similarity block
//! when a similarity table is present, then one block per external source.

use crate::features::external::{PageFeatureTables, PairFeatureTable};
use crate::graph::PageStats;
use crate::page::{SeparatorRegion, TextRegion};
use crate::separators::SeparatorPolicy;

/// Everything the edge assembler needs besides the region pair.
pub struct EdgeFeatureInputs<'a> {
    pub separators: &'a [SeparatorRegion],
    pub policy: &'a dyn SeparatorPolicy,
    pub similarity: Option<&'a PairFeatureTable>,
    pub external: &'a [Option<&'a PageFeatureTables>],
}

/// Assembles the edge feature vector for the ordered pair (a, b).
///
/// A page without separator regions yields (0.0, 0.0) without invoking the
/// classifier.
pub fn edge_feature(
    a: &TextRegion,
    b: &TextRegion,
    inputs: &EdgeFeatureInputs<'_>,
    stats: &mut PageStats,
) -> Vec<f64> {
    let mut feature = Vec::with_capacity(super::EDGE_BASE_WIDTH);
    if inputs.separators.is_empty() {
        feature.extend_from_slice(&[0.0, 0.0]);
    } else {
        let flags = inputs.policy.classify(a, b, inputs.separators);
        feature.extend_from_slice(&flags.to_feature());
    }
    if let Some(table) = inputs.similarity {
        let (values, tier) = table.resolve(&a.id, &b.id);
        stats.similarity_fallbacks.record(tier);
        feature.extend_from_slice(&values);
    }
    for tables in inputs.external {
        if let Some(table) = tables.and_then(|t| t.edge_features.as_ref()) {
            let (values, tier) = table.resolve(&a.id, &b.id);
            stats.edge_fallbacks.record(tier);
            feature.extend_from_slice(&values);
        }
    }
    feature
}
