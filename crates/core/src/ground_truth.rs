//! Ground-truth same-article relations.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::page::{ArticleRef, TextRegion};

/// Relation label marking two regions as belonging to the same article.
pub const SAME_ARTICLE: usize = 1;

/// Builds the dense same-article relation list over `regions`.
///
/// Ambiguous (multi-id) assignments deterministically take their first id
/// and are counted. Regions without any assignment compare equal to each
/// other. The relation list covers every ordered pair including i = j, so it
/// is reflexive and symmetric by construction, and independent of the
/// interaction topology. Returns the relations and the ambiguous count.
pub fn same_article_relations(
    regions: &[TextRegion],
    articles: &FxHashMap<String, ArticleRef>,
) -> (Vec<[usize; 3]>, usize) {
    let mut ambiguous = 0usize;
    let effective: Vec<Option<&str>> = regions
        .iter()
        .map(|region| match articles.get(&region.id) {
            None => None,
            Some(ArticleRef::Single(id)) => Some(id.as_str()),
            Some(ArticleRef::Multiple(ids)) => {
                if ids.len() > 1 {
                    ambiguous += 1;
                    warn!(region = %region.id, ids = ?ids, "multiple article ids, assigning the first");
                }
                ids.first().map(String::as_str)
            }
        })
        .collect();
    debug!(ambiguous, total = regions.len(), "resolved article assignments");

    let mut relations = Vec::new();
    for (i, a) in effective.iter().enumerate() {
        for (j, b) in effective.iter().enumerate() {
            if a == b {
                relations.push([SAME_ARTICLE, i, j]);
            }
        }
    }
    (relations, ambiguous)
}
