//! Negation veto over ranked candidates.

use tracing::debug;

use flatfinder_core::{AttributeMapping, NegationPatternTable, ScoredCandidate};

/// Drop candidates whose description contradicts an extra attribute the
/// caller set to `true`.
///
/// This is a hard veto: surviving candidates keep their scores and relative
/// order.
pub fn apply_negation_veto(
    ranked: Vec<ScoredCandidate>,
    mapping: &AttributeMapping,
    table: &NegationPatternTable,
) -> Vec<ScoredCandidate> {
    ranked
        .into_iter()
        .filter(|candidate| {
            match table.find_contradiction(&candidate.listing.description, mapping) {
                Some(hit) => {
                    debug!(
                        subsystem = "search",
                        component = "negation",
                        listing_id = candidate.listing.id,
                        attribute = hit.attribute,
                        pattern = hit.pattern,
                        "Vetoed candidate"
                    );
                    false
                }
                None => true,
            }
        })
        .collect()
}
