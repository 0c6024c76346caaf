//! Similarity re-ranking of filtered candidates.
//!
//! Scores are raw dot products. Stored and query vectors are expected to be
//! normalized at ingestion, so no normalization happens here.

use std::collections::HashSet;
use std::fmt;

use tracing::{trace, warn};

use flatfinder_core::{ListingId, ListingRecord, ScoredCandidate};

/// Why a candidate was left out of scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    MissingVector,
    DimensionMismatch { expected: usize, actual: usize },
    NonFinite,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVector => write!(f, "missing embedding"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "embedding has {} dimensions, expected {}", actual, expected)
            }
            Self::NonFinite => write!(f, "embedding contains non-finite values"),
        }
    }
}

/// A candidate that could not be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusion {
    pub listing_id: ListingId,
    pub reason: ExclusionReason,
}

/// Output of a ranking pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedCandidates {
    /// Strictly non-increasing by score; ties keep store order.
    pub ranked: Vec<ScoredCandidate>,
    /// Candidates dropped for data-quality defects.
    pub excluded: Vec<Exclusion>,
}

impl RankedCandidates {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }
}

/// Dot product of two equal-length slices.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn check_vector(stored: Option<&[f32]>, expected: usize) -> Result<&[f32], ExclusionReason> {
    let v = stored.ok_or(ExclusionReason::MissingVector)?;
    if v.len() != expected {
        return Err(ExclusionReason::DimensionMismatch {
            expected,
            actual: v.len(),
        });
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(ExclusionReason::NonFinite);
    }
    Ok(v)
}

/// Score `candidates` against `query`, keep the best `top_k`.
///
/// Candidates with a missing, wrong-length or non-finite vector are reported
/// in [`RankedCandidates::excluded`] and the rest of the batch is still
/// ranked. A listing id seen twice keeps only its highest-scoring entry.
pub fn rank_by_similarity(
    candidates: Vec<ListingRecord>,
    query: &[f32],
    top_k: usize,
) -> RankedCandidates {
    let mut scored = Vec::with_capacity(candidates.len());
    let mut excluded = Vec::new();

    for listing in candidates {
        let checked = check_vector(listing.embedding_slice(), query.len()).and_then(|v| {
            let score = dot(v, query);
            if score.is_finite() {
                Ok(score)
            } else {
                Err(ExclusionReason::NonFinite)
            }
        });

        match checked {
            Ok(score) => {
                trace!(
                    subsystem = "search",
                    component = "ranking",
                    listing_id = listing.id,
                    score,
                    "Scored candidate"
                );
                scored.push(ScoredCandidate { listing, score });
            }
            Err(reason) => {
                warn!(
                    subsystem = "search",
                    component = "ranking",
                    listing_id = listing.id,
                    reason = %reason,
                    "Excluding candidate from similarity ranking"
                );
                excluded.push(Exclusion {
                    listing_id: listing.id,
                    reason,
                });
            }
        }
    }

    // sort_by is stable: equal scores keep store (price) order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    RankedCandidates {
        ranked: dedup_truncate(scored, top_k),
        excluded,
    }
}

/// Keep store order with a zero score, for queries with no text to embed.
pub fn rank_unscored(candidates: Vec<ListingRecord>, top_k: usize) -> RankedCandidates {
    let scored = candidates
        .into_iter()
        .map(|listing| ScoredCandidate {
            listing,
            score: 0.0,
        })
        .collect();

    RankedCandidates {
        ranked: dedup_truncate(scored, top_k),
        excluded: Vec::new(),
    }
}

fn dedup_truncate(scored: Vec<ScoredCandidate>, top_k: usize) -> Vec<ScoredCandidate> {
    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|c| seen.insert(c.listing.id))
        .take(top_k)
        .collect()
}
