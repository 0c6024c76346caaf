//! # flatfinder-core
//!
//! Core types, traits, and filter semantics for flatfinder.
//!
//! This crate provides the attribute model shared by every other crate:
//! the structured/extra classifier, query-text synthesis for embeddings,
//! the negation pattern table, and the collaborator traits (store,
//! embedding oracle, intent oracle).

pub mod attributes;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod negation;
pub mod query_text;
pub mod traits;

// Re-export commonly used types at crate root
pub use attributes::{
    classify, AttributeMapping, AttributeValue, ClassifiedFilters, KnownField, StructuredField,
};
pub use error::{Error, Result};
pub use filter::ListingFilter;
pub use models::{ListingId, ListingRecord, ScoredCandidate};
pub use negation::{Contradiction, NegationPatternTable, DEFAULT_NEGATION_PATTERNS};
pub use query_text::synthesize_query_text;
pub use traits::*;

/// Fixed-length embedding vector (shared with pgvector).
pub use pgvector::Vector;
