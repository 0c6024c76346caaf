//! # flatfinder-search
//!
//! Hybrid retrieval pipeline for flatfinder.
//!
//! This crate provides:
//! - Similarity re-ranking of store candidates against a query vector
//! - The negation veto pass over ranked candidates
//! - [`ApartmentSearchEngine`], which runs the whole pipeline
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use flatfinder_search::{user_message, ApartmentSearchEngine, AttributeMapping};
//!
//! let engine = ApartmentSearchEngine::new(Arc::new(repo), Arc::new(embedder));
//! let mapping = AttributeMapping::new().with("location", "Lviv").with("has_wifi", true);
//! let outcome = engine.search(Some(mapping)).await;
//! println!("{}", user_message(&outcome));
//! ```

pub mod negation;
pub mod pipeline;
pub mod ranking;

// Re-export core types
pub use flatfinder_core::*;

pub use negation::apply_negation_veto;
pub use pipeline::{user_message, ApartmentSearchEngine, SearchConfig, SearchOutcome};
pub use ranking::{rank_by_similarity, rank_unscored, Exclusion, ExclusionReason, RankedCandidates};
