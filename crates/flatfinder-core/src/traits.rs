//! Core traits for flatfinder's external collaborators.
//!
//! The search pipeline only sees these interfaces; concrete backends are
//! injected by the caller, which keeps them pluggable and testable.

use async_trait::async_trait;

use crate::attributes::AttributeMapping;
use crate::error::Result;
use crate::filter::ListingFilter;
use crate::models::ListingRecord;

// =============================================================================
// STORE TRAITS
// =============================================================================

/// Structured listing store.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetch listings matching `filter`, ordered by ascending price and capped
    /// at `filter.limit()`.
    ///
    /// A store failure is returned as-is; implementations must not retry.
    async fn fetch_candidates(&self, filter: &ListingFilter) -> Result<Vec<ListingRecord>>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<crate::Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Oracle turning free-form user text into an attribute mapping.
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Extract search intent.
    ///
    /// `Ok(None)` means nothing actionable was found in the text; `Err` is a
    /// transport or backend failure.
    async fn extract(&self, text: &str) -> Result<Option<AttributeMapping>>;
}
