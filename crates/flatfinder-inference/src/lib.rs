//! # flatfinder-inference
//!
//! Oracle backends for flatfinder.
//!
//! - [`openai`]: OpenAI-compatible HTTP backend implementing both
//!   [`EmbeddingBackend`](flatfinder_core::EmbeddingBackend) and
//!   [`IntentExtractor`](flatfinder_core::IntentExtractor)
//! - [`mock`]: deterministic in-process backends for tests (feature `mock`)

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};
