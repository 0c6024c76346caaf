//! OpenAI-compatible backend.
//!
//! Works with any endpoint speaking the OpenAI embeddings and
//! chat-completions APIs (OpenAI cloud, Azure OpenAI, Ollama, vLLM, ...).
//!
//! # Example
//!
//! ```rust,no_run
//! use flatfinder_core::{EmbeddingBackend, IntentExtractor};
//! use flatfinder_inference::openai::OpenAIBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAIBackend::from_env().unwrap();
//!
//!     let mapping = backend.extract("2-room flat in Lviv with wifi").await.unwrap();
//!     let vectors = backend
//!         .embed_texts(&["2 rooms, has wifi".to_string()])
//!         .await
//!         .unwrap();
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    OpenAIBackend, OpenAIConfig, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS, EXTRACTION_SYSTEM_PROMPT,
    SEARCH_TOOL_NAME,
};
pub use error::{to_flatfinder_error, OpenAIErrorCode};
pub use types::*;
