//! Mock backends for deterministic testing.
//!
//! ```rust,ignore
//! use flatfinder_inference::mock::MockEmbeddingBackend;
//!
//! let backend = MockEmbeddingBackend::new(3).with_vector("2 rooms", vec![1.0, 0.0, 0.0]);
//! let vectors = backend.embed_texts(&["2 rooms".to_string()]).await?;
//! assert_eq!(vectors[0].as_slice(), &[1.0, 0.0, 0.0]);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use flatfinder_core::{AttributeMapping, EmbeddingBackend, Error, IntentExtractor, Result, Vector};

/// Embedding backend returning fixed vectors per text.
///
/// Texts without a registered vector get a deterministic character-hashed
/// unit vector of the configured dimension.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbeddingBackend {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            fail: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register the vector returned for `text`.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    /// Make every call fail with [`Error::Embedding`].
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Texts passed to `embed_texts`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Deterministic unit vector derived from the characters of `text`.
    pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0f32; dimension];
        if dimension == 0 {
            return vec;
        }
        for (i, c) in text.chars().enumerate() {
            vec[(c as usize + i) % dimension] += 0.1;
        }
        let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vec.iter_mut().for_each(|x| *x /= norm);
        }
        vec
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(texts.iter().cloned());

        if self.fail {
            return Err(Error::Embedding("Simulated embedding failure".to_string()));
        }

        Ok(texts
            .iter()
            .map(|t| {
                let v = self
                    .vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| Self::generate(t, self.dimension));
                Vector::from(v)
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

/// Intent extractor answering from a fixed text → mapping table.
///
/// Unknown text yields `Ok(None)`.
#[derive(Clone, Default)]
pub struct MockIntentExtractor {
    responses: HashMap<String, AttributeMapping>,
    fail: bool,
}

impl MockIntentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, text: impl Into<String>, mapping: AttributeMapping) -> Self {
        self.responses.insert(text.into(), mapping);
        self
    }

    /// Make every call fail with [`Error::Inference`].
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl IntentExtractor for MockIntentExtractor {
    async fn extract(&self, text: &str) -> Result<Option<AttributeMapping>> {
        if self.fail {
            return Err(Error::Inference("Simulated extraction failure".to_string()));
        }
        Ok(self.responses.get(text).cloned())
    }
}
