//! OpenAI-compatible backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use flatfinder_core::{
    defaults, AttributeMapping, EmbeddingBackend, Error, IntentExtractor, Result, Vector,
};

use super::error::{to_flatfinder_error, OpenAIErrorCode};
use super::types::*;

/// Default OpenAI API endpoint.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Name of the function tool the model calls with extracted preferences.
pub const SEARCH_TOOL_NAME: &str = "search_apartments";

pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts apartment \
     search preferences from a user's request. Call search_apartments with only the preferences \
     the user actually stated.";

/// Configuration for OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for embeddings.
    pub embed_model: String,
    /// Model to use for intent extraction.
    pub gen_model: String,
    /// Expected embedding dimension.
    pub embed_dimension: usize,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_URL.to_string(),
            api_key: None,
            embed_model: defaults::EMBED_MODEL.to_string(),
            gen_model: defaults::GEN_MODEL.to_string(),
            embed_dimension: defaults::EMBED_DIMENSION,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAIConfig {
    /// Read `OPENAI_*` variables, falling back to defaults when unset.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            embed_model: std::env::var("OPENAI_EMBED_MODEL")
                .unwrap_or_else(|_| defaults::EMBED_MODEL.to_string()),
            gen_model: std::env::var("OPENAI_GEN_MODEL")
                .unwrap_or_else(|_| defaults::GEN_MODEL.to_string()),
            embed_dimension: defaults::env_parse("OPENAI_EMBED_DIM", defaults::EMBED_DIMENSION)?,
            timeout_seconds: defaults::env_parse("OPENAI_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

/// JSON-schema parameters of the `search_apartments` tool.
///
/// Covers the structured fields the store can filter on plus the common
/// free-form preferences used for semantic matching and negation checks.
pub fn search_tool_parameters() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "location": {"type": "string", "description": "City or district"},
            "rooms": {"type": "integer", "description": "Number of rooms"},
            "beds": {"type": "integer", "description": "Number of beds"},
            "area": {"type": "number", "description": "Area in square meters"},
            "floor": {"type": "integer", "description": "Floor number"},
            "min_price": {"type": "number", "description": "Minimum price in USD"},
            "max_price": {"type": "number", "description": "Maximum price in USD"},
            "has_wifi": {"type": "boolean", "description": "Wi-Fi needed"},
            "has_parking": {"type": "boolean", "description": "Parking needed"},
            "has_kitchen": {"type": "boolean", "description": "Kitchen needed"},
            "has_pool": {"type": "boolean", "description": "Pool needed"},
            "allows_pets": {"type": "boolean", "description": "Pets must be allowed"},
            "allows_children": {"type": "boolean", "description": "Children must be allowed"},
            "allows_smoking": {"type": "boolean", "description": "Smoking must be allowed"},
            "allows_parties": {"type": "boolean", "description": "Parties must be allowed"}
        }
    })
}

fn search_tool() -> ToolDefinition {
    ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Search for apartments based on user preferences".to_string(),
            parameters: search_tool_parameters(),
        },
    }
}

/// OpenAI-compatible embedding and intent-extraction backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            base_url = %config.base_url,
            embed_model = %config.embed_model,
            gen_model = %config.gen_model,
            "Initializing OpenAI backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a POST request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }
}

/// Turn a non-success response into an error, keeping the API's message.
async fn error_from_response(
    response: reqwest::Response,
    service_error: fn(String) -> Error,
) -> Error {
    let status = response.status();
    let body: OpenAIErrorResponse = response.json().await.unwrap_or_default();
    let code = OpenAIErrorCode::from_response(status.as_u16(), &body.error.error_type);
    to_flatfinder_error(
        code,
        &format!("OpenAI returned {}: {}", status, body.error.message),
        service_error,
    )
}

#[async_trait]
impl EmbeddingBackend for OpenAIBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let request = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: texts.to_vec(),
            encoding_format: Some("float".to_string()),
        };

        let response = self
            .build_request("/embeddings")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, Error::Embedding).await);
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        // Sort by index to ensure correct ordering
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        let vectors: Vec<Vector> = data
            .into_iter()
            .map(|d| Vector::from(d.embedding))
            .collect();

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "embed",
            model = %self.config.embed_model,
            result_count = vectors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generated embeddings"
        );
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.embed_dimension
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }
}

#[async_trait]
impl IntentExtractor for OpenAIBackend {
    async fn extract(&self, text: &str) -> Result<Option<AttributeMapping>> {
        let start = Instant::now();
        let request = ChatCompletionRequest {
            model: self.config.gen_model.clone(),
            messages: vec![
                ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
                ChatMessage::user(text),
            ],
            tools: vec![search_tool()],
            tool_choice: Some("auto".to_string()),
            temperature: Some(0.0),
        };

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, Error::Inference).await);
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let call = result
            .choices
            .first()
            .and_then(|c| c.message.find_call(SEARCH_TOOL_NAME));

        let Some(call) = call else {
            debug!(
                subsystem = "inference",
                component = "openai",
                op = "extract",
                outcome = "no_tool_call",
                duration_ms = start.elapsed().as_millis() as u64,
                "Model did not call the search tool"
            );
            return Ok(None);
        };

        let arguments = if call.arguments.trim().is_empty() {
            "{}"
        } else {
            call.arguments.as_str()
        };

        match AttributeMapping::from_json_str(arguments) {
            Ok(mapping) => {
                debug!(
                    subsystem = "inference",
                    component = "openai",
                    op = "extract",
                    outcome = "extracted",
                    result_count = mapping.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Extracted search intent"
                );
                Ok(Some(mapping))
            }
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "openai",
                    op = "extract",
                    error = %e,
                    "Unparseable tool arguments"
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OpenAIConfig::default();
        assert_eq!(config.base_url, DEFAULT_OPENAI_URL);
        assert_eq!(config.embed_model, "text-embedding-3-small");
        assert_eq!(config.gen_model, "gpt-4o-mini");
        assert_eq!(config.embed_dimension, 1536);
        assert_eq!(config.timeout_seconds, 60);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_tool_schema_lists_known_fields() {
        let params = search_tool_parameters();
        let props = params["properties"].as_object().unwrap();
        for key in [
            "location", "rooms", "beds", "area", "floor", "min_price", "max_price", "has_wifi",
            "has_parking", "has_kitchen", "allows_pets",
        ] {
            assert!(props.contains_key(key), "missing {}", key);
        }
        assert_eq!(search_tool().function.name, SEARCH_TOOL_NAME);
    }

    #[test]
    fn test_build_request_trims_trailing_slash() {
        let backend = OpenAIBackend::new(OpenAIConfig {
            base_url: "http://localhost:9999/v1/".to_string(),
            ..OpenAIConfig::default()
        })
        .unwrap();
        let req = backend.build_request("/embeddings").build().unwrap();
        assert_eq!(req.url().as_str(), "http://localhost:9999/v1/embeddings");
    }
}
