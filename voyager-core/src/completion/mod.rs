//! Completion port: the single boundary between the orchestration core and
//! the chat-completion service.
//!
//! Every workflow component consumes this capability and nothing else.
//! Providers translate failures into the core taxonomy: `Transport` when the
//! call never completed, `Refusal` when the service declined, and `Decode`
//! when a reply did not match the requested schema.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{Result, VoyagerError};
use crate::tools::ToolSet;

pub mod providers;

pub use providers::OpenAiCompletionClient;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Request to a completion provider
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,

    /// Temperature for generation (0.0-2.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<usize>,
}

impl CompletionRequest {
    /// Create a request from a single user prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message {
                role: MessageRole::User,
                content: prompt.into(),
            }],
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create a request with a system prompt and a user prompt
    pub fn with_system_prompt(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            messages: vec![
                Message {
                    role: MessageRole::System,
                    content: system_prompt.into(),
                },
                Message {
                    role: MessageRole::User,
                    content: user_prompt.into(),
                },
            ],
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from a completion provider
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,

    /// Token usage information, if the provider reports it
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Provider identity, for diagnostics
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
}

/// The completion capability consumed by every workflow component.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// One round-trip text completion.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// One round-trip completion whose reply is decoded as JSON.
    ///
    /// `schema` is advisory: providers that support constrained output may
    /// forward it; the default implementation asks for plain text and parses
    /// the reply. A reply that is not valid JSON is a `Decode` error, always
    /// distinguishable from a `Transport` failure.
    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        _schema: Option<Value>,
    ) -> Result<Value> {
        let response = self.complete(request).await?;
        let payload = extract_json_payload(&response.content);
        serde_json::from_str(payload)
            .map_err(|e| VoyagerError::decode("structured reply is not valid JSON", e))
    }

    /// One completion with callable tools exposed to the model.
    ///
    /// The provider owns the tool-invocation loop, including whatever bound
    /// it places on the number of rounds. Components using this method do
    /// not observe individual tool calls.
    async fn complete_with_tools(
        &self,
        _request: &CompletionRequest,
        _tools: &ToolSet,
    ) -> Result<CompletionResponse> {
        Err(VoyagerError::Configuration(
            "this completion provider does not support tool calling".to_string(),
        ))
    }

    /// Provider identity
    fn model_info(&self) -> ModelInfo;
}

/// Decode a structured completion into a typed value.
///
/// Deserialization failure maps to `Decode`, keeping schema violations
/// distinguishable from transport problems.
pub async fn decode_structured<T: DeserializeOwned>(
    client: &dyn CompletionClient,
    request: &CompletionRequest,
    schema: Option<Value>,
) -> Result<T> {
    let value = client.complete_structured(request, schema).await?;
    serde_json::from_value(value)
        .map_err(|e| VoyagerError::decode("structured reply did not match the expected shape", e))
}

/// Strip markdown code fences that models habitually wrap around JSON.
pub(crate) fn extract_json_payload(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}
