//! OpenAI-compatible completion provider
//!
//! Speaks the `/chat/completions` wire format, which covers api.openai.com,
//! Azure OpenAI deployments, and local gateways exposing the same shape.
//! Owns the tool-invocation loop for `complete_with_tools`, bounded to a
//! fixed number of rounds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::completion::{
    CompletionClient, CompletionRequest, CompletionResponse, Message, MessageRole, ModelInfo,
    TokenUsage,
};
use crate::config::ProviderConfig;
use crate::error::{Result, VoyagerError};
use crate::tools::ToolSet;

/// Ceiling on model-driven tool rounds in a single `complete_with_tools`
/// call. The original system inherited the service's unbounded loop; here the
/// bound is explicit.
const MAX_TOOL_ROUNDS: usize = 8;

/// OpenAI-compatible chat completion client.
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    default_temperature: f32,
    default_max_tokens: usize,
}

impl OpenAiCompletionClient {
    /// Create a new client.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            default_temperature: 0.7,
            default_max_tokens: 1000,
        }
    }

    /// Create with a custom base URL (Azure OpenAI or compatible APIs).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(api_key, model)
        }
    }

    /// Build a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if no API key is present in the config or the
    /// `VOYAGER_PROVIDER_API_KEY` environment variable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("VOYAGER_PROVIDER_API_KEY").ok())
            .ok_or_else(|| {
                VoyagerError::Configuration(
                    "no API key: set provider.api_key or VOYAGER_PROVIDER_API_KEY".to_string(),
                )
            })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            default_temperature: config.temperature,
            default_max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_chat(&self, request: &WireRequest) -> Result<WireResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| VoyagerError::Transport(format!("failed to reach {}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VoyagerError::Transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<WireError>(&body) {
                let kind = error.error.error_type.unwrap_or_else(|| status.to_string());
                if kind == "content_filter" {
                    return Err(VoyagerError::Refusal(error.error.message));
                }
                return Err(VoyagerError::Transport(format!(
                    "API error ({}): {}",
                    kind, error.error.message
                )));
            }
            return Err(VoyagerError::Transport(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| VoyagerError::decode("malformed completion response", e))
    }

    fn wire_request(&self, request: &CompletionRequest, tools: Option<&ToolSet>) -> WireRequest {
        WireRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: Some(request.temperature.unwrap_or(self.default_temperature)),
            max_tokens: Some(request.max_tokens.unwrap_or(self.default_max_tokens)),
            tools: tools.map(|set| {
                set.iter()
                    .map(|tool| WireTool {
                        tool_type: "function".to_string(),
                        function: WireFunction {
                            name: tool.name().to_string(),
                            description: tool.description().to_string(),
                            parameters: tool.parameters(),
                        },
                    })
                    .collect()
            }),
        }
    }
}

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        };
        WireMessage {
            role: role.to_string(),
            content: Some(message.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunction,
}

#[derive(Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize, Deserialize, Clone)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Serialize, Deserialize, Clone)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

fn usage_from_wire(usage: Option<WireUsage>) -> Option<TokenUsage> {
    usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    })
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let wire = self.wire_request(request, None);
        let response = self.post_chat(&wire).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VoyagerError::Decode("completion response had no choices".to_string()))?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(VoyagerError::Refusal(
                "reply was withheld by the service's content filter".to_string(),
            ));
        }

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: usage_from_wire(response.usage),
        })
    }

    async fn complete_with_tools(
        &self,
        request: &CompletionRequest,
        tools: &ToolSet,
    ) -> Result<CompletionResponse> {
        let mut wire = self.wire_request(request, Some(tools));

        for round in 0..MAX_TOOL_ROUNDS {
            let response = self.post_chat(&wire).await?;
            let choice = response.choices.into_iter().next().ok_or_else(|| {
                VoyagerError::Decode("completion response had no choices".to_string())
            })?;

            if choice.finish_reason.as_deref() == Some("content_filter") {
                return Err(VoyagerError::Refusal(
                    "reply was withheld by the service's content filter".to_string(),
                ));
            }

            let Some(tool_calls) = choice.message.tool_calls.filter(|c| !c.is_empty()) else {
                return Ok(CompletionResponse {
                    content: choice.message.content.unwrap_or_default(),
                    usage: usage_from_wire(response.usage),
                });
            };

            debug!(round, calls = tool_calls.len(), "dispatching tool calls");

            wire.messages.push(WireMessage {
                role: "assistant".to_string(),
                content: choice.message.content,
                tool_calls: Some(tool_calls.clone()),
                tool_call_id: None,
            });

            for call in tool_calls {
                let args: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or(Value::Null);

                // A failing tool is reported back to the model, not to the
                // caller; the model decides how to proceed.
                let payload = match tools.dispatch(&call.function.name, args).await {
                    Ok(value) => value,
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };

                wire.messages.push(WireMessage {
                    role: "tool".to_string(),
                    content: Some(payload.to_string()),
                    tool_calls: None,
                    tool_call_id: Some(call.id),
                });
            }
        }

        Err(VoyagerError::Refusal(format!(
            "model was still requesting tools after {} rounds",
            MAX_TOOL_ROUNDS
        )))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "openai-compatible".to_string(),
            model_name: self.model.clone(),
        }
    }
}
