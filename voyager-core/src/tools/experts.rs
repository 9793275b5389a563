//! Expert delegates for the multi-agent planner
//!
//! Each expert is a callable tool whose implementation is a fresh completion
//! call with its own persona. The top-level orchestrating call decides when
//! and how often to consult each one.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{ExpertTool, ToolSet};
use crate::completion::{CompletionClient, CompletionRequest};
use crate::error::{Result, VoyagerError};

/// A persona-prompted expert backed by its own completion call.
pub struct ExpertAgent {
    name: String,
    description: String,
    persona: String,
    client: Arc<dyn CompletionClient>,
}

impl ExpertAgent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        persona: impl Into<String>,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            persona: persona.into(),
            client,
        }
    }

    /// Flights, trains, and transfer logistics.
    pub fn logistics(client: Arc<dyn CompletionClient>) -> Self {
        Self::new(
            "ask_logistics_expert",
            "Consult the travel logistics expert for flights, trains, and transfers",
            "You are a Travel Logistics Expert. Focus on routes, times, transit modes, \
             and practical transfer details. Be precise.",
            client,
        )
    }

    /// Hotels, neighbourhoods, lodging styles.
    pub fn accommodation(client: Arc<dyn CompletionClient>) -> Self {
        Self::new(
            "ask_accommodation_expert",
            "Consult the accommodation expert for hotels, areas to stay, and lodging advice",
            "You are a Hospitality & Accommodation Expert. Suggest specific neighbourhoods \
             and hotel types (boutique, luxury, budget) matching the traveller's style.",
            client,
        )
    }

    /// Culture, dining, local experiences.
    pub fn activity(client: Arc<dyn CompletionClient>) -> Self {
        Self::new(
            "ask_activity_expert",
            "Consult the local activity expert for things to do, culture, and dining",
            "You are a Local Experience Guide. Focus on cultural immersion, dining, \
             hidden gems, and must-see attractions.",
            client,
        )
    }
}

#[derive(Deserialize)]
struct ExpertQuery {
    query: String,
}

#[async_trait]
impl ExpertTool for ExpertAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The specific question or request for this expert" }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: ExpertQuery = serde_json::from_value(args)
            .map_err(|e| VoyagerError::decode(format!("invalid arguments for '{}'", self.name), e))?;

        let request = CompletionRequest::with_system_prompt(&self.persona, &args.query);
        let response = self.client.complete(&request).await?;
        Ok(json!(response.content))
    }
}

/// The three expert delegates used by the multi-agent planner.
pub fn expert_toolset(client: Arc<dyn CompletionClient>) -> ToolSet {
    ToolSet::new()
        .with_tool(ExpertAgent::logistics(client.clone()))
        .with_tool(ExpertAgent::accommodation(client.clone()))
        .with_tool(ExpertAgent::activity(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionResponse, ModelInfo};

    struct RecordingClient {
        system_prompts: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
            self.system_prompts
                .lock()
                .unwrap()
                .push(request.messages[0].content.clone());
            Ok(CompletionResponse {
                content: format!("expert answer to: {}", request.messages[1].content),
                usage: None,
            })
        }

        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                provider: "recording".to_string(),
                model_name: "test".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn each_expert_uses_its_own_persona() {
        let client = Arc::new(RecordingClient {
            system_prompts: std::sync::Mutex::new(Vec::new()),
        });

        let logistics = ExpertAgent::logistics(client.clone());
        let activity = ExpertAgent::activity(client.clone());

        logistics
            .call(json!({"query": "fastest Osaka airport transfer"}))
            .await
            .unwrap();
        activity.call(json!({"query": "ramen spots"})).await.unwrap();

        let prompts = client.system_prompts.lock().unwrap();
        assert!(prompts[0].contains("Logistics Expert"));
        assert!(prompts[1].contains("Local Experience Guide"));
    }

    #[tokio::test]
    async fn expert_reply_is_the_completion_content() {
        let client = Arc::new(RecordingClient {
            system_prompts: std::sync::Mutex::new(Vec::new()),
        });

        let result = ExpertAgent::accommodation(client)
            .call(json!({"query": "where to stay in Namba"}))
            .await
            .unwrap();

        assert_eq!(result, json!("expert answer to: where to stay in Namba"));
    }

    #[tokio::test]
    async fn expert_toolset_has_stable_names() {
        let client = Arc::new(RecordingClient {
            system_prompts: std::sync::Mutex::new(Vec::new()),
        });
        let tools = expert_toolset(client);
        assert_eq!(
            tools.names(),
            vec![
                "ask_logistics_expert",
                "ask_accommodation_expert",
                "ask_activity_expert"
            ]
        );
    }
}
