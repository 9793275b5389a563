//! Multi-agent delegate: one tool-equipped lead call
//!
//! The lead completion is given the three expert tools and decides on its
//! own when and how often to consult each one. This component imposes no
//! loop of its own; the round bound and the tool-error convention both live
//! in the completion port.

use std::sync::Arc;

use tracing::info;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::error::Result;
use crate::tools::{ToolSet, expert_toolset};

const LEAD_SYSTEM_PROMPT: &str = "You are the Lead Travel Orchestrator. \
     Your goal is to create a comprehensive travel plan by consulting your team of experts. \
     Break down the user's request and call the appropriate expert tools \
     (Logistics, Accommodation, Activity) to get details. \
     Synthesize their responses into a final cohesive itinerary.";

/// Lead agent that plans trips by delegating to expert sub-agents.
pub struct MultiAgentDelegate {
    client: Arc<dyn CompletionClient>,
    experts: ToolSet,
}

impl MultiAgentDelegate {
    /// The experts answer through the same client as the lead call.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        let experts = expert_toolset(client.clone());
        Self { client, experts }
    }

    /// Use a custom expert tool set.
    pub fn with_experts(client: Arc<dyn CompletionClient>, experts: ToolSet) -> Self {
        Self { client, experts }
    }

    /// One tool-equipped completion; delegation is entirely the model's
    /// choice.
    pub async fn plan_trip(&self, user_request: &str) -> Result<String> {
        info!(experts = self.experts.len(), "delegating trip plan to lead agent");
        let request = CompletionRequest::with_system_prompt(LEAD_SYSTEM_PROMPT, user_request);
        let response = self.client.complete_with_tools(&request, &self.experts).await?;
        Ok(response.content)
    }
}
