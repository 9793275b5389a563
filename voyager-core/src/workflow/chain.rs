//! Sequential chain: four fixed planning steps in fixed order
//!
//! Each step is one completion call over the rendered trip context. Steps do
//! not feed into each other; the chain's value is the fixed ordering and the
//! fail-fast contract. Any step failure propagates unmodified and no partial
//! summary is returned.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::completion::{CompletionClient, CompletionRequest};
use crate::error::Result;
use crate::trip::TripContext;

const STEP_SYSTEM_PROMPT: &str =
    "You are orchestrating a travel-planning workflow. Complete the requested step succinctly.";

const DISCOVERY: &str =
    "Summarise the traveller's key goals, constraints, and any clarifications needed.";
const DRAFT: &str =
    "Propose a three-part travel storyline (arrival, middle, farewell) with bullet itineraries.";
const RISK_REVIEW: &str = "List major risks (weather, visas, health, budget) and mitigations.";
const NEXT_STEPS: &str = "Provide a concise next-step checklist for the traveller and the agent.";

/// Output of one sequential chain run. Write-once, fixed shape.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub discovery: String,
    pub itinerary_draft: String,
    pub risk_review: String,
    pub next_steps: String,
}

/// Runs the four-step sequential planning chain.
pub struct ItineraryChain {
    client: Arc<dyn CompletionClient>,
}

impl ItineraryChain {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Execute all four steps in order. Fail-fast: the first step error
    /// aborts the run.
    pub async fn run(&self, context: &TripContext) -> Result<WorkflowSummary> {
        let rendered = context.render();

        let discovery = self.step(DISCOVERY, &rendered).await?;
        let itinerary_draft = self.step(DRAFT, &rendered).await?;
        let risk_review = self.step(RISK_REVIEW, &rendered).await?;
        let next_steps = self.step(NEXT_STEPS, &rendered).await?;

        Ok(WorkflowSummary {
            discovery,
            itinerary_draft,
            risk_review,
            next_steps,
        })
    }

    async fn step(&self, instruction: &str, context: &str) -> Result<String> {
        debug!(instruction, "running chain step");
        let request = CompletionRequest::with_system_prompt(
            STEP_SYSTEM_PROMPT,
            format!("{instruction}\n---\n{context}"),
        );
        Ok(self.client.complete(&request).await?.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionResponse, ModelInfo};
    use crate::error::VoyagerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies with the first line of each instruction, tagged by call order.
    struct ScriptedClient {
        calls: AtomicUsize,
        fail_at: Option<usize>,
    }

    impl ScriptedClient {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_at: None,
            }
        }

        fn failing_at(call: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_at: Some(call),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_at == Some(n) {
                return Err(VoyagerError::Transport("connection reset".to_string()));
            }
            let instruction = request.messages[1]
                .content
                .split("\n---\n")
                .next()
                .unwrap()
                .to_string();
            Ok(CompletionResponse {
                content: format!("[{n}] {instruction}"),
                usage: None,
            })
        }

        fn model_info(&self) -> ModelInfo {
            ModelInfo {
                provider: "scripted".to_string(),
                model_name: "test".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn fields_follow_instruction_order() {
        let chain = ItineraryChain::new(Arc::new(ScriptedClient::new()));
        let summary = chain.run(&TripContext::new()).await.unwrap();

        assert!(summary.discovery.starts_with("[1]"));
        assert!(summary.discovery.contains("key goals"));
        assert!(summary.itinerary_draft.starts_with("[2]"));
        assert!(summary.itinerary_draft.contains("storyline"));
        assert!(summary.risk_review.starts_with("[3]"));
        assert!(summary.risk_review.contains("risks"));
        assert!(summary.next_steps.starts_with("[4]"));
        assert!(summary.next_steps.contains("checklist"));
    }

    #[tokio::test]
    async fn step_failure_aborts_without_partial_summary() {
        let client = Arc::new(ScriptedClient::failing_at(3));
        let chain = ItineraryChain::new(client.clone());

        let err = chain.run(&TripContext::new()).await.unwrap_err();
        assert!(matches!(err, VoyagerError::Transport(_)));
        // Fail-fast: step 4 never ran.
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn identical_runs_yield_identical_summaries() {
        let chain_a = ItineraryChain::new(Arc::new(ScriptedClient::new()));
        let chain_b = ItineraryChain::new(Arc::new(ScriptedClient::new()));
        let context = TripContext::new().traveller("Kai");

        let a = chain_a.run(&context).await.unwrap();
        let b = chain_b.run(&context).await.unwrap();

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
