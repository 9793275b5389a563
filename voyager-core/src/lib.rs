//! # VoyagerMate Core - LLM Workflow Orchestration
//!
//! The orchestration core of VoyagerMate, a travel-planning assistant built
//! around a chat-completion service. Six composition patterns over one
//! completion port:
//! - Sequential chain: fixed planning steps, fail-fast
//! - Parallel fan-out: fixed concurrent research tracks with a join barrier
//! - Intent routing: classify into a closed set, respond with a persona
//! - Refinement: bounded generate/evaluate loop with feedback threading
//! - Orchestrator/workers: planner-driven dynamic fan-out plus synthesis
//! - Multi-agent delegation: a tool-equipped lead call consulting experts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voyager_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = VoyagerConfig::load()?;
//!     let client: Arc<dyn CompletionClient> =
//!         Arc::new(OpenAiCompletionClient::from_config(&config.provider)?);
//!
//!     let context = TripContext::new()
//!         .traveller("Kai")
//!         .route("Seattle", "Osaka")
//!         .budget("balanced")
//!         .interest("ramen");
//!
//!     let summary = ItineraryChain::new(client).run(&context).await?;
//!     println!("{}", summary.next_steps);
//!     Ok(())
//! }
//! ```
//!
//! ## Design
//!
//! Every component consumes the [`completion::CompletionClient`] port and
//! nothing else; collaborator seams (`DraftGenerator`, `TaskPlanner`,
//! `IntentClassifier`, ...) exist so each stage can be stubbed in tests.
//! Summaries are write-once: built after all their inputs are available,
//! never mutated afterwards, with no partial state on failure.

pub mod completion;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod tools;
pub mod trip;
pub mod workflow;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::completion::{
        CompletionClient, CompletionRequest, CompletionResponse, Message, MessageRole, ModelInfo,
        OpenAiCompletionClient, TokenUsage, decode_structured,
    };
    pub use crate::config::{ProviderConfig, VoyagerConfig};
    pub use crate::error::{Result, VoyagerError};
    pub use crate::itinerary::{ItineraryDay, ItineraryPlan, ItineraryPlanner};
    pub use crate::tools::{ExpertAgent, ExpertTool, ToolSet, expert_toolset, travel_toolset};
    pub use crate::trip::TripContext;
    pub use crate::workflow::{
        ItineraryChain, MultiAgentDelegate, OrchestratorWorkers, ParallelResearch,
        ParallelSummary, RefinementLoop, RefinementResult, RefinementRound, RoutingOutcome,
        VoyagerIntent, VoyagerRouter, WorkerFinding, WorkerSummary, WorkerTask, WorkflowSummary,
    };
}
