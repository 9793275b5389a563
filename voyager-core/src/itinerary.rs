//! Structured itinerary planning with deterministic travel tools
//!
//! One tool-equipped completion that must come back as a typed plan: the
//! model may consult the attraction, budget, gap, and calendar tools while
//! composing, and the reply is decoded against the `ItineraryPlan` shape. A
//! reply that does not parse is a `Decode` error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::completion::{CompletionClient, CompletionRequest, extract_json_payload};
use crate::error::{Result, VoyagerError};
use crate::tools::{ToolSet, travel_toolset};
use crate::trip::TripContext;

/// One day of the planned schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: String,
    pub theme: String,
    pub activities: Vec<String>,
    pub dining_recommendation: String,
}

/// The decoded trip plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryPlan {
    pub destination_overview: String,
    pub highlights: Vec<String>,
    pub daily_schedule: Vec<ItineraryDay>,
    pub booking_reminders: Vec<String>,
    pub estimated_budget: f64,
}

/// Plans a full itinerary in one structured, tool-equipped completion.
pub struct ItineraryPlanner {
    client: Arc<dyn CompletionClient>,
    tools: ToolSet,
}

impl ItineraryPlanner {
    /// Equip the planner with the deterministic travel tools.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            tools: travel_toolset(),
        }
    }

    /// Use a custom tool set.
    pub fn with_tools(client: Arc<dyn CompletionClient>, tools: ToolSet) -> Self {
        Self { client, tools }
    }

    /// Produce a typed plan for the trip.
    pub async fn plan(&self, context: &TripContext) -> Result<ItineraryPlan> {
        let schema = json!({
            "type": "object",
            "properties": {
                "destination_overview": { "type": "string" },
                "highlights": { "type": "array", "items": { "type": "string" } },
                "daily_schedule": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "day": { "type": "string" },
                            "theme": { "type": "string" },
                            "activities": { "type": "array", "items": { "type": "string" } },
                            "dining_recommendation": { "type": "string" }
                        },
                        "required": ["day", "theme", "activities", "dining_recommendation"]
                    }
                },
                "booking_reminders": { "type": "array", "items": { "type": "string" } },
                "estimated_budget": { "type": "number" }
            },
            "required": [
                "destination_overview", "highlights", "daily_schedule",
                "booking_reminders", "estimated_budget"
            ]
        });

        let request = CompletionRequest::with_system_prompt(
            format!(
                "You are VoyagerMate creating a personalised travel itinerary. \
                 Use the tool outputs when helpful.\n\
                 Return the plan using this JSON schema:\n{schema}"
            ),
            format!("Plan a journey based on these preferences:\n{}", context.render()),
        );

        let response = self.client.complete_with_tools(&request, &self.tools).await?;
        info!("itinerary reply received, decoding plan");

        serde_json::from_str(extract_json_payload(&response.content))
            .map_err(|e| VoyagerError::decode("itinerary reply did not match the plan shape", e))
    }
}
