//! Parallel fan-out: four fixed research tracks with a join barrier
//!
//! All four tracks run concurrently over the same rendered context. Summary
//! fields are assigned positionally by instruction, never by completion
//! order. The first track failure cancels the remaining tracks and fails the
//! whole run; no partial summary is ever produced.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::completion::{CompletionClient, CompletionRequest};
use crate::error::Result;
use crate::trip::TripContext;

const TRACK_SYSTEM_PROMPT: &str = "You are VoyagerMate running concurrent research tracks. \
     Respond with concise bullet lists focused on actionable travel guidance.";

const LODGING: &str =
    "Produce 3 lodging strategies (boutique, mid-range, splurge) including neighbourhood pros/cons.";
const DINING: &str =
    "Highlight dining hits: breakfast staples, lunch-on-the-go, evening tasting experiences.";
const LOGISTICS: &str =
    "Summarise transport + budget watchpoints (local transit, day-trip transfers, passes).";
const CULTURE: &str =
    "Suggest cultural immersion moves (festivals, community tours, mindful etiquette reminders).";

/// Output of one fan-out run, assembled only after every track has joined.
#[derive(Debug, Clone, Serialize)]
pub struct ParallelSummary {
    pub lodging_insights: String,
    pub dining_highlights: String,
    pub logistics_advisory: String,
    pub cultural_moments: String,
    /// Wall-clock milliseconds from dispatch to the join barrier
    pub total_latency_ms: u64,
}

/// Runs the four concurrent research tracks.
pub struct ParallelResearch {
    client: Arc<dyn CompletionClient>,
}

impl ParallelResearch {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Dispatch all four tracks concurrently and join.
    ///
    /// All-or-nothing: the first failing track drops its siblings and the
    /// error propagates unmodified.
    pub async fn run(&self, context: &TripContext) -> Result<ParallelSummary> {
        let rendered = context.render();
        let started = Instant::now();

        let (lodging_insights, dining_highlights, logistics_advisory, cultural_moments) = tokio::try_join!(
            self.track(LODGING, &rendered),
            self.track(DINING, &rendered),
            self.track(LOGISTICS, &rendered),
            self.track(CULTURE, &rendered),
        )?;

        let total_latency_ms = started.elapsed().as_millis() as u64;
        info!(total_latency_ms, "parallel research joined");

        Ok(ParallelSummary {
            lodging_insights,
            dining_highlights,
            logistics_advisory,
            cultural_moments,
            total_latency_ms,
        })
    }

    async fn track(&self, instruction: &str, context: &str) -> Result<String> {
        debug!(instruction, "dispatching research track");
        let request = CompletionRequest::with_system_prompt(
            TRACK_SYSTEM_PROMPT,
            format!("{instruction}\n---\n{context}"),
        );
        Ok(self.client.complete(&request).await?.content)
    }
}
