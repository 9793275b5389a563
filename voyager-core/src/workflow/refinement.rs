//! Generator/evaluator refinement loop
//!
//! Bounded at three rounds. Each round generates a draft (informed by the
//! previous round's feedback, if any) and evaluates it. Acceptance stops the
//! loop; exhaustion is a normal return whose last round carries
//! `accepted == false`, which the caller must check. A generation or
//! evaluation failure aborts the loop with no partial result.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::completion::{CompletionClient, CompletionRequest, decode_structured};
use crate::error::Result;
use crate::trip::TripContext;

const MAX_ITERATIONS: usize = 3;

/// One executed generate/evaluate cycle.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementRound {
    /// 1-based iteration number
    pub iteration: usize,
    pub draft: String,
    pub feedback: String,
    pub accepted: bool,
}

/// Final draft plus the append-only record of every executed round.
///
/// The last round's `accepted` flag distinguishes a met-quality finish from
/// round exhaustion.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementResult {
    pub final_draft: String,
    pub rounds: Vec<RefinementRound>,
}

impl RefinementResult {
    /// Whether the final draft passed review before the round cap.
    pub fn accepted(&self) -> bool {
        self.rounds.last().is_some_and(|round| round.accepted)
    }
}

/// Evaluation verdict for one draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationFeedback {
    pub accepted: bool,
    pub feedback: String,
}

/// Draft production seam, stubbed in tests.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// `reviewer_notes` is the previous round's feedback, absent on round 1.
    async fn generate(
        &self,
        brief: &str,
        context: &str,
        reviewer_notes: Option<&str>,
    ) -> Result<String>;
}

/// Draft review seam, stubbed in tests.
#[async_trait]
pub trait DraftEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        draft: &str,
        context: &str,
        iteration: usize,
    ) -> Result<EvaluationFeedback>;
}

/// The bounded refinement loop.
pub struct RefinementLoop {
    generator: Arc<dyn DraftGenerator>,
    evaluator: Arc<dyn DraftEvaluator>,
}

impl RefinementLoop {
    /// Wire both seams to the same completion client.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            generator: Arc::new(CompletionDraftGenerator {
                client: client.clone(),
            }),
            evaluator: Arc::new(CompletionDraftEvaluator { client }),
        }
    }

    /// Construct from explicit seams.
    pub fn with_stages(
        generator: Arc<dyn DraftGenerator>,
        evaluator: Arc<dyn DraftEvaluator>,
    ) -> Self {
        Self {
            generator,
            evaluator,
        }
    }

    /// Run the loop until acceptance or round exhaustion.
    pub async fn refine(&self, brief: &str, context: &TripContext) -> Result<RefinementResult> {
        let rendered = context.render();
        let mut rounds: Vec<RefinementRound> = Vec::new();
        let mut reviewer_notes: Option<String> = None;
        let mut final_draft = String::new();

        for iteration in 1..=MAX_ITERATIONS {
            let draft = self
                .generator
                .generate(brief, &rendered, reviewer_notes.as_deref())
                .await?;
            let verdict = self.evaluator.evaluate(&draft, &rendered, iteration).await?;

            debug!(iteration, accepted = verdict.accepted, "refinement round evaluated");

            final_draft = draft.clone();
            let accepted = verdict.accepted;
            rounds.push(RefinementRound {
                iteration,
                draft,
                feedback: verdict.feedback.clone(),
                accepted,
            });

            if accepted {
                break;
            }
            // Carried into the NEXT round's generator, never this one's.
            reviewer_notes = Some(verdict.feedback);
        }

        Ok(RefinementResult {
            final_draft,
            rounds,
        })
    }
}

struct CompletionDraftGenerator {
    client: Arc<dyn CompletionClient>,
}

#[async_trait]
impl DraftGenerator for CompletionDraftGenerator {
    async fn generate(
        &self,
        brief: &str,
        context: &str,
        reviewer_notes: Option<&str>,
    ) -> Result<String> {
        let mut payload = format!("Brief:\n{brief}\n\nContext:\n{context}");
        if let Some(notes) = reviewer_notes.filter(|n| !n.trim().is_empty()) {
            payload.push_str(&format!("\n\nReviewer notes to address:\n{notes}"));
        }

        let request = CompletionRequest::with_system_prompt(
            "You are VoyagerMate's senior itinerary copywriter.\n\
             Deliver two vivid paragraphs followed by a concise bullet list of booking moves.\n\
             If reviewer notes are provided, address them before expanding.",
            payload,
        );
        Ok(self.client.complete(&request).await?.content)
    }
}

struct CompletionDraftEvaluator {
    client: Arc<dyn CompletionClient>,
}

#[async_trait]
impl DraftEvaluator for CompletionDraftEvaluator {
    async fn evaluate(
        &self,
        draft: &str,
        context: &str,
        iteration: usize,
    ) -> Result<EvaluationFeedback> {
        let schema = json!({
            "type": "object",
            "properties": {
                "accepted": { "type": "boolean" },
                "feedback": { "type": "string" }
            },
            "required": ["accepted", "feedback"]
        });

        let request = CompletionRequest::with_system_prompt(
            format!(
                "You are VoyagerMate's editorial reviewer.\n\
                 Rate drafts for clarity, safety, and actionable guidance.\n\
                 Respond using this JSON schema:\n{schema}"
            ),
            format!("Iteration: {iteration}\nDraft:\n{draft}\n\nTraveller context:\n{context}"),
        );

        decode_structured(self.client.as_ref(), &request, Some(schema)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VoyagerError;
    use chrono::NaiveDate;

    /// Echoes the reviewer notes it received, so feedback threading is
    /// observable in the draft text.
    struct EchoGenerator;

    #[async_trait]
    impl DraftGenerator for EchoGenerator {
        async fn generate(
            &self,
            brief: &str,
            _context: &str,
            reviewer_notes: Option<&str>,
        ) -> Result<String> {
            Ok(match reviewer_notes {
                Some(notes) => format!("draft for '{brief}' addressing notes: {notes}"),
                None => format!("first draft for '{brief}'"),
            })
        }
    }

    /// Accepts only on a configured iteration.
    struct AcceptAt {
        iteration: usize,
    }

    #[async_trait]
    impl DraftEvaluator for AcceptAt {
        async fn evaluate(
            &self,
            _draft: &str,
            _context: &str,
            iteration: usize,
        ) -> Result<EvaluationFeedback> {
            if iteration == self.iteration {
                Ok(EvaluationFeedback {
                    accepted: true,
                    feedback: "reads well".to_string(),
                })
            } else {
                Ok(EvaluationFeedback {
                    accepted: false,
                    feedback: format!("tighten round {iteration}"),
                })
            }
        }
    }

    fn loop_with(evaluator: impl DraftEvaluator + 'static) -> RefinementLoop {
        RefinementLoop::with_stages(Arc::new(EchoGenerator), Arc::new(evaluator))
    }

    #[tokio::test]
    async fn accepts_at_each_possible_iteration() {
        for k in 1..=3 {
            let result = loop_with(AcceptAt { iteration: k })
                .refine("Make it playful", &TripContext::new())
                .await
                .unwrap();

            assert_eq!(result.rounds.len(), k);
            assert!(result.rounds[k - 1].accepted);
            assert!(result.rounds[..k - 1].iter().all(|r| !r.accepted));
            assert!(result.accepted());
        }
    }

    #[tokio::test]
    async fn exhaustion_returns_last_draft_unaccepted() {
        let result = loop_with(AcceptAt { iteration: 99 })
            .refine("Make it playful", &TripContext::new())
            .await
            .unwrap();

        assert_eq!(result.rounds.len(), 3);
        assert!(!result.accepted());
        assert_eq!(result.final_draft, result.rounds[2].draft);
    }

    #[tokio::test]
    async fn feedback_threads_into_the_next_round() {
        let result = loop_with(AcceptAt { iteration: 3 })
            .refine("Make it playful", &TripContext::new())
            .await
            .unwrap();

        assert!(!result.rounds[0].draft.contains("notes:"));
        assert!(result.rounds[1].draft.contains("notes: tighten round 1"));
        assert!(result.rounds[2].draft.contains("notes: tighten round 2"));
    }

    #[tokio::test]
    async fn generation_failure_aborts_without_partial_result() {
        struct BrokenGenerator;

        #[async_trait]
        impl DraftGenerator for BrokenGenerator {
            async fn generate(
                &self,
                _brief: &str,
                _context: &str,
                _reviewer_notes: Option<&str>,
            ) -> Result<String> {
                Err(VoyagerError::Transport("model offline".to_string()))
            }
        }

        let workflow =
            RefinementLoop::with_stages(Arc::new(BrokenGenerator), Arc::new(AcceptAt { iteration: 1 }));
        let err = workflow
            .refine("anything", &TripContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, VoyagerError::Transport(_)));
    }

    #[tokio::test]
    async fn kai_osaka_scenario_accepts_on_round_two() {
        let context = TripContext::new()
            .traveller("Kai")
            .route("Seattle", "Osaka")
            .dates(
                NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 11).unwrap(),
            )
            .budget("balanced")
            .interest("ramen")
            .interest("design");

        let result = loop_with(AcceptAt { iteration: 2 })
            .refine("Make it playful", &context)
            .await
            .unwrap();

        assert_eq!(result.rounds.len(), 2);
        assert!(!result.rounds[0].accepted);
        assert!(result.rounds[1].accepted);
        assert_eq!(result.final_draft, result.rounds[1].draft);
    }
}
