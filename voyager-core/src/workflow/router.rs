//! Intent router: classify free text, then respond with a matching persona
//!
//! Stage 1 decodes the traveller's request into one of a closed set of
//! intents; a value outside the set is a `Decode` error, never a silent
//! fallback. Stage 2 maps the intent to a persona instruction through an
//! exhaustive `match`, so adding an intent without a handler fails to
//! compile.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::completion::{CompletionClient, CompletionRequest, decode_structured};
use crate::error::Result;
use crate::trip::TripContext;

/// The closed set of traveller intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoyagerIntent {
    Concierge,
    BookingChange,
    TravelRisk,
}

impl VoyagerIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoyagerIntent::Concierge => "CONCIERGE",
            VoyagerIntent::BookingChange => "BOOKING_CHANGE",
            VoyagerIntent::TravelRisk => "TRAVEL_RISK",
        }
    }
}

/// Classification stage output: the intent plus the model's rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDecision {
    pub intent: VoyagerIntent,
    pub rationale: String,
}

/// Full routing outcome returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingOutcome {
    pub intent: VoyagerIntent,
    pub rationale: String,
    pub response: String,
}

/// Classification seam, stubbed in tests.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, prompt: &str) -> Result<IntentDecision>;
}

/// Response seam, stubbed in tests.
#[async_trait]
pub trait IntentResponder: Send + Sync {
    async fn respond(&self, intent: VoyagerIntent, prompt: &str, context: &str) -> Result<String>;
}

/// Two-stage router: classify, then respond exactly once.
pub struct VoyagerRouter {
    classifier: Arc<dyn IntentClassifier>,
    responder: Arc<dyn IntentResponder>,
}

impl VoyagerRouter {
    /// Wire both stages to the same completion client.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            classifier: Arc::new(CompletionIntentClassifier {
                client: client.clone(),
            }),
            responder: Arc::new(CompletionIntentResponder { client }),
        }
    }

    /// Construct from explicit stages.
    pub fn with_stages(
        classifier: Arc<dyn IntentClassifier>,
        responder: Arc<dyn IntentResponder>,
    ) -> Self {
        Self {
            classifier,
            responder,
        }
    }

    /// Classify the prompt and dispatch to the matching persona.
    ///
    /// No retries between stages; stage 2 runs exactly once after a
    /// successful stage 1.
    pub async fn route(
        &self,
        prompt: &str,
        context: Option<&TripContext>,
    ) -> Result<RoutingOutcome> {
        let rendered = TripContext::render_optional(context);

        let decision = self.classifier.classify(prompt).await?;
        debug!(intent = decision.intent.as_str(), "classified traveller request");

        let response = self
            .responder
            .respond(decision.intent, prompt, &rendered)
            .await?;

        Ok(RoutingOutcome {
            intent: decision.intent,
            rationale: decision.rationale,
            response,
        })
    }
}

struct CompletionIntentClassifier {
    client: Arc<dyn CompletionClient>,
}

#[async_trait]
impl IntentClassifier for CompletionIntentClassifier {
    async fn classify(&self, prompt: &str) -> Result<IntentDecision> {
        let schema = json!({
            "type": "object",
            "properties": {
                "intent": { "type": "string", "enum": ["CONCIERGE", "BOOKING_CHANGE", "TRAVEL_RISK"] },
                "rationale": { "type": "string" }
            },
            "required": ["intent", "rationale"]
        });

        let request = CompletionRequest::with_system_prompt(
            format!(
                "You classify travel support requests into intents.\n\
                 Allowed intents: CONCIERGE, BOOKING_CHANGE, TRAVEL_RISK.\n\
                 Respond using this JSON schema:\n{schema}"
            ),
            prompt,
        );

        decode_structured(self.client.as_ref(), &request, Some(schema)).await
    }
}

struct CompletionIntentResponder {
    client: Arc<dyn CompletionClient>,
}

fn persona_for(intent: VoyagerIntent) -> &'static str {
    match intent {
        VoyagerIntent::BookingChange => {
            "You are VoyagerMate handling booking changes. \
             Return numbered remediation steps plus a short escalation note."
        }
        VoyagerIntent::TravelRisk => {
            "You are VoyagerMate acting as a travel risk analyst. \
             Provide risk tiers, mitigation, and when to alert a human."
        }
        VoyagerIntent::Concierge => {
            "You are VoyagerMate concierge. \
             Offer creative ideas while confirming assumptions before acting."
        }
    }
}

#[async_trait]
impl IntentResponder for CompletionIntentResponder {
    async fn respond(&self, intent: VoyagerIntent, prompt: &str, context: &str) -> Result<String> {
        let request = CompletionRequest::with_system_prompt(
            persona_for(intent),
            format!("{prompt}\n---\n{context}"),
        );
        Ok(self.client.complete(&request).await?.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionResponse, ModelInfo};
    use crate::error::VoyagerError;

    struct FixedClassifier {
        intent: VoyagerIntent,
    }

    #[async_trait]
    impl IntentClassifier for FixedClassifier {
        async fn classify(&self, _prompt: &str) -> Result<IntentDecision> {
            Ok(IntentDecision {
                intent: self.intent,
                rationale: format!("looks like {}", self.intent.as_str()),
            })
        }
    }

    /// Echoes which intent it was dispatched with.
    struct EchoResponder;

    #[async_trait]
    impl IntentResponder for EchoResponder {
        async fn respond(
            &self,
            intent: VoyagerIntent,
            _prompt: &str,
            context: &str,
        ) -> Result<String> {
            Ok(format!("handled as {} | {context}", intent.as_str()))
        }
    }

    #[tokio::test]
    async fn each_intent_dispatches_to_its_own_handler() {
        for intent in [
            VoyagerIntent::Concierge,
            VoyagerIntent::BookingChange,
            VoyagerIntent::TravelRisk,
        ] {
            let router = VoyagerRouter::with_stages(
                Arc::new(FixedClassifier { intent }),
                Arc::new(EchoResponder),
            );
            let outcome = router.route("help me", None).await.unwrap();

            assert_eq!(outcome.intent, intent);
            assert!(outcome.response.contains(intent.as_str()));
        }
    }

    #[tokio::test]
    async fn missing_context_renders_the_placeholder() {
        let router = VoyagerRouter::with_stages(
            Arc::new(FixedClassifier {
                intent: VoyagerIntent::Concierge,
            }),
            Arc::new(EchoResponder),
        );
        let outcome = router.route("surprise me", None).await.unwrap();
        assert!(outcome.response.contains("No itinerary metadata supplied."));
    }

    #[tokio::test]
    async fn out_of_set_intent_is_a_decode_error() {
        struct OffScriptClient;

        #[async_trait]
        impl CompletionClient for OffScriptClient {
            async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
                Ok(CompletionResponse {
                    content: r#"{"intent": "UPGRADE_SEAT", "rationale": "wants a better seat"}"#
                        .to_string(),
                    usage: None,
                })
            }

            fn model_info(&self) -> ModelInfo {
                ModelInfo {
                    provider: "offscript".to_string(),
                    model_name: "test".to_string(),
                }
            }
        }

        let router = VoyagerRouter::new(Arc::new(OffScriptClient));
        let err = router.route("upgrade me", None).await.unwrap_err();
        assert!(matches!(err, VoyagerError::Decode(_)));
    }

    #[tokio::test]
    async fn identical_runs_yield_identical_outcomes() {
        let context = TripContext::new().traveller("Kai").route("Seattle", "Osaka");
        let make_router = || {
            VoyagerRouter::with_stages(
                Arc::new(FixedClassifier {
                    intent: VoyagerIntent::TravelRisk,
                }),
                Arc::new(EchoResponder),
            )
        };

        let a = make_router()
            .route("is a typhoon likely?", Some(&context))
            .await
            .unwrap();
        let b = make_router()
            .route("is a typhoon likely?", Some(&context))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn intents_use_the_wire_naming() {
        let decision: IntentDecision =
            serde_json::from_str(r#"{"intent": "BOOKING_CHANGE", "rationale": "r"}"#).unwrap();
        assert_eq!(decision.intent, VoyagerIntent::BookingChange);
    }

    #[test]
    fn every_intent_has_a_distinct_persona() {
        let personas = [
            persona_for(VoyagerIntent::Concierge),
            persona_for(VoyagerIntent::BookingChange),
            persona_for(VoyagerIntent::TravelRisk),
        ];
        assert!(personas[0] != personas[1]);
        assert!(personas[1] != personas[2]);
    }
}
