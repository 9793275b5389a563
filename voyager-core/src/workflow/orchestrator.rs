//! Orchestrator/workers: plan, fan out, synthesize
//!
//! Unlike the fixed-track fan-out, the task list here is data: a planner
//! completion decomposes the brief into 2-4 typed tasks, each task runs
//! concurrently as a worker call, and a final synthesis completion folds the
//! ordered findings into an action plan. Findings are assembled in task
//! order, never completion order, and one worker failure fails the whole
//! join.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::completion::{CompletionClient, CompletionRequest, decode_structured};
use crate::error::Result;
use crate::trip::TripContext;

/// A planner-produced unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerTask {
    pub role: String,
    pub focus: String,
    pub instruction: String,
}

/// One worker's output, tagged with its originating task's identity.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerFinding {
    pub role: String,
    pub focus: String,
    pub output: String,
}

/// Planner output: an analysis plus the ordered task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPlan {
    pub analysis: String,
    pub tasks: Vec<WorkerTask>,
}

/// Final orchestration output, assembled after the worker barrier.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub analysis: String,
    pub worker_findings: Vec<WorkerFinding>,
    pub action_plan: String,
}

/// Planning seam, stubbed in tests.
#[async_trait]
pub trait TaskPlanner: Send + Sync {
    async fn plan(&self, brief: &str, context: &str) -> Result<TripPlan>;
}

/// Worker execution seam, stubbed in tests.
#[async_trait]
pub trait WorkerExecutor: Send + Sync {
    async fn execute(&self, task: &WorkerTask, context: &str) -> Result<WorkerFinding>;
}

/// Synthesis seam, stubbed in tests.
#[async_trait]
pub trait SynthesisAgent: Send + Sync {
    async fn synthesise(
        &self,
        analysis: &str,
        findings: &[WorkerFinding],
        context: &str,
    ) -> Result<String>;
}

/// Three-phase orchestrator: plan, execute, synthesize.
pub struct OrchestratorWorkers {
    planner: Arc<dyn TaskPlanner>,
    executor: Arc<dyn WorkerExecutor>,
    synthesis: Arc<dyn SynthesisAgent>,
}

impl OrchestratorWorkers {
    /// Wire all three phases to the same completion client.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            planner: Arc::new(CompletionTaskPlanner {
                client: client.clone(),
            }),
            executor: Arc::new(CompletionWorkerExecutor {
                client: client.clone(),
            }),
            synthesis: Arc::new(CompletionSynthesisAgent { client }),
        }
    }

    /// Construct from explicit phases.
    pub fn with_stages(
        planner: Arc<dyn TaskPlanner>,
        executor: Arc<dyn WorkerExecutor>,
        synthesis: Arc<dyn SynthesisAgent>,
    ) -> Self {
        Self {
            planner,
            executor,
            synthesis,
        }
    }

    /// Run all three phases.
    ///
    /// A planner decode failure aborts before any worker runs; a single
    /// worker failure drops its siblings and fails the run.
    pub async fn orchestrate(&self, brief: &str, context: &TripContext) -> Result<WorkerSummary> {
        let rendered = context.render();

        let plan = self.planner.plan(brief, &rendered).await?;
        info!(tasks = plan.tasks.len(), "orchestration plan ready");

        let findings = try_join_all(
            plan.tasks
                .iter()
                .map(|task| self.executor.execute(task, &rendered)),
        )
        .await?;

        let action_plan = self
            .synthesis
            .synthesise(&plan.analysis, &findings, &rendered)
            .await?;

        Ok(WorkerSummary {
            analysis: plan.analysis,
            worker_findings: findings,
            action_plan,
        })
    }
}

struct CompletionTaskPlanner {
    client: Arc<dyn CompletionClient>,
}

#[async_trait]
impl TaskPlanner for CompletionTaskPlanner {
    async fn plan(&self, brief: &str, context: &str) -> Result<TripPlan> {
        let schema = json!({
            "type": "object",
            "properties": {
                "analysis": { "type": "string" },
                "tasks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "role": { "type": "string" },
                            "focus": { "type": "string" },
                            "instruction": { "type": "string" }
                        },
                        "required": ["role", "focus", "instruction"]
                    }
                }
            },
            "required": ["analysis", "tasks"]
        });

        let request = CompletionRequest::with_system_prompt(
            format!(
                "You are VoyagerMate's task orchestrator.\n\
                 Analyse the traveller brief and propose 2-4 worker tasks.\n\
                 Respond using this JSON schema:\n{schema}"
            ),
            format!("Traveller brief:\n{brief}\n\nTrip context:\n{context}"),
        );

        decode_structured(self.client.as_ref(), &request, Some(schema)).await
    }
}

struct CompletionWorkerExecutor {
    client: Arc<dyn CompletionClient>,
}

#[async_trait]
impl WorkerExecutor for CompletionWorkerExecutor {
    async fn execute(&self, task: &WorkerTask, context: &str) -> Result<WorkerFinding> {
        debug!(role = %task.role, focus = %task.focus, "dispatching worker");

        let request = CompletionRequest::with_system_prompt(
            format!(
                "You are a specialised VoyagerMate worker focused on {}.\n\
                 Return concise bullet points with concrete tips.",
                task.focus
            ),
            format!(
                "Role: {}\nInstruction: {}\n\nTrip context:\n{context}",
                task.role, task.instruction
            ),
        );
        let response = self.client.complete(&request).await?;

        Ok(WorkerFinding {
            role: task.role.clone(),
            focus: task.focus.clone(),
            output: response.content,
        })
    }
}

struct CompletionSynthesisAgent {
    client: Arc<dyn CompletionClient>,
}

#[async_trait]
impl SynthesisAgent for CompletionSynthesisAgent {
    async fn synthesise(
        &self,
        analysis: &str,
        findings: &[WorkerFinding],
        context: &str,
    ) -> Result<String> {
        let findings_text = findings
            .iter()
            .map(|f| format!("- {} ({}): {}", f.role, f.focus, f.output))
            .collect::<Vec<_>>()
            .join("\n");

        let request = CompletionRequest::with_system_prompt(
            "You are VoyagerMate's orchestrator summarising worker results.\n\
             Deliver a short action plan plus callouts for human follow-up.",
            format!(
                "Orchestrator analysis:\n{analysis}\n\nWorker findings:\n{findings_text}\n\n\
                 Traveller context:\n{context}"
            ),
        );
        Ok(self.client.complete(&request).await?.content)
    }
}
