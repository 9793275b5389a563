//! Workflow orchestration components
//!
//! Six independent patterns for composing completion calls:
//!
//! - [`chain`] — fixed sequence of steps, fail-fast
//! - [`parallel`] — fixed concurrent fan-out with a join barrier
//! - [`router`] — classify-then-respond over a closed intent set
//! - [`refinement`] — bounded generate/evaluate loop
//! - [`orchestrator`] — planner-driven dynamic fan-out plus synthesis
//! - [`delegate`] — single tool-equipped call that consults expert sub-agents
//!
//! Each run is self-contained: components hold no cross-invocation state, and
//! every summary record is built once and returned immutable.

pub mod chain;
pub mod delegate;
pub mod orchestrator;
pub mod parallel;
pub mod refinement;
pub mod router;

pub use chain::{ItineraryChain, WorkflowSummary};
pub use delegate::MultiAgentDelegate;
pub use orchestrator::{
    OrchestratorWorkers, SynthesisAgent, TaskPlanner, TripPlan, WorkerExecutor, WorkerFinding,
    WorkerSummary, WorkerTask,
};
pub use parallel::{ParallelResearch, ParallelSummary};
pub use refinement::{
    DraftEvaluator, DraftGenerator, EvaluationFeedback, RefinementLoop, RefinementResult,
    RefinementRound,
};
pub use router::{
    IntentClassifier, IntentDecision, IntentResponder, RoutingOutcome, VoyagerIntent, VoyagerRouter,
};
