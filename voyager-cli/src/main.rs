//! VoyagerMate CLI - travel-planning workflows from the command line
//!
//! Each subcommand exercises exactly one orchestration component: it captures
//! the trip parameters into a `TripContext`, runs the component, and renders
//! the summary. Errors from the core taxonomy are translated here into
//! operator-facing guidance; the core itself never prints.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::error;

use voyager_core::completion::{CompletionClient, OpenAiCompletionClient};
use voyager_core::config::VoyagerConfig;
use voyager_core::error::VoyagerError;
use voyager_core::itinerary::ItineraryPlanner;
use voyager_core::trip::TripContext;
use voyager_core::workflow::{
    ItineraryChain, MultiAgentDelegate, OrchestratorWorkers, ParallelResearch, RefinementLoop,
    VoyagerRouter,
};

#[derive(Parser)]
#[command(name = "voyager")]
#[command(about = "VoyagerMate travel-planning workflows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TripArgs {
    /// Traveller name
    #[arg(long)]
    traveller: Option<String>,

    /// Origin city
    #[arg(long)]
    origin: Option<String>,

    /// Destination city
    #[arg(long)]
    destination: Option<String>,

    /// Departure date (YYYY-MM-DD)
    #[arg(long)]
    depart: Option<NaiveDate>,

    /// Return date (YYYY-MM-DD)
    #[arg(long = "return")]
    return_date: Option<NaiveDate>,

    /// Budget focus (e.g. balanced, splurge, shoestring)
    #[arg(long)]
    budget: Option<String>,

    /// Interest tag, repeatable
    #[arg(long = "interest")]
    interests: Vec<String>,
}

impl TripArgs {
    fn to_context(&self) -> TripContext {
        TripContext {
            traveller_name: self.traveller.clone(),
            origin_city: self.origin.clone(),
            destination_city: self.destination.clone(),
            departure_date: self.depart,
            return_date: self.return_date,
            budget_focus: self.budget.clone(),
            interests: self.interests.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self.traveller.is_none()
            && self.origin.is_none()
            && self.destination.is_none()
            && self.depart.is_none()
            && self.return_date.is_none()
            && self.budget.is_none()
            && self.interests.is_empty()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the four-step sequential planning chain
    Chain {
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Run the four concurrent research tracks
    Parallel {
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Classify a request and respond with the matching persona
    Route {
        /// The traveller's free-text request
        prompt: String,
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Iteratively draft and review an itinerary pitch
    Refine {
        /// Creative brief for the copywriter
        brief: String,
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Plan worker tasks, run them concurrently, and synthesize
    Orchestrate {
        /// High-level brief for the planner
        brief: String,
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Let a lead agent consult the expert team
    Delegate {
        /// The traveller's request
        request: String,
    },
    /// Produce a structured day-by-day itinerary
    Plan {
        #[command(flatten)]
        trip: TripArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("workflow failed: {err}");
            eprintln!("{err}");
            eprintln!("Guidance: {}", guidance(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let client = build_client()?;

    match command {
        Commands::Chain { trip } => {
            let summary = ItineraryChain::new(client).run(&trip.to_context()).await?;
            section("Discovery", &summary.discovery);
            section("Itinerary draft", &summary.itinerary_draft);
            section("Risk review", &summary.risk_review);
            section("Next steps", &summary.next_steps);
        }
        Commands::Parallel { trip } => {
            let summary = ParallelResearch::new(client).run(&trip.to_context()).await?;
            section("Lodging", &summary.lodging_insights);
            section("Dining", &summary.dining_highlights);
            section("Logistics", &summary.logistics_advisory);
            section("Culture", &summary.cultural_moments);
            println!("Completed in {} ms", summary.total_latency_ms);
        }
        Commands::Route { prompt, trip } => {
            let context = (!trip.is_empty()).then(|| trip.to_context());
            let outcome = VoyagerRouter::new(client)
                .route(&prompt, context.as_ref())
                .await?;
            println!("Intent: {}", outcome.intent.as_str());
            println!("Rationale: {}", outcome.rationale);
            section("Response", &outcome.response);
        }
        Commands::Refine { brief, trip } => {
            let result = RefinementLoop::new(client)
                .refine(&brief, &trip.to_context())
                .await?;
            for round in &result.rounds {
                println!(
                    "--- Round {} ({}) ---",
                    round.iteration,
                    if round.accepted { "accepted" } else { "revise" }
                );
                println!("{}", round.feedback);
            }
            if !result.accepted() {
                println!("Note: no draft met the review bar; showing the last attempt.");
            }
            section("Final draft", &result.final_draft);
        }
        Commands::Orchestrate { brief, trip } => {
            let summary = OrchestratorWorkers::new(client)
                .orchestrate(&brief, &trip.to_context())
                .await?;
            section("Analysis", &summary.analysis);
            for finding in &summary.worker_findings {
                section(&format!("{} ({})", finding.role, finding.focus), &finding.output);
            }
            section("Action plan", &summary.action_plan);
        }
        Commands::Delegate { request } => {
            let plan = MultiAgentDelegate::new(client).plan_trip(&request).await?;
            println!("{plan}");
        }
        Commands::Plan { trip } => {
            let plan = ItineraryPlanner::new(client).plan(&trip.to_context()).await?;
            section("Overview", &plan.destination_overview);
            println!("Highlights:");
            for highlight in &plan.highlights {
                println!("  - {highlight}");
            }
            for day in &plan.daily_schedule {
                println!("\n{} — {}", day.day, day.theme);
                for activity in &day.activities {
                    println!("  - {activity}");
                }
                println!("  Dining: {}", day.dining_recommendation);
            }
            println!("\nBooking reminders:");
            for reminder in &plan.booking_reminders {
                println!("  - {reminder}");
            }
            println!("Estimated budget: {:.2}", plan.estimated_budget);
        }
    }

    Ok(())
}

fn build_client() -> anyhow::Result<Arc<dyn CompletionClient>> {
    let config = VoyagerConfig::load()?;
    let client = OpenAiCompletionClient::from_config(&config.provider)?;
    Ok(Arc::new(client))
}

fn section(title: &str, body: &str) {
    println!("=== {title} ===");
    println!("{body}\n");
}

/// Operator-facing guidance per error family.
fn guidance(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<VoyagerError>() {
        Some(VoyagerError::Transport(_)) => {
            "Check network connectivity and the configured endpoint, then retry."
        }
        Some(VoyagerError::Decode(_)) => {
            "The model reply did not match the expected schema. Retry, or lower the temperature."
        }
        Some(VoyagerError::Refusal(_)) => {
            "The service declined this request. Rephrase it or review the content policy."
        }
        Some(VoyagerError::Configuration(_)) => {
            "Review voyager.toml and the VOYAGER_* environment variables."
        }
        Some(VoyagerError::Tool { .. }) => {
            "A tool invocation failed. Check the tool arguments in the logs."
        }
        Some(VoyagerError::Io(_)) => "Check file paths and permissions.",
        None => "See the logged error for details.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn trip_args_map_onto_the_context() {
        let cli = Cli::parse_from([
            "voyager",
            "chain",
            "--traveller",
            "Kai",
            "--origin",
            "Seattle",
            "--destination",
            "Osaka",
            "--depart",
            "2025-04-03",
            "--return",
            "2025-04-11",
            "--budget",
            "balanced",
            "--interest",
            "ramen",
            "--interest",
            "design",
        ]);

        let Commands::Chain { trip } = cli.command else {
            panic!("expected the chain subcommand");
        };
        let context = trip.to_context();
        let rendered = context.render();

        assert!(rendered.contains("Traveller: Kai"));
        assert!(rendered.contains("Dates: 2025-04-03 to 2025-04-11"));
        assert!(rendered.contains("Interests: ramen, design"));
    }

    #[test]
    fn empty_trip_args_are_detected() {
        let cli = Cli::parse_from(["voyager", "route", "help me"]);
        let Commands::Route { trip, .. } = cli.command else {
            panic!("expected the route subcommand");
        };
        assert!(trip.is_empty());
    }

    #[test]
    fn every_error_family_has_guidance() {
        let errors = [
            VoyagerError::Transport("t".to_string()),
            VoyagerError::Decode("d".to_string()),
            VoyagerError::Refusal("r".to_string()),
            VoyagerError::Configuration("c".to_string()),
            VoyagerError::Tool {
                name: "n".to_string(),
                message: "m".to_string(),
            },
        ];
        for err in errors {
            assert!(!guidance(&anyhow::Error::from(err)).is_empty());
        }
        assert!(!guidance(&anyhow::anyhow!("other")).is_empty());
    }
}
