//! Trip context shared across every orchestration run
//!
//! A `TripContext` is captured once (usually by the CLI), rendered once into
//! a flat textual summary, and passed by reference into every workflow
//! component. Rendering happens in exactly one place so the per-component
//! prompts never re-derive formatting or default-value logic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fallback traveller name when none was supplied
const DEFAULT_TRAVELLER: &str = "Guest Traveller";
/// Fallback city name
const DEFAULT_CITY: &str = "Unknown";
/// Fallback for a missing date
const DEFAULT_DATE: &str = "unscheduled";
/// Fallback budget focus
const DEFAULT_BUDGET: &str = "flexible";
/// Fallback interests line
const DEFAULT_INTERESTS: &str = "unspecified";

/// Structured trip parameters for a single planning run.
///
/// Immutable after construction; missing fields resolve to documented
/// defaults at render time so that no prompt ever sees an empty value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripContext {
    pub traveller_name: Option<String>,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub budget_focus: Option<String>,
    pub interests: Vec<String>,
}

impl TripContext {
    /// Create a builder-style empty context
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traveller(mut self, name: impl Into<String>) -> Self {
        self.traveller_name = Some(name.into());
        self
    }

    pub fn route(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin_city = Some(origin.into());
        self.destination_city = Some(destination.into());
        self
    }

    pub fn dates(mut self, departure: NaiveDate, ret: NaiveDate) -> Self {
        self.departure_date = Some(departure);
        self.return_date = Some(ret);
        self
    }

    pub fn budget(mut self, focus: impl Into<String>) -> Self {
        self.budget_focus = Some(focus.into());
        self
    }

    pub fn interest(mut self, tag: impl Into<String>) -> Self {
        self.interests.push(tag.into());
        self
    }

    /// Render the context into the flat textual summary consumed by every
    /// workflow step. Missing fields resolve to defaults, never empty text.
    pub fn render(&self) -> String {
        format!(
            "Traveller: {}\nRoute: {} to {}\nDates: {} to {}\nBudget: {}\nInterests: {}",
            text_or(self.traveller_name.as_deref(), DEFAULT_TRAVELLER),
            text_or(self.origin_city.as_deref(), DEFAULT_CITY),
            text_or(self.destination_city.as_deref(), DEFAULT_CITY),
            date_or_default(self.departure_date),
            date_or_default(self.return_date),
            text_or(self.budget_focus.as_deref(), DEFAULT_BUDGET),
            self.render_interests(),
        )
    }

    /// Render an optional context; `None` yields the documented placeholder.
    pub fn render_optional(context: Option<&TripContext>) -> String {
        match context {
            Some(ctx) => ctx.render(),
            None => "No itinerary metadata supplied.".to_string(),
        }
    }

    fn render_interests(&self) -> String {
        if self.interests.is_empty() {
            DEFAULT_INTERESTS.to_string()
        } else {
            self.interests.join(", ")
        }
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn date_or_default(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| DEFAULT_DATE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TripContext {
        TripContext::new()
            .traveller("Kai")
            .route("Seattle", "Osaka")
            .dates(
                NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 11).unwrap(),
            )
            .budget("balanced")
            .interest("ramen")
            .interest("design")
    }

    #[test]
    fn renders_all_fields() {
        let rendered = sample().render();

        assert!(rendered.contains("Traveller: Kai"));
        assert!(rendered.contains("Route: Seattle to Osaka"));
        assert!(rendered.contains("Dates: 2025-04-03 to 2025-04-11"));
        assert!(rendered.contains("Budget: balanced"));
        assert!(rendered.contains("Interests: ramen, design"));
    }

    #[test]
    fn missing_fields_resolve_to_defaults() {
        let rendered = TripContext::new().render();

        assert!(rendered.contains("Traveller: Guest Traveller"));
        assert!(rendered.contains("Route: Unknown to Unknown"));
        assert!(rendered.contains("Dates: unscheduled to unscheduled"));
        assert!(rendered.contains("Budget: flexible"));
        assert!(rendered.contains("Interests: unspecified"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let rendered = TripContext::new().traveller("   ").render();
        assert!(rendered.contains("Traveller: Guest Traveller"));
    }

    #[test]
    fn optional_context_placeholder() {
        assert_eq!(
            TripContext::render_optional(None),
            "No itinerary metadata supplied."
        );
        assert!(TripContext::render_optional(Some(&sample())).contains("Kai"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let ctx = sample();
        assert_eq!(ctx.render(), ctx.render());
    }
}
