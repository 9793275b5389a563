//! Deterministic travel lookups
//!
//! Simple, side-effect-free tools the model can call while planning: curated
//! attractions, budget baselines, and date arithmetic. Nothing here touches
//! the network.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ExpertTool, ToolSet};
use crate::error::{Result, VoyagerError};

const FALLBACK_ATTRACTION: &str = "Curate experiences locally upon arrival";
const FALLBACK_DAILY_BUDGET: f64 = 150.0;

fn curated_attractions(city: &str) -> Option<&'static [&'static str]> {
    match city {
        "rome" => Some(&[
            "Colosseum tour",
            "Sunset walk at Trastevere",
            "Day trip to Pompeii",
        ]),
        "tokyo" => Some(&[
            "Tsukiji outer market tasting",
            "Ghibli Museum",
            "Mount Takao hike",
        ]),
        "barcelona" => Some(&[
            "Sagrada Família early access",
            "Tapas crawl in El Born",
            "Costa Brava sail",
        ]),
        _ => None,
    }
}

fn daily_budget(city: &str) -> f64 {
    match city {
        "rome" => 185.0,
        "tokyo" => 220.0,
        "barcelona" => 170.0,
        "bali" => 110.0,
        _ => FALLBACK_DAILY_BUDGET,
    }
}

fn decode_args<T: for<'de> Deserialize<'de>>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| VoyagerError::decode(format!("invalid arguments for '{tool}'"), e))
}

/// Must-see experiences for a destination.
pub struct FindAttractions;

#[derive(Deserialize)]
struct FindAttractionsArgs {
    city: String,
    limit: Option<usize>,
}

#[async_trait]
impl ExpertTool for FindAttractions {
    fn name(&self) -> &str {
        "find_attractions"
    }

    fn description(&self) -> &str {
        "Return must-see experiences for a destination"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "description": "Destination city" },
                "limit": { "type": "integer", "description": "Maximum number of items" }
            },
            "required": ["city"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: FindAttractionsArgs = decode_args(self.name(), args)?;
        let city = args.city.to_lowercase();

        let mut items: Vec<&str> = curated_attractions(&city)
            .map(|list| list.to_vec())
            .unwrap_or_else(|| vec![FALLBACK_ATTRACTION]);

        if let Some(limit) = args.limit {
            items.truncate(limit);
        }

        Ok(json!(items))
    }
}

/// Base budget per traveller for a stay.
pub struct EstimateBudget;

#[derive(Deserialize)]
struct EstimateBudgetArgs {
    city: String,
    nights: u32,
}

#[async_trait]
impl ExpertTool for EstimateBudget {
    fn name(&self) -> &str {
        "estimate_budget"
    }

    fn description(&self) -> &str {
        "Estimate base budget per traveller for a trip"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "description": "Destination city" },
                "nights": { "type": "integer", "description": "Number of nights" }
            },
            "required": ["city", "nights"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: EstimateBudgetArgs = decode_args(self.name(), args)?;
        let baseline = daily_budget(&args.city.to_lowercase());
        Ok(json!(f64::from(args.nights) * baseline))
    }
}

/// Buffer-day advice between travel legs.
pub struct TravelGapChecker;

#[derive(Deserialize)]
struct TravelGapArgs {
    start: NaiveDate,
    end: NaiveDate,
}

#[async_trait]
impl ExpertTool for TravelGapChecker {
    fn name(&self) -> &str {
        "travel_gap_checker"
    }

    fn description(&self) -> &str {
        "Suggest buffer days between travel legs"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "start": { "type": "string", "format": "date", "description": "Date you leave origin" },
                "end": { "type": "string", "format": "date", "description": "Date you depart destination" }
            },
            "required": ["start", "end"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: TravelGapArgs = decode_args(self.name(), args)?;
        let nights = (args.end - args.start).num_days();

        let advice = if nights < 3 {
            "Trip is very short. Add at least 1 buffer night to adjust to time zone changes."
        } else if nights > 14 {
            "Consider planning a rest day every 4 days to avoid burnout."
        } else {
            "Duration looks balanced. Add a flex day for unexpected discoveries."
        };

        Ok(json!(advice))
    }
}

/// Calendar facts about a date: distance from today, weekday, season, and
/// optionally the current local time in a named timezone.
///
/// "Now" is injected at construction so runs are reproducible under test.
pub struct CalendarValidator {
    now_utc: DateTime<Utc>,
}

impl CalendarValidator {
    /// Validate against the current system time
    pub fn new() -> Self {
        Self {
            now_utc: Utc::now(),
        }
    }

    /// Validate against a fixed reference date (midnight UTC)
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            now_utc: today.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

impl Default for CalendarValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct CalendarArgs {
    date: NaiveDate,
    timezone: Option<String>,
}

#[async_trait]
impl ExpertTool for CalendarValidator {
    fn name(&self) -> &str {
        "calendar_validator"
    }

    fn description(&self) -> &str {
        "Validate dates and provide calendar information for trip planning accuracy"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "date": { "type": "string", "format": "date", "description": "Date to validate (YYYY-MM-DD)" },
                "timezone": { "type": "string", "description": "Optional: timezone for local time context (e.g., Europe/Rome, Asia/Tokyo)" }
            },
            "required": ["date"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let args: CalendarArgs = decode_args(self.name(), args)?;
        let date = args.date;
        let today = self.now_utc.date_naive();
        let mut report = String::new();

        if date < today {
            report.push_str(&format!("WARNING: Date {date} is in the past. "));
        } else if date == today {
            report.push_str(&format!("Date {date} is today. "));
        } else {
            let days = (date - today).num_days();
            report.push_str(&format!("Date {date} is {days} days from now. "));
        }

        let weekday = date.weekday();
        report.push_str(&format!("It falls on a {}. ", weekday_name(weekday)));
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            report.push_str("This is a weekend day. ");
        } else {
            report.push_str("This is a weekday. ");
        }

        report.push_str(&format!(
            "Month: {} ({} in Northern Hemisphere).",
            month_name(date.month()),
            season(date.month()),
        ));

        if let Some(tz_name) = args.timezone.as_deref().filter(|t| !t.trim().is_empty()) {
            match tz_name.parse::<Tz>() {
                Ok(tz) => {
                    let local_now = self.now_utc.with_timezone(&tz);
                    report.push_str(&format!(
                        " Local timezone: {}. Current local time: {}.",
                        tz.name(),
                        local_now.format("%H:%M on %A, %B %-d, %Y"),
                    ));
                }
                Err(_) => {
                    report.push_str(&format!(
                        " Note: Invalid timezone '{tz_name}' - using system default."
                    ));
                }
            }
        }

        Ok(json!(report))
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

fn season(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "Winter",
        3..=5 => "Spring",
        6..=8 => "Summer",
        _ => "Autumn",
    }
}

/// The full deterministic travel tool set.
pub fn travel_toolset() -> ToolSet {
    ToolSet::new()
        .with_tool(FindAttractions)
        .with_tool(EstimateBudget)
        .with_tool(TravelGapChecker)
        .with_tool(CalendarValidator::new())
}
