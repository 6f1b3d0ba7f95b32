//! Planner data model — itinerary entries, map locations and sidebar filters.

use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Category ─────────────────────────────────────────────────────────────────

/// Kind of day on the itinerary. Drives the badge colour in the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Beach,
    Culture,
    Nature,
    Wildlife,
    City,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beach => "beach",
            Category::Culture => "culture",
            Category::Nature => "nature",
            Category::Wildlife => "wildlife",
            Category::City => "city",
        }
    }

    /// Palette token used for the category badge.
    pub fn colour(&self) -> &'static str {
        match self {
            Category::Beach => "sky",
            Category::Culture => "sunset",
            Category::Nature => "jungle",
            Category::Wildlife => "amber",
            Category::City => "violet",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── ItineraryItem ────────────────────────────────────────────────────────────

/// One day of the plan. Serialises with its category badge `colour`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "BadgedItem")]
pub struct ItineraryItem {
    pub id: String,
    /// 1-based; dense and unique across the itinerary after a regeneration.
    pub day: u32,
    pub location: String,
    pub activities: Vec<String>,
    pub accommodation: String,
    pub duration: String,
    pub category: Category,
}

/// Wire form of [`ItineraryItem`].
#[derive(Serialize)]
struct BadgedItem {
    id: String,
    day: u32,
    location: String,
    activities: Vec<String>,
    accommodation: String,
    duration: String,
    category: Category,
    colour: &'static str,
}

impl From<ItineraryItem> for BadgedItem {
    fn from(item: ItineraryItem) -> Self {
        Self {
            colour: item.category.colour(),
            id: item.id,
            day: item.day,
            location: item.location,
            activities: item.activities,
            accommodation: item.accommodation,
            duration: item.duration,
            category: item.category,
        }
    }
}

// ── Location ─────────────────────────────────────────────────────────────────

/// A plain coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A named map point. `day` is `None` for pool entries that have not been
/// placed on the route yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self { name: name.into(), lat, lng, day: None }
    }

    pub fn coords(&self) -> LatLng {
        LatLng { lat: self.lat, lng: self.lng }
    }

    /// The assigned day, or the positional default (`index + 1`).
    pub fn day_or(&self, index: usize) -> u32 {
        self.day.unwrap_or(index as u32 + 1)
    }
}

// ── TravelFilters ────────────────────────────────────────────────────────────

pub const BUDGET_MIN: u32 = 50;
pub const BUDGET_MAX: u32 = 500;
pub const BUDGET_STEP: u32 = 10;
pub const ADVENTURE_MIN: u8 = 1;
pub const ADVENTURE_MAX: u8 = 5;

/// Sidebar filter state. Recorded by the store; does not reshape the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelFilters {
    /// Daily budget in USD.
    pub budget: u32,
    pub adventure_level: u8,
    pub cultural_interest: bool,
    pub luxury_travel: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl Default for TravelFilters {
    fn default() -> Self {
        Self {
            budget: 150,
            adventure_level: 2,
            cultural_interest: true,
            luxury_travel: false,
            date: Some(Utc::now().date_naive()),
        }
    }
}

impl TravelFilters {
    /// Clamp every slider into range and snap the budget to its step.
    pub fn normalized(mut self) -> Self {
        let budget = self.budget.clamp(BUDGET_MIN, BUDGET_MAX);
        let offset = budget - BUDGET_MIN;
        let snapped = BUDGET_MIN + ((offset + BUDGET_STEP / 2) / BUDGET_STEP) * BUDGET_STEP;
        self.budget = snapped.min(BUDGET_MAX);
        self.adventure_level = self.adventure_level.clamp(ADVENTURE_MIN, ADVENTURE_MAX);
        self
    }

    /// Apply one `key=value` pair as typed on the console.
    pub fn apply_pair(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "budget" => {
                self.budget = value.parse().map_err(|_| format!("invalid budget: {value}"))?;
            }
            "adventure" | "adventure_level" => {
                self.adventure_level =
                    value.parse().map_err(|_| format!("invalid adventure level: {value}"))?;
            }
            "culture" | "cultural_interest" => {
                self.cultural_interest = parse_bool(value)?;
            }
            "luxury" | "luxury_travel" => {
                self.luxury_travel = parse_bool(value)?;
            }
            "date" => {
                self.date = if value.is_empty() || value == "none" {
                    None
                } else {
                    Some(
                        NaiveDate::parse_from_str(value, "%Y-%m-%d")
                            .map_err(|_| format!("invalid date (want YYYY-MM-DD): {value}"))?,
                    )
                };
            }
            other => return Err(format!("unknown filter: {other}")),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(format!("invalid boolean: {other}")),
    }
}
