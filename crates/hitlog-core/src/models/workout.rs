use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Exact pounds-to-kilograms factor.
pub const LBS_TO_KG: f64 = 0.453_592_37;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Kg,
    Lbs,
}

impl Unit {
    pub fn to_kg(self, weight: f64) -> f64 {
        match self {
            Unit::Kg => weight,
            Unit::Lbs => weight * LBS_TO_KG,
        }
    }

    pub fn from_kg(self, kg: f64) -> f64 {
        match self {
            Unit::Kg => kg,
            Unit::Lbs => kg / LBS_TO_KG,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Unit::Kg => Unit::Lbs,
            Unit::Lbs => Unit::Kg,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Kg => f.write_str("kg"),
            Unit::Lbs => f.write_str("lbs"),
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" => Ok(Unit::Kg),
            "lb" | "lbs" => Ok(Unit::Lbs),
            other => Err(format!("unknown unit: {}", other)),
        }
    }
}

/// One set as logged. `note` is the plan's prescription, `note_text` what the
/// user typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSet {
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub note_text: String,
    #[serde(default)]
    pub entered_weight: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
}

/// A saved session. Immutable once created; removed only by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub date: NaiveDate,
    pub plan_key: String,
    pub plan_name: String,
    pub unit_at_entry: Unit,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

/// Everything the app persists about the user, stored as one JSON value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct AppState {
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub history: Vec<WorkoutRecord>,
}
