//! Derived views over the workout history: personal records, per-exercise
//! progress and catalog search. Nothing here touches storage.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::WorkoutRecord;
use crate::utils::{contains_ignore_case, normalize_search};

/// Heaviest set ever logged for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise: String,
    pub weight_kg: f64,
    pub reps: Option<u32>,
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub date: NaiveDate,
}

/// Best weight for one exercise on one workout date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub reps: Option<u32>,
}

/// Whether `candidate` beats `current`: heavier, then more reps, then earlier.
fn is_better(candidate: &PersonalRecord, current: &PersonalRecord) -> bool {
    match candidate.weight_kg.partial_cmp(&current.weight_kg) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => match candidate.reps.cmp(&current.reps) {
            Ordering::Greater => true,
            Ordering::Equal => candidate.date < current.date,
            Ordering::Less => false,
        },
        _ => false,
    }
}

/// One record per exercise name, sorted by name. Sets without a weight are
/// ignored.
pub fn personal_records(history: &[WorkoutRecord]) -> Vec<PersonalRecord> {
    let mut best: BTreeMap<&str, PersonalRecord> = BTreeMap::new();

    for workout in history {
        for set in &workout.sets {
            let Some(weight_kg) = set.weight_kg else {
                continue;
            };
            if set.name.trim().is_empty() || !weight_kg.is_finite() {
                continue;
            }
            let candidate = PersonalRecord {
                exercise: set.name.clone(),
                weight_kg,
                reps: set.reps,
                date: workout.date,
            };
            let replace = best
                .get(set.name.as_str())
                .map_or(true, |current| is_better(&candidate, current));
            if replace {
                best.insert(set.name.as_str(), candidate);
            }
        }
    }

    best.into_values().collect()
}

/// Best weight per date for the exercise named by `query`, oldest first.
///
/// Names match ignoring case and runs of whitespace.
pub fn progress_series(history: &[WorkoutRecord], query: &str) -> Vec<ProgressPoint> {
    let wanted = normalize_search(query);
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut by_date: BTreeMap<NaiveDate, ProgressPoint> = BTreeMap::new();
    for workout in history {
        for set in &workout.sets {
            let Some(weight_kg) = set.weight_kg else {
                continue;
            };
            if normalize_search(&set.name) != wanted {
                continue;
            }
            let point = ProgressPoint {
                date: workout.date,
                weight_kg,
                reps: set.reps,
            };
            let keep_current = by_date.get(&workout.date).is_some_and(|current| {
                current.weight_kg > weight_kg
                    || (current.weight_kg == weight_kg && current.reps >= set.reps)
            });
            if !keep_current {
                by_date.insert(workout.date, point);
            }
        }
    }

    by_date.into_values().collect()
}

/// Catalog entries containing `query`. An empty query returns everything.
pub fn search_catalog<'a>(catalog: &'a [String], query: &str) -> Vec<&'a str> {
    catalog
        .iter()
        .filter(|name| contains_ignore_case(name, query))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Unit, WorkoutSet};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn workout(date: NaiveDate, sets: &[(&str, Option<f64>, u32)]) -> WorkoutRecord {
        WorkoutRecord {
            id: format!("{}-0", date),
            created_at: Utc::now(),
            date,
            plan_key: "A".to_string(),
            plan_name: "Workout A".to_string(),
            unit_at_entry: Unit::Kg,
            sets: sets
                .iter()
                .map(|(name, weight, reps)| WorkoutSet {
                    name: name.to_string(),
                    note: String::new(),
                    done: true,
                    reps: Some(*reps),
                    note_text: String::new(),
                    entered_weight: *weight,
                    weight_kg: *weight,
                })
                .collect(),
        }
    }

    #[test]
    fn test_personal_records_pick_heaviest() {
        let history = vec![
            workout(day(1), &[("Squat", Some(100.0), 8), ("Dip", None, 12)]),
            workout(day(8), &[("Squat", Some(105.0), 6)]),
            workout(day(15), &[("Squat", Some(102.5), 8)]),
        ];

        let records = personal_records(&history);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exercise, "Squat");
        assert_eq!(records[0].weight_kg, 105.0);
        assert_eq!(records[0].date, day(8));
    }

    #[test]
    fn test_personal_record_ties() {
        let history = vec![
            workout(day(1), &[("Row", Some(60.0), 8)]),
            workout(day(2), &[("Row", Some(60.0), 10)]),
            workout(day(3), &[("Row", Some(60.0), 10)]),
        ];

        let records = personal_records(&history);
        assert_eq!(records[0].reps, Some(10));
        assert_eq!(records[0].date, day(2));
    }

    #[test]
    fn test_progress_series_best_per_date() {
        let history = vec![
            workout(day(8), &[("Bench Press", Some(62.5), 6)]),
            workout(day(1), &[("bench  press", Some(60.0), 8), ("Bench Press", Some(55.0), 10)]),
            workout(day(1), &[("Squat", Some(100.0), 8)]),
        ];

        let series = progress_series(&history, " BENCH press ");
        let points: Vec<(NaiveDate, f64)> = series.iter().map(|p| (p.date, p.weight_kg)).collect();
        assert_eq!(points, vec![(day(1), 60.0), (day(8), 62.5)]);
        assert!(progress_series(&history, "").is_empty());
        assert!(progress_series(&history, "Deadlift").is_empty());
    }

    #[test]
    fn test_search_catalog() {
        let catalog = vec!["Bench Press".to_string(), "Leg Press".to_string(), "Squat".to_string()];
        assert_eq!(search_catalog(&catalog, "press"), vec!["Bench Press", "Leg Press"]);
        assert_eq!(search_catalog(&catalog, "").len(), 3);
    }
}
