//! Workout history persistence.
//!
//! `WorkoutLog` owns the `AppState` blob and writes it back through the
//! key-value store after every change.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::models::{AppState, Unit, WorkoutRecord, WorkoutSet};
use crate::store::KeyValueStore;

/// Store key of the persisted application state.
pub const STATE_KEY: &str = "hitlog.state";

/// A set as entered, before weights are normalized to kilograms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSet {
    pub name: String,
    pub note: String,
    pub done: bool,
    pub reps: Option<u32>,
    pub note_text: String,
    pub weight: Option<f64>,
}

/// A workout as entered, in the log's current unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub date: NaiveDate,
    pub plan_key: String,
    pub plan_name: String,
    pub sets: Vec<NewSet>,
}

pub struct WorkoutLog {
    store: Arc<dyn KeyValueStore>,
    state: AppState,
}

impl WorkoutLog {
    /// Load the persisted state. Missing or unreadable state starts empty.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let state = match store.get(STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AppState>(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Ignoring corrupt app state");
                    AppState::default()
                }
            },
            Ok(None) => AppState::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read app state");
                AppState::default()
            }
        };
        debug!(workouts = state.history.len(), unit = %state.unit, "Loaded workout log");
        Self { store, state }
    }

    pub fn unit(&self) -> Unit {
        self.state.unit
    }

    pub fn history(&self) -> &[WorkoutRecord] {
        &self.state.history
    }

    pub fn find(&self, id: &str) -> Option<&WorkoutRecord> {
        self.state.history.iter().find(|w| w.id == id)
    }

    /// Every set name in the history, deduplicated and sorted.
    pub fn exercise_names(&self) -> Vec<String> {
        self.state
            .history
            .iter()
            .flat_map(|w| w.sets.iter())
            .filter(|s| !s.name.trim().is_empty())
            .map(|s| s.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Record a workout, converting entered weights to kilograms.
    pub fn save_workout(&mut self, workout: NewWorkout) -> Result<WorkoutRecord> {
        let unit = self.state.unit;
        let now = Utc::now();
        let record = WorkoutRecord {
            id: new_workout_id(now.timestamp_millis()),
            created_at: now,
            date: workout.date,
            plan_key: workout.plan_key,
            plan_name: workout.plan_name,
            unit_at_entry: unit,
            sets: workout
                .sets
                .into_iter()
                .map(|set| WorkoutSet {
                    name: set.name,
                    note: set.note,
                    done: set.done,
                    reps: set.reps,
                    note_text: set.note_text,
                    entered_weight: set.weight,
                    weight_kg: set.weight.map(|w| unit.to_kg(w)),
                })
                .collect(),
        };

        let mut next = self.state.clone();
        next.history.push(record.clone());
        self.commit(next)?;
        info!(id = %record.id, sets = record.sets.len(), "Saved workout");
        Ok(record)
    }

    /// Remove a workout by id. Returns whether it existed.
    pub fn delete_workout(&mut self, id: &str) -> Result<bool> {
        if self.find(id).is_none() {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.history.retain(|w| w.id != id);
        self.commit(next)?;
        info!(id, "Deleted workout");
        Ok(true)
    }

    /// Change the entry unit. Saved workouts keep the unit they were entered in.
    pub fn set_unit(&mut self, unit: Unit) -> Result<()> {
        let next = AppState {
            unit,
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Write `next` to the store, then adopt it. On error the in-memory state
    /// is left as it was.
    fn commit(&mut self, next: AppState) -> Result<()> {
        let json = serde_json::to_string(&next).context("Failed to serialize app state")?;
        self.store
            .set(STATE_KEY, &json)
            .context("Failed to save app state")?;
        self.state = next;
        Ok(())
    }
}

fn new_workout_id(millis: i64) -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{}-{:08x}", millis, suffix)
}
