//! Data models for the workout log.
//!
//! - `WorkoutRecord`, `WorkoutSet`: a saved session and its sets
//! - `Unit`: weight unit the user enters in
//! - `AppState`: the persisted application blob

pub mod workout;

pub use workout::{AppState, Unit, WorkoutRecord, WorkoutSet, LBS_TO_KG};
