//! Command-line interface definitions for the `hitlog` binary.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use hitlog_core::models::Unit;
use hitlog_core::NewSet;

/// hitlog - offline-first high-intensity training log
#[derive(Debug, Parser)]
#[command(name = "hitlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Never touch the network; serve everything from cache
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Drive the offline cache controller
    #[command(subcommand)]
    Worker(WorkerCommand),

    /// Resolve and print the exercise catalog
    Catalog(CatalogCommand),

    /// Record and browse workouts
    #[command(subcommand)]
    Log(LogCommand),

    /// Show the heaviest set logged for every exercise
    Records {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show best weight per workout date for one exercise
    Progress {
        /// Exercise name (case and spacing are ignored)
        exercise: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Seed the static partition with the application shell
    Install,

    /// Install the current version, then delete partitions from other versions
    Activate,

    /// List cache partitions with entry counts and age
    Partitions,

    /// Route one request through the controller
    Fetch {
        /// Path on the app origin, e.g. /index.html
        path: String,

        /// Send as a document navigation (Accept: text/html)
        #[arg(long)]
        html: bool,

        /// HTTP method
        #[arg(long, default_value = "GET")]
        method: String,
    },
}

#[derive(Debug, Args)]
pub struct CatalogCommand {
    /// Only print exercises containing this text
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// Save a workout
    Add {
        #[arg(long)]
        plan_key: String,

        #[arg(long)]
        plan_name: String,

        /// Workout date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// A set as "Name:weight:reps[:note]"; weight and reps may be empty
        #[arg(long = "set", value_name = "SET", value_parser = parse_set, required = true)]
        sets: Vec<NewSet>,
    },

    /// List saved workouts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a workout by id
    Delete { id: String },

    /// Set the unit new weights are entered in
    Unit { unit: Unit },
}

/// Parse `Name:weight:reps[:note]`.
pub fn parse_set(s: &str) -> Result<NewSet, String> {
    let mut parts = s.splitn(4, ':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(format!("set has no exercise name: {:?}", s));
    }

    let weight = match parts.next().map(str::trim).filter(|w| !w.is_empty()) {
        Some(w) => Some(
            w.parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w >= 0.0)
                .ok_or_else(|| format!("invalid weight {:?} in set {:?}", w, s))?,
        ),
        None => None,
    };

    let reps = match parts.next().map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => Some(
            r.parse::<u32>()
                .map_err(|_| format!("invalid reps {:?} in set {:?}", r, s))?,
        ),
        None => None,
    };

    Ok(NewSet {
        name: name.to_string(),
        done: true,
        reps,
        note_text: parts.next().unwrap_or_default().trim().to_string(),
        weight,
        ..NewSet::default()
    })
}
