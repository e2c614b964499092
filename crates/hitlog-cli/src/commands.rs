//! Command handlers.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Local;
use tracing::{debug, info};

use hitlog_core::cache::{CacheStorage, DiskCacheStorage};
use hitlog_core::catalog::CatalogResolver;
use hitlog_core::progress::{personal_records, progress_series, search_catalog};
use hitlog_core::store::{JsonFileStore, KeyValueStore};
use hitlog_core::utils::{format_date, format_weight, truncate_string};
use hitlog_core::worker::{CacheController, EventOutcome, FetchOutcome, WorkerEvent};
use hitlog_core::{Config, FetchError, Fetcher, Method, NewWorkout, Request, Response, ReqwestFetcher, WorkoutLog};

use crate::cli::{CatalogCommand, Command, LogCommand, WorkerCommand};

/// Sub-directory of the cache dir holding response partitions
const PARTITIONS_DIR: &str = "partitions";

/// Column width for exercise names in tables
const NAME_WIDTH: usize = 28;

pub async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Worker(cmd) => run_worker(cmd, config).await,
        Command::Catalog(cmd) => run_catalog(cmd, config).await,
        Command::Log(cmd) => run_log(cmd, config),
        Command::Records { json } => run_records(json, config),
        Command::Progress { exercise } => run_progress(&exercise, config),
    }
}

/// Stand-in network for offline mode: every fetch fails like a dropped
/// connection, so callers take their cache fallbacks.
struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        Err(FetchError::network(format!("offline mode: {}", request.url)))
    }
}

fn network(config: &Config) -> Result<Arc<dyn Fetcher>> {
    if config.offline_mode {
        return Ok(Arc::new(OfflineFetcher));
    }
    Ok(Arc::new(ReqwestFetcher::new(config.request_timeout())?))
}

fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    Ok(Arc::new(JsonFileStore::new(config.data_dir()?)?))
}

// ============================================================================
// Worker
// ============================================================================

async fn run_worker(cmd: WorkerCommand, config: &Config) -> Result<()> {
    let caches = Arc::new(DiskCacheStorage::new(
        config.cache_dir()?.join(PARTITIONS_DIR),
    )?);
    let controller = CacheController::new(config.worker_config()?, caches.clone(), network(config)?)
        .with_classifier(config.asset_rules());

    match cmd {
        WorkerCommand::Install => {
            let report = controller.install().await?;
            println!("Installed {} entries into {}", report.cached, report.partition);
        }
        WorkerCommand::Activate => {
            controller.handle(WorkerEvent::Install).await?;
            if let EventOutcome::Activated(report) = controller.handle(WorkerEvent::Activate).await? {
                if report.deleted.is_empty() {
                    println!("Activated; no stale partitions");
                } else {
                    println!("Activated; deleted {}", report.deleted.join(", "));
                }
            }
        }
        WorkerCommand::Partitions => {
            let current = controller.config().current_partitions();
            let names = caches.keys().await?;
            if names.is_empty() {
                println!("No cache partitions");
            }
            for name in names {
                let Some(info) = caches.info(&name).await? else {
                    continue;
                };
                let marker = if current.contains(&info.name) { "*" } else { " " };
                println!("{} {:<24} {:>5} entries  {}", marker, info.name, info.entries, info.age);
            }
        }
        WorkerCommand::Fetch { path, html, method } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("Invalid HTTP method: {}", method))?;
            let url = controller
                .config()
                .origin
                .join(&path)
                .with_context(|| format!("Invalid path: {}", path))?;
            let mut request = if html {
                Request::navigation(url)
            } else {
                Request::get(url)
            };
            request.method = method;

            if !controller.resume().await? {
                info!("Controller not installed; requests pass through");
            }

            match controller.handle(WorkerEvent::Fetch(request.clone())).await? {
                EventOutcome::Fetch(FetchOutcome::Respond {
                    route,
                    source,
                    response,
                }) => {
                    println!(
                        "{} {:?} via {:?}: {} bytes",
                        response.status,
                        route,
                        source,
                        response.body.len()
                    );
                }
                _ => {
                    let response = network(config)?.fetch(&request).await?;
                    println!(
                        "{} passthrough: {} bytes",
                        response.status,
                        response.body.len()
                    );
                }
            }
            controller.settle().await;
        }
    }
    Ok(())
}

// ============================================================================
// Catalog
// ============================================================================

async fn run_catalog(cmd: CatalogCommand, config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let log = WorkoutLog::load(store.clone());
    let mut resolver = CatalogResolver::new(store);

    resolver.hydrate();
    eprintln!(
        "Starting with {:?} list ({} exercises), refreshing...",
        resolver.source(),
        resolver.base().len()
    );

    let _refresh = resolver.start_refresh(network(config)?, config.catalog_endpoint()?);
    resolver.wait_refresh().await;
    debug!(source = ?resolver.source(), loading = resolver.is_loading(), "Catalog resolved");

    if let Some(notice) = resolver.notice() {
        eprintln!("{}", notice);
    }

    let merged = resolver.merged(log.history());
    let query = cmd.search.unwrap_or_default();
    for name in search_catalog(&merged, &query) {
        println!("{}", name);
    }
    Ok(())
}

// ============================================================================
// Workout log
// ============================================================================

fn run_log(cmd: LogCommand, config: &Config) -> Result<()> {
    let mut log = WorkoutLog::load(open_store(config)?);

    match cmd {
        LogCommand::Add {
            plan_key,
            plan_name,
            date,
            sets,
        } => {
            let record = log.save_workout(NewWorkout {
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                plan_key,
                plan_name,
                sets,
            })?;
            println!("Saved workout {} ({} sets)", record.id, record.sets.len());
        }
        LogCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(log.history())?);
                return Ok(());
            }
            if log.history().is_empty() {
                println!("No workouts logged");
            }
            let unit = log.unit();
            for workout in log.history() {
                println!(
                    "{}  {}  {}",
                    workout.id,
                    format_date(workout.date),
                    workout.plan_name
                );
                for set in &workout.sets {
                    let reps = set.reps.map(|r| r.to_string()).unwrap_or_else(|| "-".into());
                    println!(
                        "    {:<width$} {:>10} x {:<3} {}",
                        truncate_string(&set.name, NAME_WIDTH),
                        format_weight(set.weight_kg, unit),
                        reps,
                        set.note_text,
                        width = NAME_WIDTH
                    );
                }
            }
        }
        LogCommand::Delete { id } => {
            if !log.delete_workout(&id)? {
                bail!("No workout with id {}", id);
            }
            println!("Deleted workout {}", id);
        }
        LogCommand::Unit { unit } => {
            log.set_unit(unit)?;
            println!("Entering weights in {}", unit);
        }
    }
    Ok(())
}

fn run_records(json: bool, config: &Config) -> Result<()> {
    let log = WorkoutLog::load(open_store(config)?);
    let records = personal_records(log.history());

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No weighted sets logged");
    }
    for record in records {
        let reps = record.reps.map(|r| format!("x {}", r)).unwrap_or_default();
        println!(
            "{:<width$} {:>10} {:<5} {}",
            truncate_string(&record.exercise, NAME_WIDTH),
            format_weight(Some(record.weight_kg), log.unit()),
            reps,
            format_date(record.date),
            width = NAME_WIDTH
        );
    }
    Ok(())
}

fn run_progress(exercise: &str, config: &Config) -> Result<()> {
    let log = WorkoutLog::load(open_store(config)?);
    let series = progress_series(log.history(), exercise);

    if series.is_empty() {
        println!("No weighted sets logged for {}", exercise);
    }
    for point in series {
        let reps = point.reps.map(|r| format!("x {}", r)).unwrap_or_default();
        println!(
            "{}  {:>10} {}",
            format_date(point.date),
            format_weight(Some(point.weight_kg), log.unit()),
            reps
        );
    }
    Ok(())
}
