//! The offline cache controller.
//!
//! `CacheController` plays the part of a service worker: it seeds the static
//! partition on install, purges stale partitions on activate, and answers
//! intercepted requests with a per-route caching strategy. The network and the
//! cache storage are injected, so the whole controller runs without a browser.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::WorkerConfig;
use super::lifecycle::{Lifecycle, LifecycleState};
use super::routing::{self, AssetClassifier, AssetRules, Route};
use super::WorkerError;
use crate::cache::{CacheStorage, MatchOptions};
use crate::net::{Fetcher, Request, Response};

/// Lifecycle and fetch events delivered to the controller.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
}

#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Fetch(FetchOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub partition: String,
    pub cached: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// The cached shell document, served in place of a failed navigation.
    Shell,
    /// Made up by the controller because nothing else was available.
    Synthetic,
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted: the caller performs the request itself.
    Passthrough,
    Respond {
        route: Route,
        source: ResponseSource,
        response: Response,
    },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { source, .. } => Some(*source),
        }
    }
}

/// Fire-and-forget work (cache writes, revalidation) that `settle` can await.
#[derive(Debug, Clone, Default)]
struct BackgroundTasks {
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackgroundTasks {
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        match self.handles.lock() {
            Ok(mut handles) => {
                handles.retain(|h| !h.is_finished());
                handles.push(handle);
            }
            Err(_) => warn!("Background task list poisoned; task left untracked"),
        }
    }

    async fn settle(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = match self.handles.lock() {
                Ok(mut handles) => handles.drain(..).collect(),
                Err(_) => return,
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    warn!(error = %e, "Background cache task panicked");
                }
            }
        }
    }
}

pub struct CacheController {
    config: WorkerConfig,
    classifier: Arc<dyn AssetClassifier>,
    caches: Arc<dyn CacheStorage>,
    network: Arc<dyn Fetcher>,
    lifecycle: Mutex<Lifecycle>,
    background: BackgroundTasks,
}

impl CacheController {
    pub fn new(
        config: WorkerConfig,
        caches: Arc<dyn CacheStorage>,
        network: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            config,
            classifier: Arc::new(AssetRules::default()),
            caches,
            network,
            lifecycle: Mutex::new(Lifecycle::new()),
            background: BackgroundTasks::default(),
        }
    }

    /// Replace the default path rules used to spot static assets.
    pub fn with_classifier(mut self, classifier: impl AssetClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.with_lifecycle(|l| l.state)
            .unwrap_or(LifecycleState::Redundant)
    }

    pub fn skip_waiting(&self) -> bool {
        self.with_lifecycle(|l| l.skip_waiting).unwrap_or(false)
    }

    pub fn clients_claimed(&self) -> bool {
        self.with_lifecycle(|l| l.clients_claimed).unwrap_or(false)
    }

    fn with_lifecycle<R>(&self, f: impl FnOnce(&mut Lifecycle) -> R) -> Option<R> {
        self.lifecycle.lock().ok().map(|mut guard| f(&mut guard))
    }

    fn transition(
        &self,
        operation: &'static str,
        expected: LifecycleState,
        next: LifecycleState,
    ) -> Result<(), WorkerError> {
        // Check and set under one lock
        let outcome = self.with_lifecycle(|l| {
            if l.state != expected {
                return Err(l.state);
            }
            l.state = next;
            Ok(())
        });
        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(actual)) => Err(WorkerError::InvalidState {
                operation,
                expected,
                actual,
            }),
            None => Err(WorkerError::InvalidState {
                operation,
                expected,
                actual: LifecycleState::Redundant,
            }),
        }
    }

    fn set_state(&self, next: LifecycleState) {
        self.with_lifecycle(|l| l.state = next);
    }

    /// Dispatch one event.
    pub async fn handle(&self, event: WorkerEvent) -> Result<EventOutcome, WorkerError> {
        match event {
            WorkerEvent::Install => self.install().await.map(EventOutcome::Installed),
            WorkerEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            WorkerEvent::Fetch(request) => Ok(EventOutcome::Fetch(self.handle_fetch(request).await)),
        }
    }

    /// Wait for every cache write and revalidation started so far.
    pub async fn settle(&self) {
        self.background.settle().await;
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Seed the static partition with the shell manifest.
    ///
    /// All-or-nothing: if any manifest URL fails to fetch (or answers with a
    /// non-success status) nothing is written and the controller becomes
    /// redundant.
    pub async fn install(&self) -> Result<InstallReport, WorkerError> {
        self.transition("install", LifecycleState::Parsed, LifecycleState::Installing)?;

        match self.populate_static().await {
            Ok(report) => {
                self.with_lifecycle(|l| {
                    l.state = LifecycleState::Installed;
                    l.skip_waiting = true;
                });
                info!(partition = %report.partition, cached = report.cached, "Install complete");
                Ok(report)
            }
            Err(e) => {
                self.set_state(LifecycleState::Redundant);
                warn!(error = %e, "Install failed");
                Err(e)
            }
        }
    }

    async fn populate_static(&self) -> Result<InstallReport, WorkerError> {
        let requests = self
            .config
            .shell_manifest
            .iter()
            .map(|path| self.config.request_for(path))
            .collect::<Result<Vec<_>, _>>()?;

        let fetches = requests.iter().map(|request| async move {
            match self.network.fetch(request).await {
                Ok(response) if response.is_success() => Ok((request, response)),
                Ok(response) => Err(WorkerError::InstallFailed {
                    url: request.url.to_string(),
                    reason: format!("status {}", response.status),
                }),
                Err(e) => Err(WorkerError::InstallFailed {
                    url: request.url.to_string(),
                    reason: e.to_string(),
                }),
            }
        });
        let fetched = try_join_all(fetches).await?;

        let partition = self.config.static_partition();
        for (request, response) in &fetched {
            self.caches.put(&partition, request, response).await?;
        }

        Ok(InstallReport {
            partition,
            cached: fetched.len(),
        })
    }

    /// Purge partitions from older versions, then claim open clients.
    pub async fn activate(&self) -> Result<ActivationReport, WorkerError> {
        self.transition("activate", LifecycleState::Installed, LifecycleState::Activating)?;

        match self.purge_stale_partitions().await {
            Ok(deleted) => {
                self.with_lifecycle(|l| {
                    l.state = LifecycleState::Activated;
                    l.clients_claimed = true;
                });
                info!(deleted = deleted.len(), "Activated and claimed clients");
                Ok(ActivationReport { deleted })
            }
            Err(e) => {
                // Back to installed so activation can be retried
                self.set_state(LifecycleState::Installed);
                Err(e)
            }
        }
    }

    /// Restart an already-installed controller.
    ///
    /// When the current static partition exists from an earlier run, the
    /// controller runs the activation cleanup and goes straight to activated
    /// (as a browser does with an active worker on reload) and returns `true`.
    /// Otherwise nothing changes.
    pub async fn resume(&self) -> Result<bool, WorkerError> {
        let partition = self.config.static_partition();
        if self.state() != LifecycleState::Parsed
            || !self.caches.keys().await?.contains(&partition)
        {
            return Ok(false);
        }

        self.transition("resume", LifecycleState::Parsed, LifecycleState::Activating)?;
        match self.purge_stale_partitions().await {
            Ok(deleted) => {
                self.with_lifecycle(|l| {
                    l.state = LifecycleState::Activated;
                    l.skip_waiting = true;
                    l.clients_claimed = true;
                });
                debug!(partition = %partition, deleted = deleted.len(), "Resumed installed controller");
                Ok(true)
            }
            Err(e) => {
                self.set_state(LifecycleState::Parsed);
                Err(e)
            }
        }
    }

    async fn purge_stale_partitions(&self) -> Result<Vec<String>, WorkerError> {
        let current = self.config.current_partitions();
        let mut deleted = Vec::new();
        for name in self.caches.keys().await? {
            if current.contains(&name) {
                continue;
            }
            if self.caches.delete(&name).await? {
                debug!(partition = %name, "Deleted stale partition");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    // =========================================================================
    // Fetch interception
    // =========================================================================

    /// Answer a request from the page. Only GET requests are intercepted, and
    /// only once the controller is active.
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        if self.state() != LifecycleState::Activated {
            return FetchOutcome::Passthrough;
        }
        let Some(route) = routing::route(&request, self.classifier.as_ref()) else {
            return FetchOutcome::Passthrough;
        };

        let url = request.url.to_string();
        let (response, source) = match route {
            Route::Document => self.network_first_document(request).await,
            Route::Asset => self.stale_while_revalidate(request).await,
            Route::Network => self.network_with_cache_fallback(request).await,
        };
        debug!(url = %url, ?route, ?source, status = response.status, "Served request");

        FetchOutcome::Respond {
            route,
            source,
            response,
        }
    }

    async fn network_first_document(&self, request: Request) -> (Response, ResponseSource) {
        match self.network.fetch(&request).await {
            Ok(fresh) => {
                if fresh.is_success() {
                    self.spawn_put(self.config.html_partition(), request, fresh.clone());
                }
                (fresh, ResponseSource::Network)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Document fetch failed, falling back to cache");
                let html = self.config.html_partition();
                let cached = self
                    .caches
                    .match_in(&html, &request, MatchOptions::ignoring_search())
                    .await;
                if let Some(cached) = cache_hit(cached, &html) {
                    return (cached, ResponseSource::Cache);
                }

                match self.config.shell_request() {
                    Ok(shell) => {
                        let found = self.caches.match_any(&shell, MatchOptions::default()).await;
                        if let Some(shell) = cache_hit(found, "shell") {
                            return (shell, ResponseSource::Shell);
                        }
                    }
                    Err(e) => warn!(error = %e, "Shell document path is invalid"),
                }

                (Response::offline(), ResponseSource::Synthetic)
            }
        }
    }

    async fn stale_while_revalidate(&self, request: Request) -> (Response, ResponseSource) {
        let partition = self.config.static_partition();
        let found = self
            .caches
            .match_in(&partition, &request, MatchOptions::default())
            .await;
        let cached = cache_hit(found, &partition);

        let revalidate = {
            let caches = Arc::clone(&self.caches);
            let network = Arc::clone(&self.network);
            let background = self.background.clone();
            tokio::spawn(async move {
                match network.fetch(&request).await {
                    Ok(fresh) => {
                        if fresh.is_success() {
                            let copy = fresh.clone();
                            background.spawn(async move {
                                put_best_effort(caches.as_ref(), &partition, &request, &copy).await;
                            });
                        }
                        Some(fresh)
                    }
                    Err(e) => {
                        debug!(url = %request.url, error = %e, "Asset revalidation failed");
                        None
                    }
                }
            })
        };

        match cached {
            Some(cached) => {
                self.background.spawn(async move {
                    let _ = revalidate.await;
                });
                (cached, ResponseSource::Cache)
            }
            None => match revalidate.await {
                Ok(Some(fresh)) => (fresh, ResponseSource::Network),
                _ => (Response::gateway_timeout(), ResponseSource::Synthetic),
            },
        }
    }

    async fn network_with_cache_fallback(&self, request: Request) -> (Response, ResponseSource) {
        match self.network.fetch(&request).await {
            Ok(response) => (response, ResponseSource::Network),
            Err(e) => {
                debug!(url = %request.url, error = %e, "Fetch failed, trying any cache");
                let found = self.caches.match_any(&request, MatchOptions::default()).await;
                match cache_hit(found, "any") {
                    Some(cached) => (cached, ResponseSource::Cache),
                    None => (Response::gateway_timeout(), ResponseSource::Synthetic),
                }
            }
        }
    }

    fn spawn_put(&self, partition: String, request: Request, response: Response) {
        let caches = Arc::clone(&self.caches);
        self.background.spawn(async move {
            put_best_effort(caches.as_ref(), &partition, &request, &response).await;
        });
    }
}

/// A storage error during a lookup counts as a miss.
fn cache_hit(result: anyhow::Result<Option<Response>>, partition: &str) -> Option<Response> {
    match result {
        Ok(found) => found,
        Err(e) => {
            warn!(partition, error = %e, "Cache lookup failed");
            None
        }
    }
}

async fn put_best_effort(
    caches: &dyn CacheStorage,
    partition: &str,
    request: &Request,
    response: &Response,
) {
    if let Err(e) = caches.put(partition, request, response).await {
        debug!(partition, url = %request.url, error = %e, "Cache write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStorage;
    use crate::testing::ScriptedFetcher;
    use crate::worker::config::SHELL_MANIFEST;
    use reqwest::{Method, Url};

    const ORIGIN: &str = "https://hit.example/";

    fn url(path: &str) -> String {
        format!("https://hit.example{}", path)
    }

    fn get(path: &str) -> Request {
        Request::parse(Method::GET, &url(path)).unwrap()
    }

    fn navigate(path: &str) -> Request {
        Request::navigation(Url::parse(&url(path)).unwrap())
    }

    fn setup() -> (CacheController, Arc<ScriptedFetcher>, Arc<MemoryCacheStorage>) {
        let network = Arc::new(ScriptedFetcher::new());
        let caches = Arc::new(MemoryCacheStorage::new());
        let config = WorkerConfig::new(Url::parse(ORIGIN).unwrap());
        let controller = CacheController::new(config, caches.clone(), network.clone());
        (controller, network, caches)
    }

    fn serve_shell(network: &ScriptedFetcher) {
        for path in SHELL_MANIFEST {
            network.respond(&url(path), Response::ok(format!("shell {}", path)));
        }
    }

    async fn active() -> (CacheController, Arc<ScriptedFetcher>, Arc<MemoryCacheStorage>) {
        let (controller, network, caches) = setup();
        serve_shell(&network);
        controller.install().await.unwrap();
        controller.activate().await.unwrap();
        (controller, network, caches)
    }

    fn served(outcome: &FetchOutcome) -> (ResponseSource, &Response) {
        match outcome {
            FetchOutcome::Respond {
                source, response, ..
            } => (*source, response),
            FetchOutcome::Passthrough => panic!("expected an intercepted response"),
        }
    }

    #[tokio::test]
    async fn test_install_seeds_static_partition() {
        let (controller, network, caches) = setup();
        serve_shell(&network);

        let report = controller.install().await.unwrap();

        assert_eq!(report.partition, "hit-static-v3");
        assert_eq!(report.cached, SHELL_MANIFEST.len());
        assert_eq!(controller.state(), LifecycleState::Installed);
        assert!(controller.skip_waiting());
        assert_eq!(caches.keys().await.unwrap(), vec!["hit-static-v3"]);
        let shell = caches
            .match_in("hit-static-v3", &get("/index.html"), MatchOptions::default())
            .await
            .unwrap()
            .expect("shell cached");
        assert_eq!(shell.text(), "shell /index.html");
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let (controller, network, caches) = setup();
        serve_shell(&network);
        network.respond(&url("/splash.png"), Response::new(404, "missing"));

        let err = controller.install().await.unwrap_err();

        assert!(matches!(err, WorkerError::InstallFailed { ref url, .. } if url.ends_with("/splash.png")));
        assert_eq!(controller.state(), LifecycleState::Redundant);
        assert!(caches.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_fails_when_offline() {
        let (controller, _network, caches) = setup();

        assert!(controller.install().await.is_err());
        assert!(caches.keys().await.unwrap().is_empty());
        // A redundant controller cannot be installed again
        assert!(matches!(
            controller.install().await,
            Err(WorkerError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_resume_requires_current_static_partition() {
        let (controller, _network, caches) = setup();
        assert!(!controller.resume().await.unwrap());
        assert_eq!(controller.state(), LifecycleState::Parsed);

        caches
            .put("hit-static-v3", &get("/index.html"), &Response::ok("shell"))
            .await
            .unwrap();
        assert!(controller.resume().await.unwrap());
        assert_eq!(controller.state(), LifecycleState::Activated);
        assert!(controller.clients_claimed());

        let outcome = controller.handle_fetch(get("/unnamed-192.png")).await;
        assert!(matches!(outcome, FetchOutcome::Respond { .. }));
    }

    #[tokio::test]
    async fn test_resume_purges_stale_partitions() {
        let (controller, network, caches) = setup();
        caches
            .put("hit-static-v2", &get("/data.json"), &Response::ok("stale v2 data"))
            .await
            .unwrap();
        caches
            .put("hit-static-v3", &get("/index.html"), &Response::ok("shell"))
            .await
            .unwrap();

        assert!(controller.resume().await.unwrap());
        assert_eq!(caches.keys().await.unwrap(), vec!["hit-static-v3"]);

        network.go_offline();
        let outcome = controller.handle_fetch(get("/data.json")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Synthetic);
        assert_eq!(response.status, 504);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_install_runs_once() {
        let (controller, network, _caches) = setup();
        serve_shell(&network);
        let controller = Arc::new(controller);

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move { controller.install().await.is_ok() })
            })
            .collect();
        let mut succeeded = 0;
        for attempt in attempts {
            if attempt.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(network.calls_to(&url("/index.html")), 1);
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let (controller, _network, _caches) = setup();

        let err = controller.activate().await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::InvalidState {
                expected: LifecycleState::Installed,
                actual: LifecycleState::Parsed,
                ..
            }
        ));
        assert!(!controller.clients_claimed());
    }

    #[tokio::test]
    async fn test_activate_purges_every_other_partition() {
        let (controller, network, caches) = setup();
        serve_shell(&network);
        let req = get("/");
        for stale in ["hit-static-v2", "hit-html-v2", "unrelated"] {
            caches.put(stale, &req, &Response::ok("old")).await.unwrap();
        }
        caches.put("hit-html-v3", &req, &Response::ok("current")).await.unwrap();

        controller.install().await.unwrap();
        let report = controller.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["hit-static-v2", "hit-html-v2", "unrelated"]);
        let current = controller.config().current_partitions();
        for name in caches.keys().await.unwrap() {
            assert!(current.contains(&name), "stale partition {} survived", name);
        }
        assert_eq!(controller.state(), LifecycleState::Activated);
        assert!(controller.clients_claimed());
    }

    #[tokio::test]
    async fn test_requests_pass_through_until_active() {
        let (controller, network, _caches) = setup();
        serve_shell(&network);

        assert!(matches!(
            controller.handle_fetch(get("/app.js")).await,
            FetchOutcome::Passthrough
        ));
        controller.install().await.unwrap();
        assert!(matches!(
            controller.handle_fetch(get("/app.js")).await,
            FetchOutcome::Passthrough
        ));
        assert_eq!(network.calls_to(&url("/app.js")), 0);
    }

    #[tokio::test]
    async fn test_non_get_passes_through() {
        let (controller, _network, _caches) = active().await;
        let post = Request::parse(Method::POST, &url("/api/sync")).unwrap();

        assert!(matches!(
            controller.handle_fetch(post).await,
            FetchOutcome::Passthrough
        ));
    }

    #[tokio::test]
    async fn test_document_network_first_writes_back() {
        let (controller, network, caches) = active().await;
        network.respond(&url("/workouts?day=1"), Response::ok("<html>workouts</html>"));

        let outcome = controller.handle_fetch(navigate("/workouts?day=1")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Network);
        assert_eq!(response.text(), "<html>workouts</html>");

        controller.settle().await;
        let stored = caches
            .match_in("hit-html-v3", &navigate("/workouts?day=1"), MatchOptions::default())
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_document_fallback_chain() {
        let (controller, network, caches) = active().await;
        network.respond(&url("/workouts?day=1"), Response::ok("<html>workouts</html>"));
        controller.handle_fetch(navigate("/workouts?day=1")).await;
        controller.settle().await;
        network.go_offline();

        // Cached document for the same path, different query
        let outcome = controller.handle_fetch(navigate("/workouts?day=2")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Cache);
        assert_eq!(response.text(), "<html>workouts</html>");

        // Nothing cached for this path: the shell
        let outcome = controller.handle_fetch(navigate("/progress")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Shell);
        assert_eq!(response.text(), "shell /index.html");

        // Neither: synthesized 503
        caches.delete("hit-static-v3").await.unwrap();
        let outcome = controller.handle_fetch(navigate("/progress")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Synthetic);
        assert_eq!(response.status, 503);
        assert_eq!(response.text(), "Offline");
    }

    #[tokio::test]
    async fn test_offline_document_prefers_latest_matching_entry() {
        let (controller, network, _caches) = active().await;
        network.respond(&url("/w?day=1"), Response::ok("day1"));
        network.respond(&url("/w?day=2"), Response::ok("day2"));
        controller.handle_fetch(navigate("/w?day=1")).await;
        controller.settle().await;
        controller.handle_fetch(navigate("/w?day=2")).await;
        controller.settle().await;
        network.go_offline();

        let outcome = controller.handle_fetch(navigate("/w?day=2")).await;
        assert_eq!(served(&outcome).1.text(), "day2");
        let outcome = controller.handle_fetch(navigate("/w?day=1")).await;
        assert_eq!(served(&outcome).1.text(), "day1");
        let outcome = controller.handle_fetch(navigate("/w?day=9")).await;
        assert_eq!(served(&outcome).1.text(), "day2");
    }

    #[tokio::test]
    async fn test_document_error_status_is_served_but_not_cached() {
        let (controller, network, caches) = active().await;
        network.respond(&url("/broken"), Response::new(500, "boom"));

        let outcome = controller.handle_fetch(navigate("/broken")).await;
        assert_eq!(served(&outcome).1.status, 500);

        controller.settle().await;
        assert!(caches.info("hit-html-v3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_serves_cache_then_refreshes() {
        let (controller, network, caches) = active().await;
        network.respond(&url("/unnamed-192.png"), Response::ok("new icon"));

        let outcome = controller.handle_fetch(get("/unnamed-192.png")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Cache);
        assert_eq!(response.text(), "shell /unnamed-192.png");

        controller.settle().await;
        let refreshed = caches
            .match_in("hit-static-v3", &get("/unnamed-192.png"), MatchOptions::default())
            .await
            .unwrap()
            .expect("still cached");
        assert_eq!(refreshed.text(), "new icon");
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_without_cache() {
        let (controller, network, _caches) = active().await;
        network.respond(&url("/src/main.jsx"), Response::ok("bundle"));

        let outcome = controller.handle_fetch(get("/src/main.jsx")).await;
        assert_eq!(served(&outcome).0, ResponseSource::Network);
        controller.settle().await;

        network.go_offline();
        let outcome = controller.handle_fetch(get("/src/main.jsx")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Cache);
        assert_eq!(response.text(), "bundle");

        let outcome = controller.handle_fetch(get("/src/never-seen.js")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Synthetic);
        assert_eq!(response.status, 504);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_other_requests_are_network_first_without_caching() {
        let (controller, network, caches) = active().await;
        network.respond(&url("/exercises.json"), Response::ok("{\"exercises\":[]}"));

        let outcome = controller.handle_fetch(get("/exercises.json")).await;
        assert_eq!(served(&outcome).0, ResponseSource::Network);
        controller.settle().await;
        assert!(caches
            .match_any(&get("/exercises.json"), MatchOptions::default())
            .await
            .unwrap()
            .is_none());

        network.go_offline();
        let outcome = controller.handle_fetch(get("/exercises.json")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Synthetic);
        assert_eq!(response.status, 504);

        // Served from whatever partition holds it
        let outcome = controller.handle_fetch(get("/")).await;
        let (source, response) = served(&outcome);
        assert_eq!(source, ResponseSource::Cache);
        assert_eq!(response.text(), "shell /");
    }

    #[tokio::test]
    async fn test_custom_classifier() {
        let (controller, network, _caches) = setup();
        let controller = controller.with_classifier(|url: &Url| url.path().starts_with("/static/"));
        serve_shell(&network);
        controller.install().await.unwrap();
        controller.activate().await.unwrap();

        let outcome = controller.handle_fetch(get("/unnamed-192.png")).await;
        match outcome {
            FetchOutcome::Respond { route, .. } => assert_eq!(route, Route::Network),
            FetchOutcome::Passthrough => panic!("expected interception"),
        }
    }

    #[tokio::test]
    async fn test_handle_dispatches_events() {
        let (controller, network, _caches) = setup();
        serve_shell(&network);

        let installed = controller.handle(WorkerEvent::Install).await.unwrap();
        assert!(matches!(installed, EventOutcome::Installed(_)));
        let activated = controller.handle(WorkerEvent::Activate).await.unwrap();
        assert!(matches!(activated, EventOutcome::Activated(_)));

        network.go_offline();
        let fetched = controller
            .handle(WorkerEvent::Fetch(navigate("/")))
            .await
            .unwrap();
        match fetched {
            EventOutcome::Fetch(outcome) => assert_eq!(outcome.source(), Some(ResponseSource::Shell)),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
