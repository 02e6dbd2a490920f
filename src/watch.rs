//! # Watch Service - Regenerate on Change
//!
//! [`VocabWatcher`] keeps generated artifacts in step with their vocabulary sources. It owns a
//! tokio runtime, an [`ArtifactOrchestrator`] and a debounced file system watcher over every
//! local input resource and the configuration file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vocabgen_core::{
//!     artifact::JsonRenderer,
//!     config::YamlConfigProvider,
//!     event::GenerationEvent,
//!     orchestrator::ArtifactOrchestrator,
//!     watch::VocabWatcher,
//! };
//! use std::{path::PathBuf, sync::{mpsc::channel, Arc}};
//!
//! let provider = Arc::new(YamlConfigProvider::new(PathBuf::from("vocab.yml")));
//! let orchestrator = ArtifactOrchestrator::from_provider(provider, Arc::new(JsonRenderer))?;
//!
//! let (tx, rx) = channel::<GenerationEvent>();
//! let watcher = VocabWatcher::new(orchestrator, tx)?;
//! watcher.watch()?;
//!
//! for event in rx {
//!     match event {
//!         GenerationEvent::Generated(report) => println!("wrote {:?}", report.artifacts),
//!         GenerationEvent::Failed { error, .. } => eprintln!("generation failed: {error}"),
//!         _ => {}
//!     }
//! }
//! # Ok::<(), vocabgen_core::VocabError>(())
//! ```
//!
//! ## Cycles
//!
//! `watch()` runs one generation cycle before returning, then the watcher reacts to changes:
//!
//! - a change to a `.yml`/`.yaml` file reloads the configuration and forces one regeneration;
//!   the orchestrator's previous force setting is restored afterwards
//! - a change to any other watched file invalidates exactly that resource in the cache before
//!   regenerating
//!
//! Online resources are not observed. With [`VocabWatcher::with_poll_interval`] the watcher
//! also runs a staleness-respecting cycle periodically, which picks up remote changes through
//! their `Last-Modified` header.
//!
//! ## Threading Model
//!
//! 1. **Debouncer thread** (from `notify-debouncer-full`): batches file system events, records
//!    changed paths in a pending set and signals the worker
//! 2. **Worker task**: waits for the signal, drains the pending set and runs one cycle
//!
//! The signal holds at most one permit, so any number of events arriving while a cycle is in
//! flight produce exactly one follow-up cycle.
//!
//! ## Error Handling
//!
//! A failing cycle never stops the watcher. The error is logged, counted, and emitted as
//! [`GenerationEvent::Failed`]; the next change triggers a fresh attempt.

use notify_debouncer_full::{
    new_debouncer,
    notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher},
    DebounceEventResult, Debouncer, FileIdMap,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
    result::Result,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::Sender,
        Arc,
    },
    time::Duration,
};
use tokio::{runtime::Runtime, sync::Notify, task::JoinHandle};

use crate::{
    config::GeneratorConfig,
    error::VocabError,
    event::GenerationEvent,
    orchestrator::{ArtifactOrchestrator, GenerationOutcome},
    resource::is_online,
};

type VocabDebouncer = Debouncer<RecommendedWatcher, FileIdMap>;

/// Cycle state: `Idle -> Generating -> (Settled | Failed) -> Idle`. `Settled` and `Failed`
/// last only while the cycle's event is emitted; [`VocabWatcher::last_outcome`] keeps the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchState {
    #[default]
    Idle,
    Generating,
    Settled,
    Failed,
}

fn is_config_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
        .unwrap_or(false)
}

/// Canonical directory plus file name, so paths reported by the watcher and paths taken from
/// the configuration compare equal. The file itself need not exist.
fn normalize_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|dir| dir.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Watched path → resource id, for every local resource and the configuration file.
fn watch_targets(config: &GeneratorConfig, config_path: Option<&Path>) -> HashMap<PathBuf, String> {
    let mut targets: HashMap<PathBuf, String> = config
        .resources()
        .into_iter()
        .filter(|resource| !is_online(resource))
        .map(|resource| (normalize_path(Path::new(&resource)), resource))
        .collect();
    if let Some(path) = config_path {
        targets.insert(normalize_path(path), path.to_string_lossy().to_string());
    }
    targets
}

/// State shared between the debouncer callback, the worker task and the watcher handle.
#[derive(Default)]
struct WatchShared {
    state: RwLock<WatchState>,
    last_outcome: RwLock<Option<GenerationEvent>>,
    failures: AtomicU64,
    cycles: AtomicU64,
    pending: Mutex<Vec<PathBuf>>,
    targets: RwLock<HashMap<PathBuf, String>>,
    watched_dirs: Mutex<BTreeSet<PathBuf>>,
    work_notifier: Notify,
    stopped: AtomicBool,
}

impl WatchShared {
    fn enqueue(&self, path: PathBuf) {
        let mut pending = self.pending.lock();
        if !pending.contains(&path) {
            pending.push(path);
        }
    }

    fn is_target(&self, path: &Path) -> bool {
        self.targets.read().contains_key(path)
    }
}

#[derive(Clone)]
struct CycleContext {
    orchestrator: Arc<tokio::sync::Mutex<ArtifactOrchestrator>>,
    shared: Arc<WatchShared>,
    debouncer: Arc<Mutex<Option<VocabDebouncer>>>,
    event_tx: Sender<GenerationEvent>,
}

impl CycleContext {
    fn emit(&self, event: GenerationEvent) {
        *self.shared.last_outcome.write() = Some(event.clone());
        if self.event_tx.send(event).is_err() {
            tracing::debug!("[VocabWatcher] event receiver dropped");
        }
    }

    /// Watches the parent directory of every target not yet covered.
    fn watch_new_dirs(&self) -> Result<(), VocabError> {
        let mut guard = self.debouncer.lock();
        let Some(debouncer) = guard.as_mut() else {
            return Ok(());
        };
        let dirs: BTreeSet<PathBuf> = self
            .shared
            .targets
            .read()
            .keys()
            .filter_map(|path| path.parent().map(Path::to_path_buf))
            .collect();
        let mut watched = self.shared.watched_dirs.lock();
        for dir in dirs.difference(&watched.clone()) {
            if !dir.exists() {
                tracing::warn!("[VocabWatcher] cannot watch missing directory {:?}", dir);
                continue;
            }
            debouncer.watcher().watch(dir, RecursiveMode::NonRecursive)?;
            tracing::debug!("[VocabWatcher] watching {:?}", dir);
            watched.insert(dir.clone());
        }
        Ok(())
    }

    async fn run_cycle(&self, paths: Vec<PathBuf>) {
        *self.shared.state.write() = WatchState::Generating;
        let cycle = self.shared.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("[VocabWatcher] cycle {cycle}: {} changed paths", paths.len());

        let mut orchestrator = self.orchestrator.lock().await;
        let config_changed = paths.iter().any(|p| is_config_file(p));
        let prior_force = orchestrator.force();

        let result: Result<GenerationOutcome, VocabError> = async {
            if config_changed {
                orchestrator.reload_config()?;
                let targets = watch_targets(
                    orchestrator.config(),
                    orchestrator.config_path().as_deref(),
                );
                *self.shared.targets.write() = targets;
                self.watch_new_dirs()?;
                orchestrator.set_force(true);
            }
            for path in paths.iter().filter(|p| !is_config_file(p)) {
                let resource = self
                    .shared
                    .targets
                    .read()
                    .get(path)
                    .cloned()
                    .unwrap_or_else(|| path.to_string_lossy().to_string());
                orchestrator.invalidate(&resource);
            }
            orchestrator.generate().await
        }
        .await;

        if config_changed {
            orchestrator.set_force(prior_force);
        }
        drop(orchestrator);

        match result {
            Ok(GenerationOutcome::Skipped) => {
                *self.shared.state.write() = WatchState::Settled;
                self.emit(GenerationEvent::Skipped);
            }
            Ok(GenerationOutcome::Generated(report)) => {
                *self.shared.state.write() = WatchState::Settled;
                self.emit(GenerationEvent::Generated(report));
            }
            Err(error) => {
                let failures = self.shared.failures.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::error!("[VocabWatcher] cycle {cycle} failed ({failures} total): {error}");
                *self.shared.state.write() = WatchState::Failed;
                self.emit(GenerationEvent::Failed { error, failures });
            }
        }
        *self.shared.state.write() = WatchState::Idle;
    }
}

pub struct VocabWatcher {
    context: CycleContext,
    runtime: Runtime,
    worker: Mutex<Option<JoinHandle<()>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
    poll_interval: Option<Duration>,
}

impl VocabWatcher {
    pub fn new(
        orchestrator: ArtifactOrchestrator,
        event_tx: Sender<GenerationEvent>,
    ) -> Result<Self, VocabError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        Ok(VocabWatcher {
            context: CycleContext {
                orchestrator: Arc::new(tokio::sync::Mutex::new(orchestrator)),
                shared: Arc::new(WatchShared::default()),
                debouncer: Arc::new(Mutex::new(None)),
                event_tx,
            },
            runtime,
            worker: Mutex::new(None),
            poller: Mutex::new(None),
            debounce: Duration::from_millis(500),
            poll_interval: None,
        })
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Periodically re-checks every resource, including online ones the file watcher can't see.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn orchestrator(&self) -> Arc<tokio::sync::Mutex<ArtifactOrchestrator>> {
        self.context.orchestrator.clone()
    }

    pub fn state(&self) -> WatchState {
        *self.context.shared.state.read()
    }

    pub fn last_outcome(&self) -> Option<GenerationEvent> {
        self.context.shared.last_outcome.read().clone()
    }

    pub fn failure_count(&self) -> u64 {
        self.context.shared.failures.load(Ordering::SeqCst)
    }

    pub fn cycle_count(&self) -> u64 {
        self.context.shared.cycles.load(Ordering::SeqCst)
    }

    pub fn is_watching(&self) -> bool {
        self.context.debouncer.lock().is_some()
    }

    /// Paths currently observed, mapped to the resource ids they invalidate.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.context.shared.targets.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Runs the initial generation cycle, then starts observing the file system.
    pub fn watch(&self) -> Result<(), VocabError> {
        if self.is_watching() {
            return Err(VocabError::Watch("already watching".to_string()));
        }
        let shared = self.context.shared.clone();
        shared.stopped.store(false, Ordering::SeqCst);

        {
            let orchestrator = self.context.orchestrator.blocking_lock();
            *shared.targets.write() =
                watch_targets(orchestrator.config(), orchestrator.config_path().as_deref());
        }
        shared.watched_dirs.lock().clear();

        let debouncer_shared = shared.clone();
        let debouncer = new_debouncer(
            self.debounce,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let mut enqueued = 0;
                    for event in events.iter() {
                        match event.event.kind {
                            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                                for path in event.paths.iter() {
                                    let path = normalize_path(path);
                                    if debouncer_shared.is_target(&path) {
                                        tracing::debug!("[Debouncer] {:?} changed", path);
                                        debouncer_shared.enqueue(path);
                                        enqueued += 1;
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                    if enqueued > 0 {
                        debouncer_shared.work_notifier.notify_one();
                    }
                }
                Err(errors) => {
                    tracing::error!("Notify debouncer returned errors: {:?}", errors);
                }
            },
        )?;
        *self.context.debouncer.lock() = Some(debouncer);
        self.context.watch_new_dirs()?;

        self.runtime.block_on(self.context.run_cycle(Vec::new()));

        let mut worker = self.worker.lock();
        // a worker left over from an earlier watch() is idle or draining its last cycle
        if let Some(previous) = worker.take() {
            previous.abort();
        }
        {
            let context = self.context.clone();
            *worker = Some(self.runtime.spawn(async move {
                tracing::info!("[VocabWatcher] starting worker");
                loop {
                    context.shared.work_notifier.notified().await;
                    if context.shared.stopped.load(Ordering::SeqCst) {
                        break;
                    }
                    let paths = std::mem::take(&mut *context.shared.pending.lock());
                    context.run_cycle(paths).await;
                }
                tracing::info!("[VocabWatcher] worker stopped");
            }));
        }

        if let Some(interval) = self.poll_interval {
            let shared = shared.clone();
            *self.poller.lock() = Some(self.runtime.spawn(async move {
                loop {
                    tokio::time::sleep(interval).await;
                    if shared.stopped.load(Ordering::SeqCst) {
                        break;
                    }
                    tracing::debug!("[VocabWatcher] poll interval elapsed");
                    shared.work_notifier.notify_one();
                }
            }));
        }
        Ok(())
    }

    /// Queues a change to `path` as if the file system had reported it.
    pub fn trigger<P: AsRef<Path>>(&self, path: P) {
        self.context.shared.enqueue(normalize_path(path.as_ref()));
        self.context.shared.work_notifier.notify_one();
    }

    /// Stops observing the file system. A cycle already running completes; nothing new starts.
    pub fn unwatch(&self) -> Result<(), VocabError> {
        let Some(debouncer) = self.context.debouncer.lock().take() else {
            return Ok(());
        };
        drop(debouncer);
        self.context.shared.stopped.store(true, Ordering::SeqCst);
        self.context.shared.work_notifier.notify_one();
        if let Some(poller) = self.poller.lock().take() {
            poller.abort();
        }
        let dirs: Vec<PathBuf> = std::mem::take(&mut *self.context.shared.watched_dirs.lock())
            .into_iter()
            .collect();
        tracing::info!("[VocabWatcher] unwatched {} directories", dirs.len());
        self.context.emit(GenerationEvent::Unwatched(dirs));
        Ok(())
    }
}

impl Drop for VocabWatcher {
    fn drop(&mut self) {
        if let Err(e) = self.unwatch() {
            tracing::warn!("[VocabWatcher] unwatch on drop failed: {e}");
        }
    }
}
