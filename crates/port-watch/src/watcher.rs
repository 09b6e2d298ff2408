//! Port Watcher Actor
//!
//! The watcher is the single owner of the port registry and debounce state.
//! It runs as an async task that receives raw change signals through a
//! channel and emits classified [`PortEvent`]s through another.
//!
//! # State machine
//!
//! ```text
//!            raw signal                quiet window elapsed
//!   Idle ─────────────────▶ Debouncing ─────────────────────▶ Reconciling
//!    ▲                        │  ▲ raw signal                    │
//!    │                        └──┘ (bump generation)             │
//!    └────────────────────────────────────────────────────────────┘
//!                         pass complete
//! ```
//!
//! The task starts directly in `Reconciling` for the initial pass, whose
//! arrivals are reported as [`PortEvent::InitialDetected`].
//!
//! Metadata for new ports is resolved on blocking workers while the task
//! keeps absorbing signals. Results are merged back by the task itself, and
//! only into the entity the lookup was started for. Snapshot queries that
//! arrive during a pass are answered once the pass has finished.
//!
//! # Example
//!
//! ```rust,ignore
//! use port_watch::{Watcher, WatcherConfig};
//!
//! let (watcher, mut events) = Watcher::new(enumerator, resolver, WatcherConfig::default());
//! let handle = watcher.start();
//!
//! // Wire a change source to the watcher
//! let signals = handle.signaller();
//! let _subscription = source.subscribe(move || { signals.notify(); });
//!
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use port_detect::{MetadataResolver, PortEnumerator, PortMetadata};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::debounce::{NotificationDebouncer, QUIET_WINDOW};
use crate::error::WatchError;
use crate::events::PortEvent;
use crate::registry::{PortRegistry, TrackedPort};
use crate::state::{Port, PortId, WatcherState};

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Upper bound on a single metadata lookup
    pub resolve_timeout: Duration,
    /// Capacity of the event channel
    pub event_buffer: usize,
    /// Capacity of the command channel
    pub command_buffer: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(2),
            event_buffer: 256,
            command_buffer: 256,
        }
    }
}

/// Point-in-time view of the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherSnapshot {
    /// Current state machine phase
    pub state: WatcherState,
    /// Whether the initial pass has yet to complete
    pub is_initial_pass: bool,
    /// Tracked ports in discovery order
    pub ports: Vec<Port>,
}

/// Commands sent to the watcher task
#[derive(Debug)]
enum WatcherCommand {
    /// Raw "something changed" signal
    Signal,

    /// Query the watcher's state
    Snapshot {
        /// Channel to send back the snapshot
        response: oneshot::Sender<WatcherSnapshot>,
    },

    /// Shutdown the watcher
    Shutdown,
}

/// Whether the task should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassOutcome {
    /// Pass finished; `rescan` is set if signals settled while it ran
    Done { rescan: bool },
    /// Shutdown requested mid-pass
    Stopped,
}

/// Hot-plug reconciliation engine
///
/// Create with [`Watcher::new`], then [`Watcher::start`] it to spawn the
/// task. All state lives inside the task once started.
pub struct Watcher {
    enumerator: Arc<dyn PortEnumerator>,
    resolver: MetadataResolver,
    config: WatcherConfig,
    registry: PortRegistry,
    debouncer: NotificationDebouncer,
    state: WatcherState,
    is_initial_pass: bool,
    event_tx: mpsc::Sender<PortEvent>,
    deferred_snapshots: Vec<oneshot::Sender<WatcherSnapshot>>,
}

impl Watcher {
    /// Create a watcher and the receiving end of its event stream
    pub fn new(
        enumerator: Arc<dyn PortEnumerator>,
        resolver: MetadataResolver,
        config: WatcherConfig,
    ) -> (Self, mpsc::Receiver<PortEvent>) {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer.max(1));
        let watcher = Self {
            enumerator,
            resolver,
            config,
            registry: PortRegistry::new(),
            debouncer: NotificationDebouncer::new(),
            state: WatcherState::Reconciling,
            is_initial_pass: true,
            event_tx,
            deferred_snapshots: Vec::new(),
        };
        (watcher, event_rx)
    }

    /// Spawn the watcher task
    ///
    /// The initial pass runs before any signal or query is handled. Must be
    /// called from within a tokio runtime.
    pub fn start(self) -> WatcherHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.command_buffer.max(1));
        let task = tokio::spawn(self.run(cmd_rx));
        WatcherHandle { cmd_tx, task }
    }

    async fn run(mut self, mut cmd_rx: mpsc::Receiver<WatcherCommand>) {
        info!("Port watcher started");

        // Timers report the generation they were armed with here
        let (settle_tx, mut settle_rx) = mpsc::unbounded_channel::<u64>();

        if self.reconcile(&mut cmd_rx, &settle_tx, &mut settle_rx).await == Flow::Continue {
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break; };
                        match cmd {
                            WatcherCommand::Signal => self.on_signal(&settle_tx),
                            WatcherCommand::Snapshot { response } => {
                                let _ = response.send(self.snapshot());
                            }
                            WatcherCommand::Shutdown => break,
                        }
                    }

                    Some(generation) = settle_rx.recv() => {
                        if self.debouncer.on_timer_fire(generation) {
                            debug!("Signals settled (generation {})", generation);
                            let flow = self.reconcile(&mut cmd_rx, &settle_tx, &mut settle_rx).await;
                            if flow == Flow::Stop {
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!("Port watcher stopped");
    }

    /// Record a raw signal and arm a settle timer for it
    fn on_signal(&mut self, settle_tx: &mpsc::UnboundedSender<u64>) {
        let generation = self.debouncer.on_raw_signal();
        if self.state == WatcherState::Idle {
            self.state = WatcherState::Debouncing;
        }

        let settle_tx = settle_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(QUIET_WINDOW).await;
            let _ = settle_tx.send(generation);
        });
    }

    /// Run passes until no settle arrived during the last one
    async fn reconcile(
        &mut self,
        cmd_rx: &mut mpsc::Receiver<WatcherCommand>,
        settle_tx: &mpsc::UnboundedSender<u64>,
        settle_rx: &mut mpsc::UnboundedReceiver<u64>,
    ) -> Flow {
        loop {
            match self.run_pass(cmd_rx, settle_tx, settle_rx).await {
                PassOutcome::Stopped => return Flow::Stop,
                PassOutcome::Done { rescan: true } => {
                    debug!("Signals settled during reconciliation, rescanning");
                }
                PassOutcome::Done { rescan: false } => break,
            }
        }

        self.state = if self.debouncer.is_pending() {
            WatcherState::Debouncing
        } else {
            WatcherState::Idle
        };

        for response in std::mem::take(&mut self.deferred_snapshots) {
            let _ = response.send(self.snapshot());
        }
        Flow::Continue
    }

    async fn run_pass(
        &mut self,
        cmd_rx: &mut mpsc::Receiver<WatcherCommand>,
        settle_tx: &mpsc::UnboundedSender<u64>,
        settle_rx: &mut mpsc::UnboundedReceiver<u64>,
    ) -> PassOutcome {
        self.state = WatcherState::Reconciling;

        let enumerator = Arc::clone(&self.enumerator);
        let names = match tokio::task::spawn_blocking(move || enumerator.port_names()).await {
            Ok(Ok(names)) => names,
            Ok(Err(e)) => {
                warn!("Skipping reconciliation, enumeration failed: {}", e);
                return PassOutcome::Done { rescan: false };
            }
            Err(e) => {
                warn!("Skipping reconciliation, enumeration task failed: {}", e);
                return PassOutcome::Done { rescan: false };
            }
        };

        let diff = self.registry.reconcile(&names);

        for removed in &diff.removed {
            info!("Port removed: {}", removed.port.name);
            self.emit(PortEvent::Removed(removed.port.clone())).await;
        }

        let mut lookups = JoinSet::new();
        for entry in &diff.added {
            lookups.spawn(resolve_with_timeout(
                self.resolver.clone(),
                entry.id,
                entry.port.name.clone(),
                self.config.resolve_timeout,
            ));
        }

        let mut rescan = false;
        while !lookups.is_empty() {
            tokio::select! {
                joined = lookups.join_next() => match joined {
                    Some(Ok((id, Some(metadata)))) => {
                        self.registry.apply_metadata(id, metadata);
                    }
                    Some(Ok((_, None))) => {}
                    Some(Err(e)) => warn!("Metadata lookup task failed: {}", e),
                    None => break,
                },

                cmd = cmd_rx.recv() => match cmd {
                    Some(WatcherCommand::Signal) => self.on_signal(settle_tx),
                    Some(WatcherCommand::Snapshot { response }) => {
                        self.deferred_snapshots.push(response);
                    }
                    Some(WatcherCommand::Shutdown) | None => {
                        lookups.abort_all();
                        return PassOutcome::Stopped;
                    }
                },

                Some(generation) = settle_rx.recv() => {
                    if self.debouncer.on_timer_fire(generation) {
                        rescan = true;
                    }
                }
            }
        }

        self.announce_arrivals(&diff.added).await;

        if self.is_initial_pass {
            self.is_initial_pass = false;
            info!("Initial scan complete: {} port(s)", self.registry.len());
        } else {
            info!(
                "Reconciliation complete: {} added, {} removed, {} tracked",
                diff.added.len(),
                diff.removed.len(),
                self.registry.len()
            );
        }

        PassOutcome::Done { rescan }
    }

    /// Emit arrival events in discovery order with merged metadata
    async fn announce_arrivals(&mut self, added: &[TrackedPort]) {
        for entry in added {
            let Some(current) = self.registry.get_by_id(entry.id) else {
                continue;
            };
            let port = current.port.clone();

            let event = if self.is_initial_pass {
                info!("Port detected: {}", port.name);
                PortEvent::InitialDetected(port)
            } else {
                info!("Port added: {}", port.name);
                PortEvent::Added(port)
            };
            self.emit(event).await;
        }
    }

    async fn emit(&self, event: PortEvent) {
        if self.event_tx.send(event).await.is_err() {
            trace!("Event receiver dropped");
        }
    }

    fn snapshot(&self) -> WatcherSnapshot {
        WatcherSnapshot {
            state: self.state,
            is_initial_pass: self.is_initial_pass,
            ports: self.registry.ports().cloned().collect(),
        }
    }
}

/// Resolve metadata on a blocking worker, giving up after `limit`
async fn resolve_with_timeout(
    resolver: MetadataResolver,
    id: PortId,
    name: String,
    limit: Duration,
) -> (PortId, Option<PortMetadata>) {
    let lookup_name = name.clone();
    let lookup = tokio::task::spawn_blocking(move || resolver.resolve(&lookup_name));

    let metadata = match timeout(limit, lookup).await {
        Ok(Ok(metadata)) => metadata,
        Ok(Err(e)) => {
            warn!("Metadata worker for {} failed: {}", name, e);
            None
        }
        Err(_) => {
            warn!("Metadata lookup for {} timed out after {:?}", name, limit);
            None
        }
    };

    (id, metadata)
}

/// Clonable sender of raw change signals
///
/// Safe to call from any thread, including OS callback threads.
#[derive(Debug, Clone)]
pub struct SignalSender {
    cmd_tx: mpsc::Sender<WatcherCommand>,
}

impl SignalSender {
    /// Deliver a raw change signal without blocking
    ///
    /// Returns false if the signal was dropped because the watcher is gone
    /// or its queue is full. A full queue already holds signals that will
    /// trigger a rescan.
    pub fn notify(&self) -> bool {
        match self.cmd_tx.try_send(WatcherCommand::Signal) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!("Signal queue full, dropping signal");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

/// Control handle for a running [`Watcher`]
#[derive(Debug)]
pub struct WatcherHandle {
    cmd_tx: mpsc::Sender<WatcherCommand>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Deliver a raw change signal
    pub fn notify(&self) -> bool {
        self.signaller().notify()
    }

    /// Get a clonable signal sender for change sources
    pub fn signaller(&self) -> SignalSender {
        SignalSender {
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    /// Query the watcher's current state
    ///
    /// A query made while a pass is running is answered when the pass ends,
    /// so the result never shows half-merged metadata.
    pub async fn snapshot(&self) -> Result<WatcherSnapshot, WatchError> {
        let (response, rx) = oneshot::channel();
        self.cmd_tx
            .send(WatcherCommand::Snapshot { response })
            .await
            .map_err(|_| WatchError::Stopped)?;
        rx.await.map_err(|_| WatchError::Stopped)
    }

    /// Whether the watcher task is still running
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the watcher and wait for its task to finish
    pub async fn stop(self) -> Result<(), WatchError> {
        // A closed channel means the task is already on its way out
        let _ = self.cmd_tx.send(WatcherCommand::Shutdown).await;
        self.task
            .await
            .map_err(|e| WatchError::TaskFailed(e.to_string()))
    }
}
