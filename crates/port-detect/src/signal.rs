//! Raw change signals
//!
//! A change signal carries no payload: it only says "the port set may have
//! changed". Sources may fire several times per physical event, coalesce
//! events, or deliver them late. Consumers are expected to debounce.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::scanner::PortEnumerator;

/// Something that can deliver raw change signals
pub trait ChangeSignalSource {
    /// Start delivering signals to `callback` until the subscription is dropped
    fn subscribe<F>(self, callback: F) -> SignalSubscription
    where
        F: Fn() + Send + Sync + 'static;
}

/// Live subscription to a [`ChangeSignalSource`]
///
/// Dropping the subscription stops signal delivery.
#[derive(Debug)]
pub struct SignalSubscription {
    task: JoinHandle<()>,
}

impl SignalSubscription {
    /// Wrap the task that delivers signals
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Whether the source is still delivering signals
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SignalSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Default poll interval for [`PollingSignalSource`]
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Change source for platforms without a device notification API
///
/// Polls the enumerator and signals whenever the set of port names differs
/// from the previous poll. Must be subscribed from within a tokio runtime.
pub struct PollingSignalSource {
    enumerator: Arc<dyn PortEnumerator>,
    interval: Duration,
}

impl PollingSignalSource {
    /// Create a source polling at [`DEFAULT_POLL_INTERVAL`]
    pub fn new(enumerator: Arc<dyn PortEnumerator>) -> Self {
        Self::with_interval(enumerator, DEFAULT_POLL_INTERVAL)
    }

    /// Create a source polling at a custom interval
    pub fn with_interval(enumerator: Arc<dyn PortEnumerator>, interval: Duration) -> Self {
        Self {
            enumerator,
            interval,
        }
    }
}

impl ChangeSignalSource for PollingSignalSource {
    fn subscribe<F>(self, callback: F) -> SignalSubscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        info!("Polling for port changes every {:?}", self.interval);
        let task = tokio::spawn(run_poll_loop(self.enumerator, self.interval, callback));
        SignalSubscription::from_task(task)
    }
}

async fn run_poll_loop<F>(enumerator: Arc<dyn PortEnumerator>, period: Duration, callback: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last: Option<HashSet<String>> = None;

    loop {
        ticker.tick().await;

        let enumerator = Arc::clone(&enumerator);
        let snapshot: HashSet<String> =
            match tokio::task::spawn_blocking(move || enumerator.port_names()).await {
                Ok(Ok(names)) => names.into_iter().collect(),
                Ok(Err(e)) => {
                    debug!("Port poll skipped: {}", e);
                    continue;
                }
                Err(e) => {
                    warn!("Port poll task failed: {}", e);
                    continue;
                }
            };

        if let Some(previous) = &last {
            if *previous != snapshot {
                debug!("Port set changed ({} -> {} ports)", previous.len(), snapshot.len());
                callback();
            }
        }
        last = Some(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::error::DetectError;

    /// Replays snapshots in order, repeating the last one forever
    struct ScriptedEnumerator {
        snapshots: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedEnumerator {
        fn new(snapshots: &[&[&str]]) -> Self {
            let mut snapshots: Vec<Vec<String>> = snapshots
                .iter()
                .map(|s| s.iter().map(|n| n.to_string()).collect())
                .collect();
            snapshots.reverse();
            Self {
                snapshots: Mutex::new(snapshots),
            }
        }
    }

    impl PortEnumerator for ScriptedEnumerator {
        fn port_names(&self) -> Result<Vec<String>, DetectError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            if snapshots.len() > 1 {
                Ok(snapshots.pop().unwrap())
            } else {
                Ok(snapshots[0].clone())
            }
        }
    }

    #[tokio::test]
    async fn signals_once_per_change() {
        let enumerator = Arc::new(ScriptedEnumerator::new(&[
            &["COM3"],
            &["COM3"],
            &["COM3", "COM5"],
            &["COM5", "COM3"],
            &["COM5"],
        ]));
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let source = PollingSignalSource::with_interval(enumerator, Duration::from_millis(5));
        let subscription = source.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(subscription.is_active());
        drop(subscription);

        // reordering alone is not a change
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
