//! Serial Port Hot-Plug Watcher
//!
//! This crate tracks the serial ports attached to the machine and turns raw,
//! noisy "something changed" notifications into a clean event stream.
//!
//! # Architecture
//!
//! - [`NotificationDebouncer`] collapses bursts of raw signals: a rescan runs
//!   only once no new signal has arrived for the quiet window (500 ms)
//! - [`PortRegistry`] holds the tracked ports in discovery order and diffs
//!   them against each fresh enumeration
//! - [`Watcher`] is the async task that owns both, resolves metadata for new
//!   arrivals off the mutation path, and emits [`PortEvent`]s
//!
//! Events are classified as:
//!
//! - **InitialDetected**: present when the watcher started
//! - **Added**: attached afterwards
//! - **Removed**: detached, carrying the port's last known state
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use port_detect::{MetadataResolver, PortScanner, SerialportInventory};
//! use port_watch::{PortEvent, Watcher, WatcherConfig};
//!
//! # async fn run() {
//! let (watcher, mut events) = Watcher::new(
//!     Arc::new(PortScanner::new()),
//!     MetadataResolver::new(SerialportInventory::new()),
//!     WatcherConfig::default(),
//! );
//! let handle = watcher.start();
//!
//! // Call handle.notify() whenever the OS reports a device change
//! handle.notify();
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         PortEvent::InitialDetected(port) | PortEvent::Added(port) => println!("+ {}", port.name),
//!         PortEvent::Removed(port) => println!("- {}", port.name),
//!     }
//! }
//! # }
//! ```

pub mod debounce;
pub mod error;
pub mod events;
pub mod registry;
pub mod state;
pub mod watcher;

pub use debounce::{NotificationDebouncer, QUIET_WINDOW};
pub use error::WatchError;
pub use events::{PortEvent, PortEventSink};
pub use registry::{PortRegistry, Reconciliation, TrackedPort};
pub use state::{Port, PortId, WatcherState};
pub use watcher::{SignalSender, Watcher, WatcherConfig, WatcherHandle, WatcherSnapshot};
