//! Port and watcher state

use std::fmt;

use port_detect::PortMetadata;
use serde::{Deserialize, Serialize};

/// Identity of one tracked port entity
///
/// A port that disappears and comes back gets a new id, so work started for
/// the old entity can be told apart from the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub u64);

/// Snapshot of a tracked serial port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// OS-assigned port name (e.g., COM3, /dev/ttyUSB0)
    pub name: String,
    /// Human-readable device name, if resolved
    pub friendly_name: Option<String>,
    /// Stable device instance id, if resolved
    pub device_id: Option<String>,
}

impl Port {
    /// Create a port with no metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            friendly_name: None,
            device_id: None,
        }
    }

    /// Merge resolved metadata into this port
    pub fn apply_metadata(&mut self, metadata: PortMetadata) {
        self.friendly_name = metadata.friendly_name;
        self.device_id = metadata.device_id;
    }

    /// Whether any metadata has been resolved
    pub fn has_metadata(&self) -> bool {
        self.friendly_name.is_some() || self.device_id.is_some()
    }
}

impl fmt::Display for Port {
    /// Multi-line description: name, friendly name, device id
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", self.friendly_name.as_deref().unwrap_or(""))?;
        write!(f, "DeviceId: {}", self.device_id.as_deref().unwrap_or(""))
    }
}

/// Phase of the watcher's reconciliation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatcherState {
    /// Nothing pending
    Idle,
    /// Raw signals received, waiting for the quiet window to pass
    Debouncing,
    /// A reconciliation pass is running
    Reconciling,
}

impl WatcherState {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            WatcherState::Idle => "Idle",
            WatcherState::Debouncing => "Debouncing",
            WatcherState::Reconciling => "Reconciling",
        }
    }
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
