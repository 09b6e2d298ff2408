//! Tracked port registry
//!
//! The registry owns the ordered list of ports the watcher currently knows
//! about and computes add/remove diffs against fresh enumerations. Entries
//! keep their first-discovery order; retained entries are never reordered.

use std::collections::HashSet;

use port_detect::PortMetadata;
use tracing::debug;

use crate::state::{Port, PortId};

/// A port together with its entity id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPort {
    /// Entity id assigned on discovery
    pub id: PortId,
    /// Current port state
    pub port: Port,
}

/// Outcome of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Newly discovered ports, in enumeration order
    pub added: Vec<TrackedPort>,
    /// Ports no longer present, in tracked order, as last known
    pub removed: Vec<TrackedPort>,
}

impl Reconciliation {
    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered collection of tracked ports keyed by port name
#[derive(Debug, Default)]
pub struct PortRegistry {
    entries: Vec<TrackedPort>,
    next_id: u64,
}

impl PortRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the tracked ports against the names currently reported by the OS
    ///
    /// Unknown names are appended in the order given; duplicates count once.
    /// Tracked ports whose name is missing are dropped and returned.
    pub fn reconcile<I, S>(&mut self, current: I) -> Reconciliation
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut present = HashSet::new();
        let mut ordered = Vec::new();
        for name in current {
            let name = name.as_ref();
            if present.insert(name.to_string()) {
                ordered.push(name.to_string());
            }
        }

        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            if present.contains(&entry.port.name) {
                true
            } else {
                removed.push(entry.clone());
                false
            }
        });

        let tracked: HashSet<String> = self.entries.iter().map(|e| e.port.name.clone()).collect();
        let mut added = Vec::new();
        for name in ordered {
            if tracked.contains(&name) {
                continue;
            }
            let entry = TrackedPort {
                id: self.allocate_id(),
                port: Port::new(name),
            };
            self.entries.push(entry.clone());
            added.push(entry);
        }

        debug!(
            "Reconciled {} port(s): {} added, {} removed",
            self.entries.len(),
            added.len(),
            removed.len()
        );

        Reconciliation { added, removed }
    }

    /// Merge resolved metadata into the entity with `id`
    ///
    /// Returns false, leaving the registry untouched, when that entity is no
    /// longer tracked.
    pub fn apply_metadata(&mut self, id: PortId, metadata: PortMetadata) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.port.apply_metadata(metadata);
                true
            }
            None => {
                debug!("Discarding metadata for untracked port entity {}", id.0);
                false
            }
        }
    }

    /// Get a tracked port by name
    pub fn get(&self, name: &str) -> Option<&TrackedPort> {
        self.entries.iter().find(|e| e.port.name == name)
    }

    /// Get a tracked port by entity id
    pub fn get_by_id(&self, id: PortId) -> Option<&TrackedPort> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Whether a port with this name is tracked
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Tracked ports in discovery order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.entries.iter().map(|e| &e.port)
    }

    /// Number of tracked ports
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no ports are tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn allocate_id(&mut self) -> PortId {
        self.next_id += 1;
        PortId(self.next_id)
    }
}
