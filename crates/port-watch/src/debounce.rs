//! Generation-based notification debouncer
//!
//! Each raw signal bumps a generation counter and arms a timer that carries
//! the generation it was armed with. When a timer fires it only counts if no
//! newer signal arrived in the meantime, so a burst of signals spaced closer
//! than the quiet window produces exactly one settle. Superseded timers need
//! no cancellation; they simply fail the generation check.
//!
//! This type holds no timers itself. The watcher arms them and reports back
//! through [`NotificationDebouncer::on_timer_fire`].

use std::time::Duration;

use tracing::trace;

/// Quiet period after the last raw signal before a rescan runs
pub const QUIET_WINDOW: Duration = Duration::from_millis(500);

/// Collapses bursts of raw change signals into single settle triggers
#[derive(Debug, Clone)]
pub struct NotificationDebouncer {
    generation: u64,
    pending: bool,
}

impl NotificationDebouncer {
    /// Create a debouncer with nothing pending
    pub fn new() -> Self {
        Self {
            generation: 0,
            pending: false,
        }
    }

    /// Record a raw signal
    ///
    /// Returns the generation the caller must capture in the timer it arms
    /// for [`QUIET_WINDOW`].
    pub fn on_raw_signal(&mut self) -> u64 {
        self.generation += 1;
        self.pending = true;
        trace!("Raw signal, generation {}", self.generation);
        self.generation
    }

    /// Report a timer armed with `captured` has fired
    ///
    /// Returns true if the signals have settled and a rescan should run.
    pub fn on_timer_fire(&mut self, captured: u64) -> bool {
        if captured == self.generation && self.pending {
            self.pending = false;
            true
        } else {
            trace!(
                "Timer for generation {} superseded by {}",
                captured,
                self.generation
            );
            false
        }
    }

    /// Whether the latest signal has not settled yet
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl Default for NotificationDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
