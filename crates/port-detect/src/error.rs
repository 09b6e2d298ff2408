//! Error types for port detection

use thiserror::Error;

/// Errors that can occur while querying the OS for ports or devices
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Failed to query the device inventory
    #[error("failed to query device inventory: {0}")]
    InventoryFailed(String),
}
