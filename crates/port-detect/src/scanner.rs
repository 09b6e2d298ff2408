//! Serial port scanner
//!
//! This module provides serial port enumeration.

use std::collections::HashSet;

use serialport::{available_ports, SerialPortType};
use tracing::{debug, trace};

use crate::error::DetectError;

/// Source of point-in-time port name snapshots
///
/// Names are opaque platform identifiers (`COM3`, `/dev/ttyUSB0`, ...).
/// The returned order is whatever the platform reports; callers that need
/// a stable order must not re-sort it.
pub trait PortEnumerator: Send + Sync {
    /// Snapshot the names of all currently connected ports
    fn port_names(&self) -> Result<Vec<String>, DetectError>;
}

/// Information about a serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialPortInfo {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB serial number (if available)
    pub serial_number: Option<String>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// USB product string
    pub product: Option<String>,
}

impl SerialPortInfo {
    /// Create from serialport crate's port info
    pub(crate) fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                serial_number: usb.serial_number.clone(),
                manufacturer: usb.manufacturer.clone(),
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                vid: None,
                pid: None,
                serial_number: None,
                manufacturer: None,
                product: None,
            },
        }
    }
}

/// Serial port scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Skip ports matching these patterns
    pub skip_patterns: Vec<String>,
}

impl ScannerConfig {
    /// Patterns skipped by [`PortScanner::new`]
    pub fn default_skip_patterns() -> Vec<String> {
        vec![
            // Bluetooth ports on macOS
            "Bluetooth".to_string(),
            // Debug/logging ports
            "debug".to_string(),
        ]
    }
}

/// Serial port scanner
#[derive(Debug, Clone)]
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig {
                skip_patterns: ScannerConfig::default_skip_patterns(),
            },
        }
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Enumerate all available serial ports with their USB details
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortInfo>, DetectError> {
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let result: Vec<_> = ports
            .into_iter()
            .map(|p| SerialPortInfo::from_serialport(p.port_name, &p.port_type))
            .filter(|p| !self.should_skip_port(&p.port))
            .collect();

        debug!("Found {} serial port(s)", result.len());
        for port in &result {
            let desc = port.product.as_deref().unwrap_or("Unknown");
            trace!("  {} - {}", port.port, desc);
        }

        Ok(result)
    }

    /// Check if a port should be skipped
    fn should_skip_port(&self, port: &str) -> bool {
        self.config
            .skip_patterns
            .iter()
            .any(|pattern| port.contains(pattern.as_str()))
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PortEnumerator for PortScanner {
    fn port_names(&self) -> Result<Vec<String>, DetectError> {
        // Some platforms list the same device node more than once
        let mut seen = HashSet::new();
        Ok(self
            .enumerate_ports()?
            .into_iter()
            .map(|p| p.port)
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }
}
