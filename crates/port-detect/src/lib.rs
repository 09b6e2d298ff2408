//! Serial Port Detection Library
//!
//! This crate provides the leaf collaborators of the port watcher:
//!
//! - **Enumeration**: point-in-time snapshots of the OS's serial port names
//! - **Inventory**: the connected USB devices and the port each one exposes
//! - **Metadata resolution**: best-effort friendly name / device id lookup
//! - **Change signals**: zero-payload "something changed" notifications
//!
//! # Example
//!
//! ```rust,no_run
//! use port_detect::{MetadataResolver, PortEnumerator, PortScanner, SerialportInventory};
//!
//! let scanner = PortScanner::new();
//! let resolver = MetadataResolver::new(SerialportInventory::new());
//!
//! for name in scanner.port_names().unwrap() {
//!     match resolver.resolve(&name) {
//!         Some(meta) => println!("{} - {:?}", name, meta.friendly_name),
//!         None => println!("{}", name),
//!     }
//! }
//! ```

pub mod error;
pub mod inventory;
pub mod metadata;
pub mod scanner;
pub mod signal;
pub mod usb_ids;

pub use error::DetectError;
pub use inventory::{DeviceRecord, MetadataProvider, SerialportInventory};
pub use metadata::{MetadataResolver, PortMetadata};
pub use scanner::{PortEnumerator, PortScanner, ScannerConfig, SerialPortInfo};
pub use signal::{ChangeSignalSource, PollingSignalSource, SignalSubscription};
