//! Device inventory
//!
//! A [`MetadataProvider`] lists every connected device along with the port
//! it exposes (if any). Platforms plug in their own provider; the default
//! [`SerialportInventory`] builds the list from the USB descriptors that the
//! `serialport` crate reports.

use tracing::trace;

use crate::error::DetectError;
use crate::scanner::{PortScanner, ScannerConfig, SerialPortInfo};
use crate::usb_ids;

/// One device known to the inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    port_name: Option<String>,
    friendly_name: Option<String>,
    device_id: String,
}

impl DeviceRecord {
    /// Create a record
    pub fn new(
        device_id: impl Into<String>,
        port_name: Option<String>,
        friendly_name: Option<String>,
    ) -> Self {
        Self {
            port_name,
            friendly_name,
            device_id: device_id.into(),
        }
    }

    /// Port name the device is configured to expose
    pub fn configured_port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Human-readable device name
    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    /// Stable device instance id (e.g. `USB\VID_2341&PID_0043\75830333`)
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Build a record from scanned port info
    ///
    /// Only USB ports carry enough identity for a record; everything else
    /// yields `None`.
    pub fn from_port_info(info: &SerialPortInfo) -> Option<Self> {
        let (vid, pid) = (info.vid?, info.pid?);

        let device_id = match info.serial_number.as_deref() {
            Some(serial) if !serial.is_empty() => {
                format!("USB\\VID_{:04X}&PID_{:04X}\\{}", vid, pid, serial)
            }
            _ => format!("USB\\VID_{:04X}&PID_{:04X}", vid, pid),
        };

        let friendly_name = info
            .product
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| usb_ids::describe(vid, pid))
            .or_else(|| info.manufacturer.clone());

        Some(Self {
            port_name: Some(info.port.clone()),
            friendly_name,
            device_id,
        })
    }
}

/// Provider of the connected device inventory
pub trait MetadataProvider: Send + Sync {
    /// List every connected device
    fn all_devices(&self) -> Result<Vec<DeviceRecord>, DetectError>;
}

/// Inventory backed by the `serialport` crate's USB port details
#[derive(Debug, Clone)]
pub struct SerialportInventory {
    scanner: PortScanner,
}

impl SerialportInventory {
    /// Create an inventory that sees every port, including skipped ones
    pub fn new() -> Self {
        Self {
            scanner: PortScanner::with_config(ScannerConfig::default()),
        }
    }
}

impl Default for SerialportInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for SerialportInventory {
    fn all_devices(&self) -> Result<Vec<DeviceRecord>, DetectError> {
        let ports = self
            .scanner
            .enumerate_ports()
            .map_err(|e| DetectError::InventoryFailed(e.to_string()))?;

        let devices: Vec<_> = ports.iter().filter_map(DeviceRecord::from_port_info).collect();
        trace!("Inventory lists {} USB device(s)", devices.len());
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usb_port(port: &str, vid: u16, pid: u16) -> SerialPortInfo {
        SerialPortInfo {
            port: port.to_string(),
            vid: Some(vid),
            pid: Some(pid),
            serial_number: None,
            manufacturer: None,
            product: None,
        }
    }

    #[test]
    fn record_uses_product_string() {
        let mut info = usb_port("COM7", 0x2341, 0x0043);
        info.product = Some("Arduino Uno R3".to_string());
        info.serial_number = Some("75830333".to_string());

        let record = DeviceRecord::from_port_info(&info).unwrap();
        assert_eq!(record.configured_port_name(), Some("COM7"));
        assert_eq!(record.friendly_name(), Some("Arduino Uno R3"));
        assert_eq!(record.device_id(), "USB\\VID_2341&PID_0043\\75830333");
    }

    #[test]
    fn record_falls_back_to_known_ids() {
        let record = DeviceRecord::from_port_info(&usb_port("/dev/ttyUSB0", 0x1A86, 0x7523)).unwrap();
        assert_eq!(record.friendly_name(), Some("USB-SERIAL CH340"));
        assert_eq!(record.device_id(), "USB\\VID_1A86&PID_7523");
    }

    #[test]
    fn record_falls_back_to_manufacturer() {
        let mut info = usb_port("/dev/ttyACM0", 0xCAFE, 0x0001);
        info.manufacturer = Some("Acme".to_string());

        let record = DeviceRecord::from_port_info(&info).unwrap();
        assert_eq!(record.friendly_name(), Some("Acme"));
    }

    #[test]
    fn non_usb_port_has_no_record() {
        let info = SerialPortInfo {
            port: "/dev/ttyS0".to_string(),
            vid: None,
            pid: None,
            serial_number: None,
            manufacturer: None,
            product: None,
        };
        assert!(DeviceRecord::from_port_info(&info).is_none());
    }
}
