//! Best-effort port metadata resolution
//!
//! Resolution walks the full device inventory looking for the device that
//! exposes a given port name. Cost grows with the number of devices, which is
//! fine at hot-plug rates but not meant for bulk rescans.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::inventory::MetadataProvider;

/// Metadata resolved for a port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMetadata {
    /// Human-readable device name
    pub friendly_name: Option<String>,
    /// Stable device instance id
    pub device_id: Option<String>,
}

/// Looks up metadata for a port name through a [`MetadataProvider`]
#[derive(Clone)]
pub struct MetadataResolver {
    provider: Arc<dyn MetadataProvider>,
}

impl MetadataResolver {
    /// Create a resolver over a provider
    pub fn new(provider: impl MetadataProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Create a resolver over a shared provider
    pub fn from_shared(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Resolve metadata for `port_name`
    ///
    /// Returns the first device whose configured port name matches exactly.
    /// Provider failures and missing matches both yield `None`; neither is
    /// retried.
    pub fn resolve(&self, port_name: &str) -> Option<PortMetadata> {
        let devices = match self.provider.all_devices() {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Metadata lookup for {} failed: {}", port_name, e);
                return None;
            }
        };

        let found = devices
            .into_iter()
            .find(|d| d.configured_port_name() == Some(port_name))
            .map(|d| PortMetadata {
                friendly_name: d.friendly_name().map(str::to_string),
                device_id: Some(d.device_id().to_string()),
            });

        if found.is_none() {
            debug!("No device exposes {}", port_name);
        }
        found
    }
}

impl fmt::Debug for MetadataResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use crate::inventory::DeviceRecord;

    struct FixedInventory(Vec<DeviceRecord>);

    impl MetadataProvider for FixedInventory {
        fn all_devices(&self) -> Result<Vec<DeviceRecord>, DetectError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenInventory;

    impl MetadataProvider for BrokenInventory {
        fn all_devices(&self) -> Result<Vec<DeviceRecord>, DetectError> {
            Err(DetectError::InventoryFailed("access denied".to_string()))
        }
    }

    fn inventory() -> FixedInventory {
        FixedInventory(vec![
            DeviceRecord::new("ROOT\\HUB\\0000", None, Some("USB Root Hub".to_string())),
            DeviceRecord::new(
                "USB\\VID_2341",
                Some("COM7".to_string()),
                Some("Arduino Uno".to_string()),
            ),
            DeviceRecord::new(
                "USB\\VID_0403&PID_6001",
                Some("COM7".to_string()),
                Some("Second match".to_string()),
            ),
            DeviceRecord::new("USB\\VID_1A86&PID_7523", Some("COM8".to_string()), None),
        ])
    }

    #[test]
    fn resolves_first_matching_device() {
        let resolver = MetadataResolver::new(inventory());
        let meta = resolver.resolve("COM7").unwrap();
        assert_eq!(meta.friendly_name.as_deref(), Some("Arduino Uno"));
        assert_eq!(meta.device_id.as_deref(), Some("USB\\VID_2341"));
    }

    #[test]
    fn match_without_friendly_name() {
        let resolver = MetadataResolver::new(inventory());
        let meta = resolver.resolve("COM8").unwrap();
        assert_eq!(meta.friendly_name, None);
        assert_eq!(meta.device_id.as_deref(), Some("USB\\VID_1A86&PID_7523"));
    }

    #[test]
    fn no_match_is_none() {
        let resolver = MetadataResolver::new(inventory());
        assert!(resolver.resolve("COM9").is_none());
        // exact match only
        assert!(resolver.resolve("com7").is_none());
    }

    #[test]
    fn provider_error_is_none() {
        let resolver = MetadataResolver::new(BrokenInventory);
        assert!(resolver.resolve("COM7").is_none());
    }
}
