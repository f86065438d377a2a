//! Hardware abstraction layer for BLE advertisement scanning
//!
//! The radio and the platform permission flow live outside this crate; this
//! module defines the boundary they are driven through and a scripted mock
//! scanner for tests and demos.

pub mod scanner;
pub mod mock;
pub mod error;

pub use scanner::{AdvertisementStream, AlwaysAuthorized, BeaconScanner, ScanPermission};
pub use mock::MockScanner;
pub use error::{ScanError, ScanResult};

use crate::core::UNNAMED_DEVICE;
use serde::{Deserialize, Serialize};

/// Manufacturer-specific data as delivered by the platform BLE stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManufacturerData {
    /// Base64 text, as mobile stacks report it
    Encoded(String),
    /// Raw bytes
    Raw(Vec<u8>),
}

/// Raw advertisement event received from the scanner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub device_id: String,
    pub name: Option<String>,
    pub local_name: Option<String>,
    pub manufacturer_data: Option<ManufacturerData>,
    pub rssi: i32,
}

impl Advertisement {
    pub fn new(device_id: impl Into<String>, rssi: i32) -> Self {
        Self {
            device_id: device_id.into(),
            name: None,
            local_name: None,
            manufacturer_data: None,
            rssi,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_local_name(mut self, local_name: impl Into<String>) -> Self {
        self.local_name = Some(local_name.into());
        self
    }

    pub fn with_manufacturer_data(mut self, data: ManufacturerData) -> Self {
        self.manufacturer_data = Some(data);
        self
    }

    /// Name to display: advertised name, then local name, then a placeholder
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .or(self.local_name.as_deref())
            .unwrap_or(UNNAMED_DEVICE)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let adv = Advertisement::new("AA:BB", -60);
        assert_eq!(adv.display_name(), UNNAMED_DEVICE);

        let adv = adv.with_local_name("beacon-local");
        assert_eq!(adv.display_name(), "beacon-local");

        let adv = adv.with_name("Lobby");
        assert_eq!(adv.display_name(), "Lobby");
    }
}
