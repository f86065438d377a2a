//! Identity filter and per-session detection registry

use crate::core::{Detection, FilterIdentity};
use crate::processing::parser::IBeaconFrame;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Metadata accompanying a decoded frame
#[derive(Debug, Clone)]
pub struct Sighting {
    pub device_id: String,
    pub name: String,
    pub rssi: i32,
    pub observed_at: DateTime<Utc>,
}

/// Result of offering a sighting to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting of this device; a Detection was stored
    Admitted { count: usize },
    /// The device already has a Detection this session
    Duplicate { count: usize },
    /// The identity is not in the filter set
    NotOfInterest { count: usize },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    /// Number of Detections held after this admission
    pub fn count(&self) -> usize {
        match *self {
            Admission::Admitted { count }
            | Admission::Duplicate { count }
            | Admission::NotOfInterest { count } => count,
        }
    }
}

/// Registry of accepted detections, unique by device id
#[derive(Debug, Clone)]
pub struct BeaconRegistry {
    filter: Vec<FilterIdentity>,
    detections: Vec<Detection>,
    seen_devices: HashSet<String>,
}

impl BeaconRegistry {
    pub fn new(filter: Vec<FilterIdentity>) -> Self {
        Self {
            filter,
            detections: Vec::new(),
            seen_devices: HashSet::new(),
        }
    }

    pub fn filter(&self) -> &[FilterIdentity] {
        &self.filter
    }

    pub fn is_of_interest(&self, identity: FilterIdentity) -> bool {
        self.filter.contains(&identity)
    }

    /// Offer a decoded frame; the first sighting of a device id wins
    pub fn admit(&mut self, frame: IBeaconFrame, sighting: Sighting) -> Admission {
        let identity = frame.identity();

        if !self.is_of_interest(identity) {
            return Admission::NotOfInterest { count: self.detections.len() };
        }

        if self.seen_devices.contains(&sighting.device_id) {
            debug!(device_id = %sighting.device_id, rssi = sighting.rssi, "duplicate sighting ignored");
            return Admission::Duplicate { count: self.detections.len() };
        }

        self.seen_devices.insert(sighting.device_id.clone());
        self.detections.push(Detection {
            device_id: sighting.device_id,
            name: sighting.name,
            major: frame.major,
            minor: frame.minor,
            rssi: sighting.rssi,
            observed_at: sighting.observed_at,
        });

        Admission::Admitted { count: self.detections.len() }
    }

    /// Detections in arrival order
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// First detection, in arrival order, carrying the given identity
    pub fn find_identity(&self, identity: FilterIdentity) -> Option<&Detection> {
        self.detections.iter().find(|d| d.identity() == identity)
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn clear(&mut self) {
        self.detections.clear();
        self.seen_devices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> BeaconRegistry {
        BeaconRegistry::new(vec![
            FilterIdentity::new(21, 1),
            FilterIdentity::new(22, 1),
            FilterIdentity::new(21, 2),
        ])
    }

    fn sighting(device_id: &str, rssi: i32) -> Sighting {
        Sighting {
            device_id: device_id.to_string(),
            name: format!("beacon-{}", device_id),
            rssi,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_admits_filtered_identity() {
        let mut registry = registry();
        let admission = registry.admit(IBeaconFrame { major: 21, minor: 1 }, sighting("a", -60));

        assert_eq!(admission, Admission::Admitted { count: 1 });
        assert!(admission.is_admitted());
        assert_eq!(registry.detections()[0].name, "beacon-a");
        assert_eq!(registry.detections()[0].identity(), FilterIdentity::new(21, 1));
    }

    #[test]
    fn test_rejects_unknown_identity() {
        let mut registry = registry();

        // Both fields must match; 21/3 and 9/1 share one field with the filter
        for frame in [
            IBeaconFrame { major: 21, minor: 3 },
            IBeaconFrame { major: 9, minor: 1 },
        ] {
            let admission = registry.admit(frame, sighting("x", -60));
            assert_eq!(admission, Admission::NotOfInterest { count: 0 });
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_first_sighting_wins() {
        let mut registry = registry();
        registry.admit(IBeaconFrame { major: 21, minor: 1 }, sighting("a", -60));
        let second = registry.admit(IBeaconFrame { major: 21, minor: 1 }, sighting("a", -40));

        assert_eq!(second, Admission::Duplicate { count: 1 });
        assert!(!second.is_admitted());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.detections()[0].rssi, -60);
    }

    #[test]
    fn test_duplicate_device_with_other_identity() {
        let mut registry = registry();
        registry.admit(IBeaconFrame { major: 21, minor: 1 }, sighting("a", -60));
        let second = registry.admit(IBeaconFrame { major: 22, minor: 1 }, sighting("a", -50));

        assert_eq!(second, Admission::Duplicate { count: 1 });
        assert_eq!(registry.find_identity(FilterIdentity::new(22, 1)), None);
    }

    #[test]
    fn test_find_identity_arrival_order() {
        let mut registry = registry();
        registry.admit(IBeaconFrame { major: 22, minor: 1 }, sighting("first", -70));
        registry.admit(IBeaconFrame { major: 22, minor: 1 }, sighting("second", -50));

        let found = registry.find_identity(FilterIdentity::new(22, 1)).unwrap();
        assert_eq!(found.device_id, "first");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut registry = registry();
        registry.admit(IBeaconFrame { major: 21, minor: 1 }, sighting("a", -60));
        registry.clear();

        assert!(registry.is_empty());
        let again = registry.admit(IBeaconFrame { major: 21, minor: 1 }, sighting("a", -65));
        assert_eq!(again, Admission::Admitted { count: 1 });
    }
}
