//! iBeacon Positioning
//!
//! Decodes iBeacon advertisements, filters them against a known set of
//! beacon identities, estimates range from signal strength and trilaterates
//! the observer's planar position against three reference beacons.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use crate::core::{Detection, DistanceEstimate, FilterIdentity, Position, ReferencePoint};
pub use algorithms::{estimate_distance, PathLossModel};
pub use processing::{parse_ibeacon_base64, parse_ibeacon_bytes, Admission, BeaconRegistry, IBeaconFrame};
pub use validation::PositioningError;
pub use utils::{ConfigError, ScanConfig};
pub use hardware::{
    Advertisement, AlwaysAuthorized, BeaconScanner, ManufacturerData, MockScanner, ScanError,
    ScanPermission, ScanResult,
};
pub use api::{
    ApiResult, CompletionReason, DetectionListFormatter, PositionRecord, PositionSink,
    ScanController, ScanOutcome, ScanSession, SessionError, SessionEvent, SessionState,
};
