//! Protocol markers and deployment defaults

/// Minimum manufacturer-data length that can hold an iBeacon payload
pub const IBEACON_MIN_LENGTH: usize = 25;

/// iBeacon type marker at byte offset 2
pub const IBEACON_TYPE: u8 = 0x02;

/// iBeacon remaining-length marker at byte offset 3
pub const IBEACON_LENGTH: u8 = 0x15;

/// Byte offset of the big-endian major identifier
pub const IBEACON_MAJOR_OFFSET: usize = 20;

/// Byte offset of the big-endian minor identifier
pub const IBEACON_MINOR_OFFSET: usize = 22;

/// Calibrated RSSI at 1 meter for the deployed hardware (dBm)
pub const DEFAULT_REFERENCE_RSSI: i32 = -63;

/// Free-space path-loss exponent
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.0;

/// Exponent applied below the 1 m reference distance
pub const NEAR_FIELD_EXPONENT: i32 = 10;

/// Fixed scan window (milliseconds)
pub const DEFAULT_SCAN_DURATION_MS: u64 = 5000;

/// Determinant magnitude below which the reference geometry is degenerate
pub const DEGENERATE_DETERMINANT: f64 = 1e-6;

/// Number of reference beacons a fix is computed from
pub const REFERENCE_BEACON_COUNT: usize = 3;

/// Name shown for devices that advertise neither a name nor a local name
pub const UNNAMED_DEVICE: &str = "Unnamed";
