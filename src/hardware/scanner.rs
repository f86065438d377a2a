//! Scanner and permission interfaces for the BLE collaborator

use crate::hardware::{Advertisement, ScanResult};
use tokio::sync::mpsc;

/// Stream of advertisements delivered by a running scan.
///
/// A received `Err` ends the scan; the channel closing is treated like the
/// scan window elapsing.
pub type AdvertisementStream = mpsc::Receiver<ScanResult<Advertisement>>;

/// Hardware abstraction for a BLE advertisement scanner
pub trait BeaconScanner: Send + Sync {
    /// Begin scanning and return the stream of advertisements
    fn start_scan(&self) -> ScanResult<AdvertisementStream>;

    /// Stop scanning. Calling this while not scanning is a no-op.
    fn stop_scan(&self);
}

/// Platform check deciding whether scanning may begin
pub trait ScanPermission: Send + Sync {
    fn is_scan_authorized(&self) -> bool;
}

impl<F> ScanPermission for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_scan_authorized(&self) -> bool {
        self()
    }
}

/// Permission check for hosts without a runtime permission model
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAuthorized;

impl ScanPermission for AlwaysAuthorized {
    fn is_scan_authorized(&self) -> bool {
        true
    }
}
