//! Mock scanner implementation for testing and development

use crate::core::{FilterIdentity, IBEACON_LENGTH, IBEACON_MIN_LENGTH, IBEACON_TYPE};
use crate::hardware::{
    Advertisement, AdvertisementStream, BeaconScanner, ManufacturerData, ScanError, ScanResult,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Apple company identifier, little-endian as it appears on air
const APPLE_COMPANY_ID: [u8; 2] = [0x4C, 0x00];

/// Proximity UUID used by simulated beacons
const MOCK_PROXIMITY_UUID: [u8; 16] = [
    0xE2, 0xC5, 0x6D, 0xB5, 0xDF, 0xFB, 0x48, 0xD2, 0xB0, 0x60, 0xD0, 0xF5, 0xA7, 0x10, 0x96, 0xE0,
];

/// Measured power byte of simulated beacons (-59 dBm)
const MOCK_MEASURED_POWER: u8 = 0xC5;

/// Spare channel capacity for events pushed while a scan is running
const LIVE_CAPACITY: usize = 64;

struct MockState {
    script: Vec<ScanResult<Advertisement>>,
    sender: Option<mpsc::Sender<ScanResult<Advertisement>>>,
    close_after_script: bool,
    start_error: Option<ScanError>,
    start_count: u32,
    stop_count: u32,
}

/// Scripted scanner that replays a fixed sequence of events on every scan
pub struct MockScanner {
    state: Mutex<MockState>,
}

impl MockScanner {
    /// Create a mock scanner whose stream stays open until stopped
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                script: Vec::new(),
                sender: None,
                close_after_script: false,
                start_error: None,
                start_count: 0,
                stop_count: 0,
            }),
        }
    }

    /// Create a mock scanner replaying the given advertisements
    pub fn with_advertisements(advertisements: Vec<Advertisement>) -> Self {
        let scanner = Self::new();
        for adv in advertisements {
            scanner.add_advertisement(adv);
        }
        scanner
    }

    /// Queue an advertisement for every subsequent scan
    pub fn add_advertisement(&self, adv: Advertisement) {
        self.state.lock().script.push(Ok(adv));
    }

    /// Queue a radio failure at this point of the script
    pub fn add_error(&self, error: ScanError) {
        self.state.lock().script.push(Err(error));
    }

    /// Close the stream once the script has been delivered
    pub fn close_after_script(&self, close: bool) {
        self.state.lock().close_after_script = close;
    }

    /// Make the next `start_scan` fail with the given error
    pub fn fail_next_start(&self, error: ScanError) {
        self.state.lock().start_error = Some(error);
    }

    /// Deliver an advertisement to the running scan.
    ///
    /// Returns false when no scan is running or its stream is gone.
    pub fn push(&self, adv: Advertisement) -> bool {
        match self.state.lock().sender.as_ref() {
            Some(sender) => sender.try_send(Ok(adv)).is_ok(),
            None => false,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.state.lock().sender.is_some()
    }

    pub fn start_count(&self) -> u32 {
        self.state.lock().start_count
    }

    pub fn stop_count(&self) -> u32 {
        self.state.lock().stop_count
    }

    /// Build a 25-byte iBeacon manufacturer payload for the given identity
    pub fn ibeacon_payload(identity: FilterIdentity) -> Vec<u8> {
        let mut data = Vec::with_capacity(IBEACON_MIN_LENGTH);
        data.extend_from_slice(&APPLE_COMPANY_ID);
        data.push(IBEACON_TYPE);
        data.push(IBEACON_LENGTH);
        data.extend_from_slice(&MOCK_PROXIMITY_UUID);
        data.extend_from_slice(&identity.major.to_be_bytes());
        data.extend_from_slice(&identity.minor.to_be_bytes());
        data.push(MOCK_MEASURED_POWER);
        data
    }

    /// Build an advertisement carrying a base64-encoded iBeacon payload
    pub fn ibeacon_advertisement(
        device_id: impl Into<String>,
        identity: FilterIdentity,
        rssi: i32,
    ) -> Advertisement {
        let encoded = STANDARD.encode(Self::ibeacon_payload(identity));
        Advertisement::new(device_id, rssi)
            .with_manufacturer_data(ManufacturerData::Encoded(encoded))
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BeaconScanner for MockScanner {
    fn start_scan(&self) -> ScanResult<AdvertisementStream> {
        let mut state = self.state.lock();

        if let Some(error) = state.start_error.take() {
            return Err(error);
        }
        if state.sender.is_some() {
            return Err(ScanError::AlreadyScanning);
        }

        let (sender, receiver) = mpsc::channel(state.script.len() + LIVE_CAPACITY);
        for event in &state.script {
            // Capacity covers the whole script
            let _ = sender.try_send(event.clone());
        }

        state.start_count += 1;
        if !state.close_after_script {
            state.sender = Some(sender);
        }
        Ok(receiver)
    }

    fn stop_scan(&self) {
        let mut state = self.state.lock();
        state.sender = None;
        state.stop_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ibeacon_payload_layout() {
        let data = MockScanner::ibeacon_payload(FilterIdentity::new(0x1234, 0xABCD));
        assert_eq!(data.len(), IBEACON_MIN_LENGTH);
        assert_eq!(data[2], IBEACON_TYPE);
        assert_eq!(data[3], IBEACON_LENGTH);
        assert_eq!(&data[20..24], &[0x12, 0x34, 0xAB, 0xCD]);
    }

    #[tokio::test]
    async fn test_replays_script_and_closes() {
        let scanner = MockScanner::with_advertisements(vec![
            Advertisement::new("a", -60),
            Advertisement::new("b", -70),
        ]);
        scanner.close_after_script(true);

        let mut stream = scanner.start_scan().unwrap();
        assert_eq!(stream.recv().await.unwrap().unwrap().device_id, "a");
        assert_eq!(stream.recv().await.unwrap().unwrap().device_id, "b");
        assert!(stream.recv().await.is_none());
        assert!(!scanner.is_scanning());
    }

    #[tokio::test]
    async fn test_live_push_and_stop() {
        let scanner = MockScanner::new();
        let mut stream = scanner.start_scan().unwrap();
        assert!(matches!(scanner.start_scan(), Err(ScanError::AlreadyScanning)));

        assert!(scanner.push(Advertisement::new("live", -55)));
        assert_eq!(stream.recv().await.unwrap().unwrap().device_id, "live");

        scanner.stop_scan();
        scanner.stop_scan();
        assert_eq!(scanner.stop_count(), 2);
        assert!(!scanner.push(Advertisement::new("late", -55)));
        assert!(stream.recv().await.is_none());
    }

    #[test]
    fn test_start_failure() {
        let scanner = MockScanner::new();
        scanner.fail_next_start(ScanError::AdapterUnavailable { reason: "off".to_string() });
        assert!(scanner.start_scan().is_err());
        assert!(scanner.start_scan().is_ok());
        assert_eq!(scanner.start_count(), 1);
    }
}
