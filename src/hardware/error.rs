//! Scanner error types and handling

use thiserror::Error;

/// Errors surfaced by the BLE scanning collaborator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// No usable Bluetooth adapter, or the radio is powered off
    #[error("Bluetooth adapter unavailable: {reason}")]
    AdapterUnavailable { reason: String },
    /// The radio reported a failure while scanning
    #[error("Scan failed (code {code}): {description}")]
    ScanFailed { code: u32, description: String },
    /// A scan was requested on a scanner that is already streaming
    #[error("Scanner is already streaming advertisements")]
    AlreadyScanning,
    /// The scan was torn down before its window closed
    #[error("Scan stopped before the scan window closed")]
    Stopped,
}

/// Result type for scanner operations
pub type ScanResult<T> = Result<T, ScanError>;

impl ScanError {
    /// Whether a fresh scan is worth attempting after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ScanError::AdapterUnavailable { .. })
    }
}
