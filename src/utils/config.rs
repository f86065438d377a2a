use crate::algorithms::PathLossModel;
use crate::core::{
    FilterIdentity, ReferencePoint, DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_RSSI,
    DEFAULT_SCAN_DURATION_MS, REFERENCE_BEACON_COUNT,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Scan session configuration, fixed at construction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Identities of interest; the first three are bound to `reference_points` by index
    pub filter_identities: Vec<FilterIdentity>,
    /// Installed positions of the three reference beacons (meters)
    pub reference_points: Vec<ReferencePoint>,
    /// Length of the scan window (milliseconds)
    pub scan_duration_ms: u64,
    /// Path-loss exponent beyond the 1 m reference distance
    pub path_loss_exponent: f64,
    /// Calibrated RSSI at 1 meter (dBm)
    pub reference_rssi: i32,
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("Invalid {parameter} = {value}: {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    #[error("Config I/O error: {message}")]
    Io { message: String },
    /// JSON serialization/deserialization error
    #[error("Config serialization error: {message}")]
    Serialization { message: String },
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            filter_identities: vec![
                FilterIdentity::new(21, 1),
                FilterIdentity::new(22, 1),
                FilterIdentity::new(21, 2),
                FilterIdentity::new(9, 4),
            ],
            reference_points: vec![
                ReferencePoint::new(0.0, 0.0),
                ReferencePoint::new(20.0, 0.0),
                ReferencePoint::new(10.0, 17.32),
            ],
            scan_duration_ms: DEFAULT_SCAN_DURATION_MS,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            reference_rssi: DEFAULT_REFERENCE_RSSI,
        }
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl ScanConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = serde_json::from_str(content).map_err(|e| {
            ConfigError::Serialization { message: format!("Failed to parse config: {}", e) }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    /// Check every parameter; the first violation is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter_identities.len() < REFERENCE_BEACON_COUNT {
            return Err(invalid(
                "filter_identities",
                self.filter_identities.len(),
                "at least three identities are required",
            ));
        }

        let mut seen = HashSet::new();
        for identity in &self.filter_identities {
            if !seen.insert(*identity) {
                return Err(invalid("filter_identities", identity, "duplicate identity"));
            }
        }

        if self.reference_points.len() != REFERENCE_BEACON_COUNT {
            return Err(invalid(
                "reference_points",
                self.reference_points.len(),
                "exactly three reference points are required",
            ));
        }

        if let Some(point) = self.reference_points.iter().find(|p| !p.is_finite()) {
            return Err(invalid(
                "reference_points",
                format!("({}, {})", point.x, point.y),
                "coordinates must be finite",
            ));
        }

        if self.scan_duration_ms == 0 {
            return Err(invalid("scan_duration_ms", self.scan_duration_ms, "must be positive"));
        }

        if !self.path_loss_exponent.is_finite() || self.path_loss_exponent <= 0.0 {
            return Err(invalid(
                "path_loss_exponent",
                self.path_loss_exponent,
                "must be a positive finite number",
            ));
        }

        if self.reference_rssi >= 0 {
            return Err(invalid("reference_rssi", self.reference_rssi, "must be negative dBm"));
        }

        Ok(())
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::from_millis(self.scan_duration_ms)
    }

    pub fn path_loss_model(&self) -> PathLossModel {
        PathLossModel::new(self.reference_rssi, self.path_loss_exponent)
    }

    /// The identities bound to the reference points, in index order
    pub fn reference_identities(&self) -> &[FilterIdentity] {
        &self.filter_identities[..REFERENCE_BEACON_COUNT.min(self.filter_identities.len())]
    }
}
