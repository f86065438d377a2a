//! RSSI-to-distance estimation with an asymmetric path-loss curve

use crate::core::{DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_RSSI, NEAR_FIELD_EXPONENT};
use serde::{Deserialize, Serialize};

/// Path-loss model calibrated against the RSSI measured at 1 meter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossModel {
    /// Calibrated RSSI at 1 meter (dBm)
    pub reference_rssi: i32,
    /// Exponent applied at and beyond the reference distance
    pub path_loss_exponent: f64,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            reference_rssi: DEFAULT_REFERENCE_RSSI,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
        }
    }
}

impl PathLossModel {
    pub fn new(reference_rssi: i32, path_loss_exponent: f64) -> Self {
        Self { reference_rssi, path_loss_exponent }
    }

    /// Estimated distance in meters, or `None` when unknown.
    ///
    /// An RSSI of exactly 0 is the unknown-distance sentinel.
    pub fn estimate(&self, rssi: i32) -> Option<f64> {
        estimate_distance(rssi, self.reference_rssi, self.path_loss_exponent)
    }
}

/// Estimate distance from a single reading.
///
/// Readings stronger than the reference (`ratio < 1`) follow the steep
/// near-field curve `ratio^10`; the rest follow `ratio^n`.
pub fn estimate_distance(rssi: i32, reference_rssi: i32, path_loss_exponent: f64) -> Option<f64> {
    if rssi == 0 || reference_rssi == 0 {
        return None;
    }

    let ratio = rssi as f64 / reference_rssi as f64;
    if ratio < 1.0 {
        Some(ratio.powi(NEAR_FIELD_EXPONENT))
    } else {
        Some(ratio.powf(path_loss_exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rssi_is_unknown() {
        let model = PathLossModel::default();
        assert_eq!(model.estimate(0), None);
    }

    #[test]
    fn test_reference_rssi_is_one_meter() {
        let model = PathLossModel::default();
        assert_eq!(model.estimate(DEFAULT_REFERENCE_RSSI), Some(1.0));
    }

    #[test]
    fn test_near_field_curve() {
        let model = PathLossModel::new(-64, 2.0);
        let distance = model.estimate(-32).unwrap();
        assert!((distance - 0.0009765625).abs() < 1e-15);
    }

    #[test]
    fn test_far_field_curve() {
        let model = PathLossModel::new(-64, 2.0);
        let distance = model.estimate(-128).unwrap();
        assert!((distance - 4.0).abs() < 1e-12);

        let model = PathLossModel::new(-64, 3.0);
        let distance = model.estimate(-128).unwrap();
        assert!((distance - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_near_field_ignores_exponent() {
        let a = estimate_distance(-32, -64, 2.0).unwrap();
        let b = estimate_distance(-32, -64, 4.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_calibration() {
        let model = PathLossModel::default();
        // -75 / -63 squared
        let expected = (75.0f64 / 63.0).powi(2);
        assert!((model.estimate(-75).unwrap() - expected).abs() < 1e-12);
    }
}
