//! Output formatting for positions and detection lists
//!
//! `PositionRecord` is the payload handed to the persistence store. Its
//! `latitude`/`longitude` fields carry the planar `x`/`y` coordinates; the
//! names are a compatibility convention with the store, not geodetic values.

use crate::core::{DistanceEstimate, Position};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Message shown when no target beacon was detected
pub const EMPTY_LIST_MESSAGE: &str = "No target beacons were detected";

/// Position payload for the remote persistence store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionRecord {
    pub fn from_position(position: &Position, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            latitude: position.x,
            longitude: position.y,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Renders the detection list for display or export
pub struct DetectionListFormatter;

impl DetectionListFormatter {
    /// One block per detection, in arrival order
    pub fn format_text(detections: &[DistanceEstimate]) -> String {
        if detections.is_empty() {
            return EMPTY_LIST_MESSAGE.to_string();
        }

        let mut output = String::new();
        for estimate in detections {
            let d = &estimate.detection;
            let _ = writeln!(output, "{}", d.name);
            let _ = writeln!(output, "  ID: {}", d.device_id);
            let _ = writeln!(output, "  major: {} minor: {}", d.major, d.minor);
            let _ = writeln!(output, "  RSSI: {}", d.rssi);
            let _ = writeln!(output, "  Detected at: {}", d.observed_at.to_rfc3339_opts(SecondsFormat::Millis, true));
            let _ = writeln!(output, "  Distance: {}", format_distance(estimate.distance_m));
        }
        output
    }

    pub fn format_csv(detections: &[DistanceEstimate]) -> String {
        let mut output = String::from("device_id,name,major,minor,rssi,observed_at,distance_m\n");
        for estimate in detections {
            let d = &estimate.detection;
            let distance = estimate
                .distance_m
                .map(|m| format!("{:.3}", m))
                .unwrap_or_default();
            let _ = writeln!(
                output,
                "{},{},{},{},{},{},{}",
                csv_field(&d.device_id),
                csv_field(&d.name),
                d.major,
                d.minor,
                d.rssi,
                d.observed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                distance
            );
        }
        output
    }
}

fn format_distance(distance_m: Option<f64>) -> String {
    match distance_m {
        Some(m) => format!("{:.2} m", m),
        None => "unknown".to_string(),
    }
}

/// Quote a CSV field when it contains separators or quotes
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
