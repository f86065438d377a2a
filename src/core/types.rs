//! Core data types for the positioning pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar coordinate of an installed reference beacon (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub x: f64,
    pub y: f64,
}

impl ReferencePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A (major, minor) beacon identity of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterIdentity {
    pub major: u16,
    pub minor: u16,
}

impl FilterIdentity {
    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for FilterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.major, self.minor)
    }
}

/// Solved observer location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to a reference point
    pub fn distance_to(&self, point: &ReferencePoint) -> f64 {
        let dx = self.x - point.x;
        let dy = self.y - point.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One accepted, deduplicated sighting of a beacon within a session.
///
/// Created on the first valid sighting of a device id and never updated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub device_id: String,
    pub name: String,
    pub major: u16,
    pub minor: u16,
    pub rssi: i32,
    pub observed_at: DateTime<Utc>,
}

impl Detection {
    pub fn identity(&self) -> FilterIdentity {
        FilterIdentity::new(self.major, self.minor)
    }
}

/// A detection annotated with its estimated distance.
///
/// `distance_m` is `None` when the reading carried the unknown-distance
/// sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceEstimate {
    pub detection: Detection,
    pub distance_m: Option<f64>,
}
