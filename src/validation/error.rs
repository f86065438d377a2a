use crate::api::types::CompletionReason;
use crate::core::FilterIdentity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a scan window fails to produce a position
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PositioningError {
    /// Fewer detections than reference beacons
    #[error("Insufficient beacons: {available} detected, {required} required")]
    InsufficientBeacons { available: usize, required: usize },

    /// A reference identity had no detection this session
    #[error("Required beacon {identity} (reference {index}) not detected")]
    MissingRequiredBeacon { identity: FilterIdentity, index: usize },

    /// A reference beacon's reading carried the unknown-distance sentinel
    #[error("Distance to beacon {identity} is unknown")]
    UnknownDistance { identity: FilterIdentity },

    /// The reference points admit no unique solution
    #[error("Degenerate geometry: determinant {determinant:e} below threshold")]
    DegenerateGeometry { determinant: f64 },
}

impl PositioningError {
    /// Terminal session outcome this failure maps to
    pub fn reason(&self) -> CompletionReason {
        match self {
            PositioningError::InsufficientBeacons { .. } => CompletionReason::InsufficientBeacons,
            PositioningError::MissingRequiredBeacon { .. } => CompletionReason::MissingRequiredBeacon,
            PositioningError::UnknownDistance { .. } => CompletionReason::UnknownDistance,
            PositioningError::DegenerateGeometry { .. } => CompletionReason::DegenerateGeometry,
        }
    }
}
