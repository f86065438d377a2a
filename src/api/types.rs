//! Common API types and data structures

use crate::api::formatting::PositionRecord;
use crate::core::{DistanceEstimate, Position};
use crate::hardware::ScanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for session operations
pub type ApiResult<T> = Result<T, SessionError>;

/// Errors returned synchronously by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session is already running; the request had no effect
    #[error("Scan session already active ({state})")]
    AlreadyActive { state: SessionState },
    /// The platform did not authorize scanning
    #[error("Scanning is not authorized")]
    NotAuthorized,
    /// The operation requires a scanning session
    #[error("No scan in progress ({state})")]
    NotScanning { state: SessionState },
}

/// Scan session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Scanning,
    Computing,
    Completed,
}

impl SessionState {
    /// Whether a new session may start from this state
    pub fn accepts_start(&self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Scanning => "scanning",
            SessionState::Computing => "computing",
            SessionState::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session completed the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    Ok,
    InsufficientBeacons,
    MissingRequiredBeacon,
    UnknownDistance,
    DegenerateGeometry,
    ExternalFailure,
}

impl CompletionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionReason::Ok => "ok",
            CompletionReason::InsufficientBeacons => "insufficient_beacons",
            CompletionReason::MissingRequiredBeacon => "missing_required_beacon",
            CompletionReason::UnknownDistance => "unknown_distance",
            CompletionReason::DegenerateGeometry => "degenerate_geometry",
            CompletionReason::ExternalFailure => "external_failure",
        }
    }
}

impl fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What ended the scanning phase
#[derive(Debug, Clone, PartialEq)]
pub enum StopCause {
    /// The scan window elapsed
    TimerExpired,
    /// The scanner closed its stream early
    StreamEnded,
    /// The scanner reported a failure
    ExternalFailure(ScanError),
}

/// Terminal result of a scan session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Solved position, present only when `reason` is `Ok`
    pub position: Option<Position>,
    pub reason: CompletionReason,
    /// Every detection of the session with its estimated distance
    pub detections: Vec<DistanceEstimate>,
    /// RMS disagreement between estimated and solved ranges (meters)
    pub residual_m: Option<f64>,
    /// Human-readable failure detail
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ScanOutcome {
    pub fn is_ok(&self) -> bool {
        self.reason == CompletionReason::Ok
    }

    /// Payload for the persistence store, when a position was solved
    pub fn position_record(&self) -> Option<PositionRecord> {
        self.position
            .map(|position| PositionRecord::from_position(&position, self.completed_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&CompletionReason::MissingRequiredBeacon).unwrap();
        assert_eq!(json, "\"missing_required_beacon\"");
        assert_eq!(CompletionReason::InsufficientBeacons.to_string(), "insufficient_beacons");
    }

    #[test]
    fn test_state_accepts_start() {
        assert!(SessionState::Idle.accepts_start());
        assert!(SessionState::Completed.accepts_start());
        assert!(!SessionState::Scanning.accepts_start());
        assert!(!SessionState::Computing.accepts_start());
    }

    #[test]
    fn test_position_record_only_with_position() {
        let now = Utc::now();
        let mut outcome = ScanOutcome {
            position: None,
            reason: CompletionReason::InsufficientBeacons,
            detections: Vec::new(),
            residual_m: None,
            failure: None,
            started_at: now,
            completed_at: now,
        };
        assert!(outcome.position_record().is_none());

        outcome.position = Some(Position::new(3.5, -1.25));
        outcome.reason = CompletionReason::Ok;
        let record = outcome.position_record().unwrap();
        assert_eq!(record.latitude, 3.5);
        assert_eq!(record.longitude, -1.25);
        assert_eq!(record.timestamp, now);
    }
}
