//! Scan session state machine
//!
//! `ScanSession` accumulates admitted detections while scanning and, once the
//! scan window ends, runs the distance estimator and the trilateration solver
//! to produce a single terminal outcome:
//!
//! ```text
//! Idle -> Scanning -> Computing -> Completed
//!            ^                        |
//!            +------- start ----------+
//! ```
//!
//! The session is synchronous. Its driver is responsible for serializing
//! calls and for delivering the queued events from `take_notifications`;
//! see `api::controller` for the async one.

use crate::algorithms::trilateration::{self, RangedReference};
use crate::algorithms::PathLossModel;
use crate::api::callback::{CallbackHandle, Notifications, ObserverRegistry, SessionEvent};
use crate::api::types::{ApiResult, CompletionReason, ScanOutcome, SessionError, SessionState, StopCause};
use crate::core::{Detection, DistanceEstimate, Position, ReferencePoint, REFERENCE_BEACON_COUNT};
use crate::hardware::Advertisement;
use crate::processing::{parse_manufacturer_data, Admission, BeaconRegistry, Sighting};
use crate::utils::{ConfigError, ScanConfig};
use crate::validation::PositioningError;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// A solved fix together with its range residual
struct Fix {
    position: Position,
    residual_m: f64,
}

/// Single-session scan controller
#[derive(Debug)]
pub struct ScanSession {
    config: ScanConfig,
    model: PathLossModel,
    state: SessionState,
    registry: BeaconRegistry,
    started_at: Option<DateTime<Utc>>,
    outcome: Option<ScanOutcome>,
    observers: ObserverRegistry,
    pending: Vec<SessionEvent>,
}

impl ScanSession {
    /// Create an idle session; the configuration is validated here
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            model: config.path_loss_model(),
            registry: BeaconRegistry::new(config.filter_identities.clone()),
            config,
            state: SessionState::Idle,
            started_at: None,
            outcome: None,
            observers: ObserverRegistry::default(),
            pending: Vec::new(),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Detections of the current or last session, in arrival order
    pub fn detections(&self) -> &[Detection] {
        self.registry.detections()
    }

    /// Outcome of the last completed session
    pub fn outcome(&self) -> Option<&ScanOutcome> {
        self.outcome.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn register_observer<F>(&mut self, observer: F) -> CallbackHandle
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.observers.register(observer)
    }

    pub fn unregister_observer(&mut self, handle: CallbackHandle) -> bool {
        self.observers.unregister(handle)
    }

    /// Detach the events queued since the last call, addressed to the
    /// observers registered now
    pub fn take_notifications(&mut self) -> Notifications {
        self.observers.batch(std::mem::take(&mut self.pending))
    }

    /// Begin a new scanning session.
    ///
    /// Rejected without side effects while another session is active, then
    /// when `authorized` is false.
    pub fn start(&mut self, authorized: bool, now: DateTime<Utc>) -> ApiResult<()> {
        if !self.state.accepts_start() {
            warn!(state = %self.state, "start rejected: session already active");
            return Err(SessionError::AlreadyActive { state: self.state });
        }
        if !authorized {
            warn!("start rejected: scanning not authorized");
            return Err(SessionError::NotAuthorized);
        }

        self.registry.clear();
        self.outcome = None;
        self.started_at = Some(now);
        self.transition(SessionState::Scanning);

        info!(
            duration_ms = self.config.scan_duration_ms,
            identities = self.config.filter_identities.len(),
            "scan started"
        );
        Ok(())
    }

    /// Route one advertisement through decoding and the registry.
    ///
    /// Returns `None` when not scanning or when the payload is not an
    /// iBeacon frame.
    pub fn handle_advertisement(
        &mut self,
        adv: &Advertisement,
        observed_at: DateTime<Utc>,
    ) -> Option<Admission> {
        if self.state != SessionState::Scanning {
            debug!(device_id = %adv.device_id, state = %self.state, "advertisement outside scan window");
            return None;
        }

        let frame = parse_manufacturer_data(adv.manufacturer_data.as_ref())?;
        let admission = self.registry.admit(
            frame,
            Sighting {
                device_id: adv.device_id.clone(),
                name: adv.display_name(),
                rssi: adv.rssi,
                observed_at,
            },
        );

        if let Admission::Admitted { count } = admission {
            if let Some(detection) = self.registry.detections().last() {
                debug!(
                    device_id = %detection.device_id,
                    identity = %detection.identity(),
                    rssi = detection.rssi,
                    count,
                    "beacon admitted"
                );
                self.pending.push(SessionEvent::DetectionAdmitted {
                    detection: detection.clone(),
                    count,
                });
            }
        }

        Some(admission)
    }

    /// End the scanning phase and compute the terminal outcome.
    ///
    /// Runs at most once per session; later events are ignored.
    pub fn finish(&mut self, cause: StopCause, now: DateTime<Utc>) -> ApiResult<ScanOutcome> {
        if self.state != SessionState::Scanning {
            return Err(SessionError::NotScanning { state: self.state });
        }
        self.transition(SessionState::Computing);

        let detections = self.annotated_detections();
        let started_at = self.started_at.unwrap_or(now);

        let outcome = match cause {
            StopCause::ExternalFailure(error) => {
                warn!(
                    %error,
                    recoverable = error.is_recoverable(),
                    detections = detections.len(),
                    "scan stopped by scanner failure"
                );
                ScanOutcome {
                    position: None,
                    reason: CompletionReason::ExternalFailure,
                    detections,
                    residual_m: None,
                    failure: Some(error.to_string()),
                    started_at,
                    completed_at: now,
                }
            }
            StopCause::TimerExpired | StopCause::StreamEnded => match self.compute_fix() {
                Ok(fix) => {
                    debug!(residual_m = fix.residual_m, "trilateration residual");
                    ScanOutcome {
                        position: Some(fix.position),
                        reason: CompletionReason::Ok,
                        detections,
                        residual_m: Some(fix.residual_m),
                        failure: None,
                        started_at,
                        completed_at: now,
                    }
                }
                Err(error) => ScanOutcome {
                    position: None,
                    reason: error.reason(),
                    detections,
                    residual_m: None,
                    failure: Some(error.to_string()),
                    started_at,
                    completed_at: now,
                },
            },
        };

        match outcome.position {
            Some(position) => info!(x = position.x, y = position.y, "scan completed with position"),
            None => info!(reason = %outcome.reason, "scan completed without position"),
        }

        self.outcome = Some(outcome.clone());
        self.transition(SessionState::Completed);
        self.pending.push(SessionEvent::Completed(outcome.clone()));
        Ok(outcome)
    }

    fn compute_fix(&self) -> Result<Fix, PositioningError> {
        let available = self.registry.len();
        if available < REFERENCE_BEACON_COUNT {
            return Err(PositioningError::InsufficientBeacons {
                available,
                required: REFERENCE_BEACON_COUNT,
            });
        }

        let mut references: [RangedReference; REFERENCE_BEACON_COUNT] =
            [(ReferencePoint::new(0.0, 0.0), 0.0); REFERENCE_BEACON_COUNT];

        let bound = self
            .config
            .reference_identities()
            .iter()
            .zip(&self.config.reference_points);

        for (index, (identity, point)) in bound.enumerate() {
            let detection = self.registry.find_identity(*identity).ok_or(
                PositioningError::MissingRequiredBeacon { identity: *identity, index },
            )?;
            let distance = self
                .model
                .estimate(detection.rssi)
                .ok_or(PositioningError::UnknownDistance { identity: *identity })?;
            references[index] = (*point, distance);
        }

        let position = trilateration::solve(&references)?;
        Ok(Fix {
            residual_m: trilateration::rms_residual(&references, &position),
            position,
        })
    }

    fn annotated_detections(&self) -> Vec<DistanceEstimate> {
        self.registry
            .detections()
            .iter()
            .map(|detection| DistanceEstimate {
                distance_m: self.model.estimate(detection.rssi),
                detection: detection.clone(),
            })
            .collect()
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        debug!(%from, %to, "session state changed");
        self.pending.push(SessionEvent::StateChanged { from, to });
    }
}
