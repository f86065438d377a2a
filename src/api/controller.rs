//! Async driver for scan sessions
//!
//! `ScanController` owns a `ScanSession` behind a single mutex and drives it
//! from the scanner's advertisement stream and the scan-window timer. Each
//! advertisement and the final transition are applied under the lock as one
//! unit; the lock is never held across an await, and observers run only after
//! it is released.

use crate::api::callback::{CallbackHandle, SessionEvent};
use crate::api::persistence::PositionSink;
use crate::api::session::ScanSession;
use crate::api::types::{ApiResult, ScanOutcome, SessionState, StopCause};
use crate::core::Detection;
use crate::hardware::{AdvertisementStream, BeaconScanner, ScanError, ScanPermission};
use crate::utils::{ConfigError, ScanConfig};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::{self, Instant};
use tracing::{error, info, warn};

/// Cloneable handle running scan sessions against a scanner
#[derive(Clone)]
pub struct ScanController {
    session: Arc<Mutex<ScanSession>>,
    scanner: Arc<dyn BeaconScanner>,
    permission: Arc<dyn ScanPermission>,
    sink: Option<Arc<dyn PositionSink>>,
}

impl ScanController {
    pub fn new(
        config: ScanConfig,
        scanner: Arc<dyn BeaconScanner>,
        permission: Arc<dyn ScanPermission>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            session: Arc::new(Mutex::new(ScanSession::new(config)?)),
            scanner,
            permission,
            sink: None,
        })
    }

    /// Hand solved positions to the given persistence sink
    pub fn with_sink(mut self, sink: Arc<dyn PositionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn register_observer<F>(&self, observer: F) -> CallbackHandle
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.session.lock().register_observer(observer)
    }

    pub fn unregister_observer(&self, handle: CallbackHandle) -> bool {
        self.session.lock().unregister_observer(handle)
    }

    pub fn state(&self) -> SessionState {
        self.session.lock().state()
    }

    /// Snapshot of the current detection set
    pub fn detections(&self) -> Vec<Detection> {
        self.session.lock().detections().to_vec()
    }

    pub fn last_outcome(&self) -> Option<ScanOutcome> {
        self.session.lock().outcome().cloned()
    }

    /// Run one full scan session and return its outcome.
    ///
    /// Fails synchronously, leaving any running session untouched, when a
    /// session is already active or scanning is not authorized. Scanner
    /// failures are reported through the outcome. Dropping the returned
    /// future mid-scan stops the scanner and completes the session with
    /// `external_failure`, so a later run can start.
    pub async fn run_scan(&self) -> ApiResult<ScanOutcome> {
        let authorized = self.permission.is_scan_authorized();
        let (window, notifications) = {
            let mut session = self.session.lock();
            session.start(authorized, Utc::now())?;
            (session.config().scan_duration(), session.take_notifications())
        };
        notifications.deliver();

        let deadline = Instant::now() + window;
        let mut active = ActiveScan { controller: self, finished: false };

        let cause = match self.scanner.start_scan() {
            Ok(stream) => self.consume(stream, deadline).await,
            Err(error) => StopCause::ExternalFailure(error),
        };

        let outcome = active.complete(cause)?;
        self.persist(&outcome);
        Ok(outcome)
    }

    /// Feed advertisements to the session until the window closes
    async fn consume(&self, mut stream: AdvertisementStream, deadline: Instant) -> StopCause {
        let timer = time::sleep_until(deadline);
        tokio::pin!(timer);

        loop {
            // Expiry wins over anything still queued on the stream
            tokio::select! {
                biased;
                _ = &mut timer => return StopCause::TimerExpired,
                event = stream.recv() => match event {
                    Some(Ok(adv)) => {
                        let notifications = {
                            let mut session = self.session.lock();
                            session.handle_advertisement(&adv, Utc::now());
                            session.take_notifications()
                        };
                        notifications.deliver();
                    }
                    Some(Err(error)) => return StopCause::ExternalFailure(error),
                    None => return StopCause::StreamEnded,
                },
            }
        }
    }

    fn persist(&self, outcome: &ScanOutcome) {
        let (Some(sink), Some(record)) = (self.sink.as_ref(), outcome.position_record()) else {
            return;
        };

        match sink.submit(&record) {
            Ok(()) => info!(latitude = record.latitude, longitude = record.longitude, "position stored"),
            Err(e) => error!(error = %e, "failed to store position"),
        }
    }
}

/// A started session that still has to be stopped and finished
struct ActiveScan<'a> {
    controller: &'a ScanController,
    finished: bool,
}

impl ActiveScan<'_> {
    fn complete(&mut self, cause: StopCause) -> ApiResult<ScanOutcome> {
        self.finished = true;
        self.controller.scanner.stop_scan();

        let (outcome, notifications) = {
            let mut session = self.controller.session.lock();
            let outcome = session.finish(cause, Utc::now());
            (outcome, session.take_notifications())
        };
        notifications.deliver();
        outcome
    }
}

impl Drop for ActiveScan<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("scan dropped before its window closed");
        if let Err(e) = self.complete(StopCause::ExternalFailure(ScanError::Stopped)) {
            warn!(error = %e, "cancelled scan could not be finished");
        }
    }
}
