//! Session API and collaborator-facing interfaces
//!
//! `ScanSession` is the synchronous state machine; `ScanController` drives it
//! from an async advertisement stream and the scan-window timer.

pub mod types;
pub mod callback;
pub mod session;
pub mod controller;
pub mod formatting;
pub mod persistence;

pub use types::{
    ApiResult, CompletionReason, ScanOutcome, SessionError, SessionState, StopCause,
};
pub use callback::{CallbackHandle, Notifications, SessionEvent, SessionObserver};
pub use session::ScanSession;
pub use controller::ScanController;
pub use formatting::{DetectionListFormatter, PositionRecord};
pub use persistence::{JsonLinesSink, MemorySink, PositionSink, SinkError};
