//! Failure taxonomy for position computation

pub mod error;

pub use error::PositioningError;
