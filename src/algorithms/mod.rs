//! Core positioning algorithms

pub mod distance;
pub mod trilateration;

pub use distance::{estimate_distance, PathLossModel};
pub use trilateration::{rms_residual, solve, RangedReference};
