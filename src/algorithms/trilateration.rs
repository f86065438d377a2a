//! Closed-form 2D trilateration against three reference points
//!
//! The three circle equations are linearized by subtracting consecutive
//! pairs, leaving a 2x2 system solved with Cramer's rule. The result is a
//! one-shot exact solve: no clamping, no bounds check, no refinement.

use crate::core::{Position, ReferencePoint, DEGENERATE_DETERMINANT};
use crate::validation::PositioningError;
use nalgebra::Matrix2;

/// A reference point paired with the estimated distance to it (meters)
pub type RangedReference = (ReferencePoint, f64);

/// Solve for the observer position.
///
/// Fails with `DegenerateGeometry` when the references are collinear or
/// coincident to numerical precision.
pub fn solve(references: &[RangedReference; 3]) -> Result<Position, PositioningError> {
    let [(p1, r1), (p2, r2), (p3, r3)] = *references;
    let (x1, y1, x2, y2, x3, y3) = (p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);

    let a = 2.0 * (x2 - x1);
    let b = 2.0 * (y2 - y1);
    let c = r1 * r1 - r2 * r2 - x1 * x1 + x2 * x2 - y1 * y1 + y2 * y2;
    let d = 2.0 * (x3 - x2);
    let e = 2.0 * (y3 - y2);
    let f = r2 * r2 - r3 * r3 - x2 * x2 + x3 * x3 - y2 * y2 + y3 * y3;

    let system = Matrix2::new(a, b, d, e);
    let determinant = system.determinant();

    if determinant.is_nan() || determinant.abs() < DEGENERATE_DETERMINANT {
        return Err(PositioningError::DegenerateGeometry { determinant });
    }

    Ok(Position {
        x: (c * e - b * f) / determinant,
        y: (a * f - c * d) / determinant,
    })
}

/// Root-mean-square gap between estimated distances and the distances from
/// `position` to each reference
pub fn rms_residual(references: &[RangedReference; 3], position: &Position) -> f64 {
    let sum: f64 = references
        .iter()
        .map(|(point, distance)| {
            let gap = position.distance_to(point) - distance;
            gap * gap
        })
        .sum();
    (sum / references.len() as f64).sqrt()
}
