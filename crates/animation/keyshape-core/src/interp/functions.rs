//! Interpolation helpers:
//! - lerp_f64 (scalar)
//! - lerp_point (x/y independently, ghost only if both ends are ghosts)
//! - lerp_shape (pointwise over equal-length shapes)

use crate::data::{Point, Shape};

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// A blended point stays real if it is real at either end.
#[inline]
pub fn lerp_point(a: &Point, b: &Point, t: f64) -> Point {
    Point {
        x: lerp_f64(a.x, b.x, t),
        y: lerp_f64(a.y, b.y, t),
        is_ghost: a.is_ghost && b.is_ghost,
    }
}

/// Pointwise blend. Shapes are expected to be normalized to the same length;
/// extra points on the longer side are ignored.
pub fn lerp_shape(a: &Shape, b: &Shape, t: f64) -> Shape {
    a.iter()
        .zip(b.iter())
        .map(|(pa, pb)| lerp_point(pa, pb, t))
        .collect()
}
