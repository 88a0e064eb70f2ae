//! Geometric data model: points, shapes, keyframe times and keyframes.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A single shape vertex in surface coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Set on points padded in by normalization rather than authored.
    #[serde(default, rename = "isGhost")]
    pub is_ghost: bool,
}

impl Point {
    /// An authored (non-ghost) point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            is_ghost: false,
        }
    }

    /// Copy of this point flagged as synthesized.
    #[inline]
    pub fn ghost(self) -> Self {
        Self {
            is_ghost: true,
            ..self
        }
    }

    #[inline]
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

/// Ordered point list; order is drawing order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(Vec<Point>);

impl Shape {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape of authored points from `(x, y)` pairs.
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.0.get(index)
    }

    #[inline]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.0.iter()
    }

    #[inline]
    pub fn push(&mut self, point: Point) {
        self.0.push(point);
    }

    /// Replace the point at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, point: Point) -> Result<Point> {
        let len = self.0.len();
        let slot = self
            .0
            .get_mut(index)
            .ok_or(EngineError::PointIndex { index, len })?;
        Ok(std::mem::replace(slot, point))
    }

    /// Number of authored (non-ghost) points.
    pub fn real_len(&self) -> usize {
        self.0.iter().filter(|p| !p.is_ghost).count()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl From<Vec<Point>> for Shape {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for Shape {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Shape {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Finite time in seconds with a total order, used to key the timeline.
#[derive(Clone, Copy, Debug)]
pub struct KeyTime(f64);

impl KeyTime {
    /// Rejects NaN and infinities. `-0.0` is folded into `0.0`.
    pub fn new(seconds: f64) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(EngineError::InvalidTime { time: seconds });
        }
        Ok(Self(seconds + 0.0))
    }

    #[inline]
    pub fn zero() -> Self {
        Self(0.0)
    }

    #[inline]
    pub fn as_seconds(self) -> f64 {
        self.0
    }
}

impl PartialEq for KeyTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyTime {}

impl PartialOrd for KeyTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for KeyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A recorded pose: one shape at one time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds within `[0, total_duration)`.
    pub time: f64,
    pub shape: Shape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_is_folded() {
        assert_eq!(KeyTime::new(-0.0).unwrap(), KeyTime::zero());
        assert!(KeyTime::new(-0.0).unwrap().as_seconds().is_sign_positive());
    }

    #[test]
    fn rejects_non_finite_times() {
        assert!(matches!(
            KeyTime::new(f64::NAN),
            Err(EngineError::InvalidTime { .. })
        ));
        assert!(KeyTime::new(f64::INFINITY).is_err());
    }

    #[test]
    fn point_json_uses_is_ghost_and_defaults_it() {
        let p: Point = serde_json::from_str(r#"{ "x": 1.5, "y": 2 }"#).unwrap();
        assert_eq!(p, Point::new(1.5, 2.0));
        let json = serde_json::to_string(&p.ghost()).unwrap();
        assert_eq!(json, r#"{"x":1.5,"y":2.0,"isGhost":true}"#);
    }

    #[test]
    fn set_reports_out_of_bounds() {
        let mut shape = Shape::from_coords(&[(0.0, 0.0)]);
        assert_eq!(
            shape.set(2, Point::new(1.0, 1.0)),
            Err(EngineError::PointIndex { index: 2, len: 1 })
        );
    }
}
