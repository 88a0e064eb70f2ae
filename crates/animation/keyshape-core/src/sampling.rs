//! Timeline sampling: the shape at an arbitrary query time.
//!
//! Model:
//! - Keyframes are sparse; a query time is bracketed by the latest keyframe at
//!   or before it and the earliest keyframe after it.
//! - Before any keyframe the time-0 shape is used; after the last keyframe its
//!   shape is held.
//! - Inside a segment both shapes are normalized to a common point count and
//!   blended linearly. A segment whose shapes cannot be normalized (one side
//!   empty) holds the left shape, like a step track.
//!
//! API:
//! - interpolate(&Timeline, time) where time is in seconds.

use crate::data::{KeyTime, Shape};
use crate::error::Result;
use crate::interp::lerp_shape;
use crate::normalize::normalize_pair;
use crate::store::Timeline;

/// Bracketing keyframes for a query time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment<'a> {
    /// Query precedes every keyframe.
    Before,
    /// Query is on a keyframe or past the last one; hold this shape.
    Hold(f64, &'a Shape),
    /// Query is strictly inside `[t0, t1)`.
    Between {
        t0: f64,
        a: &'a Shape,
        t1: f64,
        b: &'a Shape,
    },
}

/// Locate the segment containing `time`.
pub fn find_segment(timeline: &Timeline, time: KeyTime) -> Segment<'_> {
    let Some((t0, a)) = timeline.at_or_before(time) else {
        return Segment::Before;
    };
    if t0 == time.as_seconds() {
        return Segment::Hold(t0, a);
    }
    match timeline.after(time) {
        Some((t1, b)) => Segment::Between { t0, a, t1, b },
        None => Segment::Hold(t0, a),
    }
}

/// Sample the timeline at `time` seconds.
pub fn interpolate(timeline: &Timeline, time: f64) -> Result<Shape> {
    let key = KeyTime::new(time)?;
    let shape = match find_segment(timeline, key) {
        Segment::Before => timeline.shape_at_zero(),
        Segment::Hold(_, shape) => shape.clone(),
        Segment::Between { t0, a, t1, b } => match normalize_pair(a, b) {
            Some((na, nb)) => {
                let t = (key.as_seconds() - t0) / (t1 - t0);
                lerp_shape(&na, &nb, t)
            }
            None => a.clone(),
        },
    };
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Point;
    use crate::store::KeyframeStore;

    #[test]
    fn segment_kinds() {
        let mut store = KeyframeStore::new(5.0).unwrap();
        store.record(2.0, Shape::new()).unwrap();
        let tl = store.snapshot();

        let at = |t: f64| find_segment(&tl, KeyTime::new(t).unwrap());
        assert_eq!(at(-1.0), Segment::Before);
        assert!(matches!(at(0.0), Segment::Hold(t, _) if t == 0.0));
        assert!(matches!(at(1.0), Segment::Between { t0, t1, .. } if t0 == 0.0 && t1 == 2.0));
        assert!(matches!(at(3.0), Segment::Hold(t, _) if t == 2.0));
    }

    #[test]
    fn blends_midpoint_and_marks_padding() {
        let mut store = KeyframeStore::new(5.0).unwrap();
        store
            .record(0.0, Shape::from_coords(&[(0.0, 0.0)]))
            .unwrap();
        store
            .record(2.0, Shape::from_coords(&[(10.0, 10.0), (20.0, 0.0)]))
            .unwrap();
        let out = interpolate(&store.snapshot(), 1.0).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.get(0), Some(&Point::new(5.0, 5.0)));
        // padded on the left only, so still real
        assert_eq!(out.get(1), Some(&Point::new(10.0, 0.0)));
    }
}
