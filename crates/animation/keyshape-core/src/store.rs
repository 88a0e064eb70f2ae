//! KeyframeStore: the single owner of the timeline.
//!
//! Readers take [`Timeline`] snapshots. Writes go through `Arc::make_mut`, so a
//! snapshot taken before a write keeps its own copy of the map and never sees
//! a partial update.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use crate::data::{KeyTime, Keyframe, Shape};
use crate::error::{EngineError, Result};

/// Immutable view of the keyframes at one point in time.
#[derive(Clone, Debug)]
pub struct Timeline {
    keyframes: Arc<BTreeMap<KeyTime, Shape>>,
    total_duration: f64,
}

impl Timeline {
    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Shape recorded exactly at `time`.
    pub fn get(&self, time: f64) -> Option<&Shape> {
        let key = KeyTime::new(time).ok()?;
        self.keyframes.get(&key)
    }

    /// Recorded times, ascending and unique.
    pub fn sorted_times(&self) -> Vec<f64> {
        self.keyframes.keys().map(|k| k.as_seconds()).collect()
    }

    /// Iterate `(time, shape)` in ascending time order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &Shape)> + '_ {
        self.keyframes.iter().map(|(k, s)| (k.as_seconds(), s))
    }

    pub fn keyframes(&self) -> Vec<Keyframe> {
        self.iter()
            .map(|(time, shape)| Keyframe {
                time,
                shape: shape.clone(),
            })
            .collect()
    }

    /// Latest recorded time `<= time`.
    pub fn at_or_before(&self, time: KeyTime) -> Option<(f64, &Shape)> {
        self.keyframes
            .range(..=time)
            .next_back()
            .map(|(k, s)| (k.as_seconds(), s))
    }

    /// Earliest recorded time `> time`.
    pub fn after(&self, time: KeyTime) -> Option<(f64, &Shape)> {
        self.keyframes
            .range((Excluded(time), Unbounded))
            .next()
            .map(|(k, s)| (k.as_seconds(), s))
    }

    pub fn previous_time(&self, time: f64) -> Option<f64> {
        let key = KeyTime::new(time).ok()?;
        self.at_or_before(key).map(|(t, _)| t)
    }

    pub fn next_time(&self, time: f64) -> Option<f64> {
        let key = KeyTime::new(time).ok()?;
        self.after(key).map(|(t, _)| t)
    }

    /// Shape at time 0, or an empty shape if the invariant was broken.
    pub fn shape_at_zero(&self) -> Shape {
        self.keyframes
            .get(&KeyTime::zero())
            .cloned()
            .unwrap_or_default()
    }

    /// Largest point count over all keyframes.
    pub fn max_points(&self) -> usize {
        self.keyframes.values().map(Shape::len).max().unwrap_or(0)
    }
}

/// Ordered time → shape mapping with a fixed duration.
#[derive(Clone, Debug)]
pub struct KeyframeStore {
    current: Timeline,
}

impl KeyframeStore {
    /// New store holding a single empty keyframe at time 0.
    pub fn new(total_duration: f64) -> Result<Self> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: format!("total_duration must be > 0, got {total_duration}"),
            });
        }
        let mut map = BTreeMap::new();
        map.insert(KeyTime::zero(), Shape::new());
        Ok(Self {
            current: Timeline {
                keyframes: Arc::new(map),
                total_duration,
            },
        })
    }

    /// Build a store from a keyframe list; later duplicates overwrite earlier ones.
    pub fn from_keyframes<I>(total_duration: f64, keyframes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Keyframe>,
    {
        let mut store = Self::new(total_duration)?;
        for kf in keyframes {
            store.record(kf.time, kf.shape)?;
        }
        Ok(store)
    }

    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.current.total_duration
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Cheap immutable view of the current timeline.
    #[inline]
    pub fn snapshot(&self) -> Timeline {
        self.current.clone()
    }

    pub fn get(&self, time: f64) -> Option<&Shape> {
        self.current.get(time)
    }

    pub fn sorted_times(&self) -> Vec<f64> {
        self.current.sorted_times()
    }

    /// Insert or overwrite the keyframe at `time`.
    pub fn record(&mut self, time: f64, shape: Shape) -> Result<()> {
        let duration = self.current.total_duration;
        if !time.is_finite() || time < 0.0 || time >= duration {
            log::warn!("rejecting keyframe at {time}s outside [0, {duration})");
            return Err(EngineError::TimeOutOfRange { time, duration });
        }
        let key = KeyTime::new(time)?;
        log::debug!("record keyframe at {key} with {} points", shape.len());
        Arc::make_mut(&mut self.current.keyframes).insert(key, shape);
        Ok(())
    }

    /// Drop every keyframe and restore the empty keyframe at time 0.
    pub fn reset(&mut self) {
        log::debug!("reset timeline ({} keyframes dropped)", self.len());
        let mut map = BTreeMap::new();
        map.insert(KeyTime::zero(), Shape::new());
        self.current.keyframes = Arc::new(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_empty_keyframe_at_zero() {
        let store = KeyframeStore::new(5.0).unwrap();
        assert_eq!(store.sorted_times(), vec![0.0]);
        assert_eq!(store.get(0.0), Some(&Shape::new()));
    }

    #[test]
    fn previous_and_next_bracket_query() {
        let mut store = KeyframeStore::new(5.0).unwrap();
        store.record(2.0, Shape::new()).unwrap();
        store.record(4.0, Shape::new()).unwrap();
        let tl = store.snapshot();
        assert_eq!(tl.previous_time(2.0), Some(2.0));
        assert_eq!(tl.previous_time(3.9), Some(2.0));
        assert_eq!(tl.next_time(2.0), Some(4.0));
        assert_eq!(tl.next_time(4.0), None);
        assert_eq!(tl.previous_time(-1.0), None);
    }

    #[test]
    fn snapshot_survives_later_writes() {
        let mut store = KeyframeStore::new(5.0).unwrap();
        let before = store.snapshot();
        store
            .record(1.0, Shape::from_coords(&[(1.0, 1.0)]))
            .unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }
}
