//! Onion skin: neighbouring keyframes drawn faded behind the current pose.

use serde::{Deserialize, Serialize};

use crate::data::{KeyTime, Keyframe, Shape};
use crate::store::Timeline;

/// Previous and next keyframe around a time, if they should be shown.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OnionSkin {
    pub previous: Option<Keyframe>,
    pub next: Option<Keyframe>,
}

impl OnionSkin {
    /// Skins in drawing order (previous first).
    pub fn iter(&self) -> impl Iterator<Item = &Keyframe> {
        self.previous.iter().chain(self.next.iter())
    }
}

/// Keyframes bracketing `current_time`, excluding the selected one.
///
/// A non-finite `current_time` yields an empty skin.
pub fn onion_skin(timeline: &Timeline, current_time: f64, selected: Option<f64>) -> OnionSkin {
    let Ok(key) = KeyTime::new(current_time) else {
        return OnionSkin::default();
    };
    let is_selected = |t: f64| selected == Some(t);
    let to_keyframe = |(time, shape): (f64, &Shape)| Keyframe {
        time,
        shape: shape.clone(),
    };

    OnionSkin {
        previous: timeline
            .at_or_before(key)
            .filter(|(t, _)| !is_selected(*t))
            .map(to_keyframe),
        next: timeline
            .after(key)
            .filter(|(t, _)| !is_selected(*t))
            .map(to_keyframe),
    }
}
