//! Values published by the playback clock.
//!
//! A `Frame` is the current (time, shape) pair handed to observers on every
//! publication. `ClockEvent`s are discrete lifecycle signals queued for the
//! host to drain.

use serde::{Deserialize, Serialize};

use crate::data::Shape;

/// Query time and the shape interpolated for it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time: f64,
    pub shape: Shape,
}

/// Discrete signals emitted by the clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ClockEvent {
    Started { time: f64 },
    Paused { time: f64 },
    Reset,
    Seeked { time: f64 },
    TickFailed { message: String },
}
