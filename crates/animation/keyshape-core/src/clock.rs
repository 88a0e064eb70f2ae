//! PlaybackClock: turns host ticks into a looping query time.
//!
//! Ticks come from a [`TickSource`] (a frame scheduler in a browser, a
//! [`ManualTicks`] queue in tests). Each tick carries the handle it was
//! requested under; only the currently pending handle is honoured, so a tick
//! that was already queued when the clock stopped is a no-op.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::outputs::{ClockEvent, Frame};
use crate::sampling::interpolate;
use crate::store::Timeline;

/// Queued lifecycle events kept for `drain_events`; older ones are dropped first.
pub const MAX_QUEUED_EVENTS: usize = 256;

/// Handle of one requested tick. A tick callback carries it back to the clock.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TickHandle(pub u32);

/// Handle of a registered frame observer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// Playback state of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No ticks are scheduled
    Stopped,
    /// Ticks advance the query time
    Running,
}

impl PlaybackState {
    /// Get the name of this playback state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    #[inline]
    pub fn can_play(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Capability to schedule one future tick.
pub trait TickSource {
    fn request_tick(&mut self) -> TickHandle;
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Deterministic tick source: the host delivers the outstanding request by hand.
///
/// Only the latest request and the latest cancellation are kept, so a
/// long-lived session holds constant state.
#[derive(Debug, Default)]
pub struct ManualTicks {
    next: u32,
    pending: Option<TickHandle>,
    last_cancelled: Option<TickHandle>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent request that has not been cancelled.
    #[inline]
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    #[inline]
    pub fn last_cancelled(&self) -> Option<TickHandle> {
        self.last_cancelled
    }

    /// Number of requests made so far.
    #[inline]
    pub fn requested_count(&self) -> u32 {
        self.next
    }
}

impl TickSource for ManualTicks {
    fn request_tick(&mut self) -> TickHandle {
        let handle = TickHandle(self.next);
        self.next = self.next.wrapping_add(1);
        self.pending = Some(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.last_cancelled = Some(handle);
    }
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn request_tick(&mut self) -> TickHandle {
        (**self).request_tick()
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        (**self).cancel_tick(handle)
    }
}

/// Wrap `t` into `[0, span)`.
fn wrap_time(t: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 0.0;
    }
    let m = t.rem_euclid(span);
    // rem_euclid can round up to `span` for tiny negative inputs
    if m >= span {
        0.0
    } else {
        m
    }
}

type Observer = Box<dyn FnMut(&Frame)>;

/// Looping playback clock over a fixed-duration timeline.
pub struct PlaybackClock<S> {
    source: S,
    state: PlaybackState,
    total_duration: f64,
    /// Host timestamp (ms) that maps to query time 0; set by the first tick after play/seek.
    anchor_ms: Option<f64>,
    /// Query time the next anchoring tick starts from: 0 after play, the target after seek.
    start_time: f64,
    pending: Option<TickHandle>,
    frame: Frame,
    next_subscription: u32,
    observers: Vec<(SubscriptionId, Observer)>,
    events: VecDeque<ClockEvent>,
}

impl<S> fmt::Debug for PlaybackClock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("state", &self.state)
            .field("total_duration", &self.total_duration)
            .field("anchor_ms", &self.anchor_ms)
            .field("start_time", &self.start_time)
            .field("pending", &self.pending)
            .field("frame", &self.frame)
            .field("observers", &self.observers.len())
            .field("queued_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl<S: TickSource> PlaybackClock<S> {
    pub fn new(source: S, total_duration: f64) -> Result<Self> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: format!("total_duration must be > 0, got {total_duration}"),
            });
        }
        Ok(Self {
            source,
            state: PlaybackState::Stopped,
            total_duration,
            anchor_ms: None,
            start_time: 0.0,
            pending: None,
            frame: Frame::default(),
            next_subscription: 0,
            observers: Vec::new(),
            events: VecDeque::new(),
        })
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    #[inline]
    pub fn current_time(&self) -> f64 {
        self.frame.time
    }

    #[inline]
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Last published frame.
    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Handle of the tick the clock is waiting for, if any.
    #[inline]
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Register an observer called with every published frame.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Frame) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Take queued lifecycle events, oldest first. At most [`MAX_QUEUED_EVENTS`]
    /// are kept between drains.
    pub fn drain_events(&mut self) -> Vec<ClockEvent> {
        self.events.drain(..).collect()
    }

    #[inline]
    pub fn queued_events(&self) -> usize {
        self.events.len()
    }

    /// Stopped → Running. Playback always starts over from time 0: the first
    /// tick afterwards maps to query time 0. Returns false if already running.
    pub fn play(&mut self) -> bool {
        if !self.state.can_play() {
            return false;
        }
        self.state = PlaybackState::Running;
        self.anchor_ms = None;
        self.start_time = 0.0;
        self.pending = Some(self.source.request_tick());
        log::debug!("clock: play");
        self.push_event(ClockEvent::Started { time: 0.0 });
        true
    }

    /// Running → Stopped, keeping the current time. Returns false if not running.
    pub fn pause(&mut self) -> bool {
        if !self.state.can_pause() {
            return false;
        }
        self.stop();
        log::debug!("clock: pause at {}s", self.frame.time);
        self.push_event(ClockEvent::Paused {
            time: self.frame.time,
        });
        true
    }

    /// Stop, rewind to 0 and publish the time-0 shape.
    pub fn reset(&mut self, timeline: &Timeline) {
        self.stop();
        log::debug!("clock: reset");
        self.push_event(ClockEvent::Reset);
        self.publish(Frame {
            time: 0.0,
            shape: timeline.shape_at_zero(),
        });
    }

    /// Jump to `time` (inclusive of the end of the timeline) and publish its shape.
    /// A running clock keeps playing from `time`: its next tick re-anchors there.
    pub fn seek(&mut self, time: f64, timeline: &Timeline) -> Result<&Frame> {
        if !time.is_finite() {
            return Err(EngineError::InvalidTime { time });
        }
        if time < 0.0 || time > self.total_duration {
            return Err(EngineError::TimeOutOfRange {
                time,
                duration: self.total_duration,
            });
        }
        let shape = interpolate(timeline, time)?;
        self.anchor_ms = None;
        self.start_time = time;
        self.push_event(ClockEvent::Seeked { time });
        self.publish(Frame { time, shape });
        Ok(&self.frame)
    }

    /// Deliver a tick. Returns the published frame, or `None` when the tick is
    /// stale (clock stopped, or not the pending handle).
    ///
    /// A failing tick stops the clock; it is not retried.
    pub fn tick(
        &mut self,
        handle: TickHandle,
        timestamp_ms: f64,
        timeline: &Timeline,
    ) -> Result<Option<&Frame>> {
        if !self.state.is_running() || self.pending != Some(handle) {
            log::trace!("clock: ignoring stale tick {:?}", handle);
            return Ok(None);
        }
        self.pending = None;

        match self.advance(timestamp_ms, timeline) {
            Ok(frame) => {
                self.publish(frame);
                self.pending = Some(self.source.request_tick());
                Ok(Some(&self.frame))
            }
            Err(err) => {
                log::error!("clock: tick {:?} failed: {err}", handle);
                self.stop();
                self.push_event(ClockEvent::TickFailed {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn advance(&mut self, timestamp_ms: f64, timeline: &Timeline) -> Result<Frame> {
        if !timestamp_ms.is_finite() {
            return Err(EngineError::InvalidTime { time: timestamp_ms });
        }
        let start = self.start_time;
        let anchor = *self
            .anchor_ms
            .get_or_insert(timestamp_ms - start * 1000.0);
        let elapsed = (timestamp_ms - anchor) / 1000.0;
        let time = wrap_time(elapsed, self.total_duration);
        let shape = interpolate(timeline, time)?;
        Ok(Frame { time, shape })
    }

    fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.source.cancel_tick(handle);
        }
        self.state = PlaybackState::Stopped;
        self.anchor_ms = None;
    }

    fn push_event(&mut self, event: ClockEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            if let Some(dropped) = self.events.pop_front() {
                log::trace!("clock: event queue full, dropping {:?}", dropped);
            }
        }
        self.events.push_back(event);
    }

    fn publish(&mut self, frame: Frame) {
        self.frame = frame;
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.frame);
        }
    }
}
