//! EditorSession: ties the store, the clock and pointer editing together.
//!
//! The session edits one shape at a time. With no keyframe selected that is
//! the transient buffer, which also follows playback; with a keyframe
//! selected edits go straight into the store at that time.

use serde::{Deserialize, Serialize};

use crate::clock::{PlaybackClock, TickHandle, TickSource};
use crate::config::Config;
use crate::data::{Point, Shape};
use crate::error::{EngineError, Result};
use crate::onion::{onion_skin, OnionSkin};
use crate::render::{scene, DrawCommand};
use crate::store::{KeyframeStore, Timeline};
use crate::svg::{self, SvgExport};

fn ensure_finite(point: &Point) -> Result<()> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidPoint {
            x: point.x,
            y: point.y,
        })
    }
}

/// Which shape an edit applies to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeTarget {
    /// The unrecorded working shape.
    Buffer,
    /// The keyframe recorded at this time.
    Keyframe(f64),
}

/// Outcome of a pointer press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerAction {
    /// An existing point was hit and is now being dragged.
    Grabbed(usize),
    /// Nothing was hit; a point was appended at this index.
    Added(usize),
}

#[derive(Clone, Copy, Debug, Default)]
struct PointerState {
    active: Option<usize>,
    dragging: bool,
}

#[derive(Debug)]
pub struct EditorSession<S> {
    cfg: Config,
    store: KeyframeStore,
    clock: PlaybackClock<S>,
    buffer: Shape,
    selected: Option<f64>,
    pointer: PointerState,
}

impl<S: TickSource> EditorSession<S> {
    /// Fresh session with an empty keyframe at time 0.
    pub fn new(cfg: Config, source: S) -> Result<Self> {
        cfg.validate()?;
        let store = KeyframeStore::new(cfg.total_duration)?;
        Self::with_store(cfg, store, source)
    }

    /// Session over an existing store. The store's duration wins over `cfg`.
    pub fn with_store(mut cfg: Config, store: KeyframeStore, source: S) -> Result<Self> {
        cfg.total_duration = store.total_duration();
        cfg.validate()?;
        let clock = PlaybackClock::new(source, cfg.total_duration)?;
        let buffer = store.snapshot().shape_at_zero();
        Ok(Self {
            cfg,
            store,
            clock,
            buffer,
            selected: None,
            pointer: PointerState::default(),
        })
    }

    // ----- accessors -----

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }

    #[inline]
    pub fn timeline(&self) -> Timeline {
        self.store.snapshot()
    }

    #[inline]
    pub fn clock(&self) -> &PlaybackClock<S> {
        &self.clock
    }

    /// Mutable clock access, e.g. to subscribe observers.
    #[inline]
    pub fn clock_mut(&mut self) -> &mut PlaybackClock<S> {
        &mut self.clock
    }

    #[inline]
    pub fn buffer(&self) -> &Shape {
        &self.buffer
    }

    #[inline]
    pub fn selected_keyframe(&self) -> Option<f64> {
        self.selected
    }

    #[inline]
    pub fn active_point(&self) -> Option<usize> {
        self.pointer.active
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.pointer.dragging
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }

    #[inline]
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    #[inline]
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.clock.pending_tick()
    }

    /// Target of pointer edits: the selected keyframe, else the buffer.
    pub fn target(&self) -> ShapeTarget {
        match self.selected {
            Some(time) => ShapeTarget::Keyframe(time),
            None => ShapeTarget::Buffer,
        }
    }

    /// The shape pointer edits apply to and the view draws.
    pub fn edited_shape(&self) -> &Shape {
        self.selected
            .and_then(|time| self.store.get(time))
            .unwrap_or(&self.buffer)
    }

    pub fn shape_of(&self, target: ShapeTarget) -> Result<&Shape> {
        match target {
            ShapeTarget::Buffer => Ok(&self.buffer),
            ShapeTarget::Keyframe(time) => self
                .store
                .get(time)
                .ok_or(EngineError::MissingKeyframe { time }),
        }
    }

    // ----- editing -----

    /// Append an authored point; returns its index.
    pub fn add_point(&mut self, target: ShapeTarget, point: Point) -> Result<usize> {
        ensure_finite(&point)?;
        let mut shape = self.shape_of(target)?.clone();
        shape.push(Point::new(point.x, point.y));
        let index = shape.len() - 1;
        self.commit(target, shape)?;
        Ok(index)
    }

    /// Overwrite the point at `index`. Ghost points are not editable.
    pub fn move_point(&mut self, target: ShapeTarget, index: usize, point: Point) -> Result<()> {
        ensure_finite(&point)?;
        let mut shape = self.shape_of(target)?.clone();
        match shape.get(index) {
            None => {
                return Err(EngineError::PointIndex {
                    index,
                    len: shape.len(),
                })
            }
            Some(p) if p.is_ghost => {
                log::warn!("editor: refusing to move ghost point {index}");
                return Err(EngineError::GhostPoint { index });
            }
            Some(_) => {}
        }
        shape.set(index, Point::new(point.x, point.y))?;
        self.commit(target, shape)
    }

    fn commit(&mut self, target: ShapeTarget, shape: Shape) -> Result<()> {
        match target {
            ShapeTarget::Buffer => self.buffer = shape,
            ShapeTarget::Keyframe(time) => {
                self.store.record(time, shape.clone())?;
                if self.selected == Some(time) {
                    self.buffer = shape;
                }
            }
        }
        Ok(())
    }

    /// First authored point of the edited shape within the hit radius.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        let radius = self.cfg.hit_radius;
        self.edited_shape()
            .iter()
            .position(|p| !p.is_ghost && p.distance_to(x, y) < radius)
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<PointerAction> {
        if let Some(index) = self.hit_test(x, y) {
            self.pointer = PointerState {
                active: Some(index),
                dragging: true,
            };
            return Ok(PointerAction::Grabbed(index));
        }
        let index = self.add_point(self.target(), Point::new(x, y))?;
        Ok(PointerAction::Added(index))
    }

    /// Drag the active point. Returns false when nothing is being dragged.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool> {
        let Some(index) = self.pointer.active.filter(|_| self.pointer.dragging) else {
            return Ok(false);
        };
        self.move_point(self.target(), index, Point::new(x, y))?;
        Ok(true)
    }

    pub fn pointer_up(&mut self) {
        self.pointer = PointerState::default();
    }

    // ----- timeline & playback -----

    /// Record the edited shape at the clock's current time; returns that time.
    pub fn record(&mut self) -> Result<f64> {
        let time = self.clock.current_time();
        let shape = self.edited_shape().clone();
        self.store.record(time, shape)?;
        Ok(time)
    }

    /// Pause, select the keyframe at `time` and move the playhead onto it.
    pub fn select_keyframe(&mut self, time: f64) -> Result<()> {
        let shape = self.shape_of(ShapeTarget::Keyframe(time))?.clone();
        self.clock.pause();
        let timeline = self.store.snapshot();
        self.clock.seek(time, &timeline)?;
        self.selected = Some(time);
        self.buffer = shape;
        self.pointer = PointerState::default();
        Ok(())
    }

    /// Move the playhead; the buffer takes the interpolated shape.
    pub fn seek(&mut self, time: f64) -> Result<()> {
        let timeline = self.store.snapshot();
        self.buffer = self.clock.seek(time, &timeline)?.shape.clone();
        self.selected = None;
        Ok(())
    }

    /// Play or pause; always drops the selection. Returns whether it is now playing.
    pub fn toggle_playback(&mut self) -> bool {
        self.selected = None;
        if self.clock.is_running() {
            self.clock.pause();
            false
        } else {
            self.clock.play();
            true
        }
    }

    /// Forward a host tick. Returns whether a frame was published.
    pub fn tick(&mut self, handle: TickHandle, timestamp_ms: f64) -> Result<bool> {
        let timeline = self.store.snapshot();
        let published = self
            .clock
            .tick(handle, timestamp_ms, &timeline)?
            .map(|frame| frame.shape.clone());
        match published {
            Some(shape) => {
                self.buffer = shape;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Stop at time 0 showing the time-0 shape. Keyframes are kept.
    pub fn reset(&mut self) {
        let timeline = self.store.snapshot();
        self.clock.reset(&timeline);
        self.buffer = timeline.shape_at_zero();
        self.selected = None;
        self.pointer = PointerState::default();
    }

    /// Drop every keyframe, then reset.
    pub fn clear_timeline(&mut self) {
        self.store.reset();
        self.reset();
    }

    // ----- views -----

    pub fn onion_skin(&self) -> OnionSkin {
        onion_skin(
            &self.store.snapshot(),
            self.clock.current_time(),
            self.selected,
        )
    }

    /// Draw list for the current view.
    pub fn render(&self) -> Vec<DrawCommand> {
        scene(
            self.edited_shape(),
            &self.onion_skin(),
            &self.cfg.style,
            self.pointer.active,
        )
    }

    pub fn export_svg(&self) -> SvgExport {
        svg::export(&self.store.snapshot(), &self.cfg)
    }

    /// Keyframe times with one decimal, ascending.
    pub fn keyframe_labels(&self) -> Vec<String> {
        self.store
            .sorted_times()
            .into_iter()
            .map(|t| format!("{t:.1}"))
            .collect()
    }

    pub fn time_label(&self) -> String {
        format!(
            "Time: {:.1}s / {}s",
            self.clock.current_time(),
            self.cfg.total_duration
        )
    }
}
