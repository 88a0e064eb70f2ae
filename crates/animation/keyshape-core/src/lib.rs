//! Keyshape Core (renderer-agnostic)
//!
//! Sparse-keyframe shape animation: shapes recorded at a few points in time
//! are normalized to a common point count and linearly interpolated in
//! between. This crate holds the keyframe store, the interpolator, a looping
//! playback clock driven by an abstract tick source, an editing session with
//! pointer handling and onion skins, and an SVG exporter that reproduces the
//! same animation declaratively.

pub mod clock;
pub mod config;
pub mod data;
pub mod editor;
pub mod error;
pub mod interp;
pub mod normalize;
pub mod onion;
pub mod outputs;
pub mod render;
pub mod sampling;
pub mod store;
pub mod stored_timeline;
pub mod svg;

// Re-exports for consumers (adapters)
pub use clock::{
    ManualTicks, PlaybackClock, PlaybackState, SubscriptionId, TickHandle, TickSource,
};
pub use config::{Config, Style};
pub use data::{KeyTime, Keyframe, Point, Shape};
pub use editor::{EditorSession, PointerAction, ShapeTarget};
pub use error::{EngineError, Result};
pub use normalize::{normalize, normalize_pair};
pub use onion::{onion_skin, OnionSkin};
pub use outputs::{ClockEvent, Frame};
pub use render::DrawCommand;
pub use sampling::interpolate;
pub use store::{KeyframeStore, Timeline};
pub use stored_timeline::parse_timeline_json;
pub use svg::{export, serialize, SvgExport, SvgStyle};
