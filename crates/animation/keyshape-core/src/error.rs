//! Error types for the keyframe engine

/// Errors raised by timeline, playback and editing operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    /// Time lies outside the timeline window
    #[error("Time {time} is out of range [0, {duration})")]
    TimeOutOfRange { time: f64, duration: f64 },

    /// Time or timestamp is not a finite number
    #[error("Invalid time value: {time}")]
    InvalidTime { time: f64 },

    /// No keyframe is recorded at the requested time
    #[error("No keyframe recorded at {time}s")]
    MissingKeyframe { time: f64 },

    /// Point index past the end of the shape
    #[error("Point index {index} out of bounds for shape with {len} points")]
    PointIndex { index: usize, len: usize },

    /// Point was synthesized by normalization and is not editable
    #[error("Point {index} is a normalization ghost and cannot be edited")]
    GhostPoint { index: usize },

    /// Point coordinates must be finite
    #[error("Point ({x}, {y}) has non-finite coordinates")]
    InvalidPoint { x: f64, y: f64 },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EngineError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::TimeOutOfRange { .. } | Self::InvalidTime { .. } => "time",
            Self::MissingKeyframe { .. } => "timeline",
            Self::PointIndex { .. } | Self::GhostPoint { .. } | Self::InvalidPoint { .. } => {
                "editing"
            }
            Self::InvalidConfig { .. } => "config",
        }
    }
}

/// Engine result type
pub type Result<T> = core::result::Result<T, EngineError>;
