//! Core configuration for keyshape-core.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Configuration for timeline sizing, editing and drawing.
/// Every field has a default so partial JSON objects deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of the timeline in seconds. Fixed for the lifetime of a store.
    pub total_duration: f64,

    /// Drawing surface size, also used as the exported SVG viewport.
    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Pointer distance (surface units) within which a press grabs a point.
    pub hit_radius: f64,

    pub style: Style,
}

/// Colours and widths used by the render list and the SVG export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Stroke of the exported polyline.
    pub stroke_color: String,
    pub stroke_width: f64,
    /// Live editor colours.
    pub current_color: String,
    pub onion_color: String,
    pub active_color: String,
    pub handle_radius: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_duration: 5.0,
            canvas_width: 300,
            canvas_height: 300,
            hit_radius: 10.0,
            style: Style::default(),
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: "black".into(),
            stroke_width: 2.0,
            current_color: "blue".into(),
            onion_color: "rgba(128, 128, 128, 0.3)".into(),
            active_color: "red".into(),
            handle_radius: 4.0,
        }
    }
}

impl Config {
    /// Validate basic invariants (positive finite duration, non-empty surface, radii).
    pub fn validate(&self) -> Result<()> {
        if !self.total_duration.is_finite() || self.total_duration <= 0.0 {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "total_duration must be a positive number of seconds, got {}",
                    self.total_duration
                ),
            });
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(EngineError::InvalidConfig {
                reason: format!(
                    "canvas must have a non-zero size, got {}x{}",
                    self.canvas_width, self.canvas_height
                ),
            });
        }
        if !(self.hit_radius.is_finite() && self.hit_radius >= 0.0) {
            return Err(EngineError::InvalidConfig {
                reason: format!("hit_radius must be >= 0, got {}", self.hit_radius),
            });
        }
        let style = &self.style;
        if !(style.stroke_width.is_finite() && style.stroke_width >= 0.0)
            || !(style.handle_radius.is_finite() && style.handle_radius >= 0.0)
        {
            return Err(EngineError::InvalidConfig {
                reason: "stroke_width and handle_radius must be finite and >= 0".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.total_duration, 5.0);
        assert_eq!((cfg.canvas_width, cfg.canvas_height), (300, 300));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{ "total_duration": 8.0, "style": { "stroke_color": "red" } }"#)
                .unwrap();
        assert_eq!(cfg.total_duration, 8.0);
        assert_eq!(cfg.hit_radius, 10.0);
        assert_eq!(cfg.style.stroke_color, "red");
        assert_eq!(cfg.style.stroke_width, 2.0);
    }

    #[test]
    fn rejects_non_positive_duration() {
        let cfg = Config {
            total_duration: 0.0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(EngineError::InvalidConfig { .. })
        ));
    }
}
