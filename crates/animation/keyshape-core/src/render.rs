//! Backend-agnostic draw list for the live editor view.
//!
//! A shape draws as one polyline through all of its points plus a round
//! handle on every authored point. Ghost points take part in the line but get
//! no handle since they cannot be grabbed. Shapes with fewer than two points
//! draw nothing.

use serde::{Deserialize, Serialize};

use crate::config::Style;
use crate::data::Shape;
use crate::onion::OnionSkin;

/// One drawing instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Polyline {
        points: Vec<[f64; 2]>,
        color: String,
        width: f64,
    },
    Handle {
        x: f64,
        y: f64,
        radius: f64,
        color: String,
    },
}

/// Commands for a single shape in `color`; `active` highlights one handle.
pub fn shape_commands(
    shape: &Shape,
    color: &str,
    style: &Style,
    active: Option<usize>,
) -> Vec<DrawCommand> {
    if shape.len() < 2 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(shape.len() + 1);
    out.push(DrawCommand::Polyline {
        points: shape.iter().map(|p| [p.x, p.y]).collect(),
        color: color.to_string(),
        width: style.stroke_width,
    });
    for (index, point) in shape.iter().enumerate() {
        if point.is_ghost {
            continue;
        }
        let handle_color = if active == Some(index) {
            style.active_color.as_str()
        } else {
            color
        };
        out.push(DrawCommand::Handle {
            x: point.x,
            y: point.y,
            radius: style.handle_radius,
            color: handle_color.to_string(),
        });
    }
    out
}

/// Onion skins underneath, then the current shape.
pub fn scene(
    current: &Shape,
    onion: &OnionSkin,
    style: &Style,
    active: Option<usize>,
) -> Vec<DrawCommand> {
    let mut out: Vec<DrawCommand> = onion
        .iter()
        .flat_map(|kf| shape_commands(&kf.shape, &style.onion_color, style, None))
        .collect();
    out.extend(shape_commands(current, &style.current_color, style, active));
    out
}
