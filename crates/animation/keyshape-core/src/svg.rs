//! SVG export: the whole timeline as one self-animating document.
//!
//! Layout:
//! ```text
//! <svg width="W" height="H" xmlns="http://www.w3.org/2000/svg">
//!   <polyline points="{time-0 shape}" fill="none" stroke=".." stroke-width="..">
//!     <animate attributeName="points" from=".." to=".." dur="..s" begin="..s" fill="freeze"/>
//!     ... one per keyframe interval, ascending
//!   </polyline>
//! </svg>
//! ```
//! Each interval's shapes are normalized to their pairwise maximum point
//! count. The last keyframe runs to the end of the timeline and holds its own
//! shape. An interval that cannot be normalized (one side empty) holds its
//! left shape, the same way the live interpolator does.

use std::fmt::{self, Write as _};

use crate::config::{Config, Style};
use crate::data::Shape;
use crate::normalize::normalize_pair;
use crate::store::Timeline;

pub const SVG_MIME_TYPE: &str = "image/svg+xml";
pub const DEFAULT_EXPORT_FILENAME: &str = "animation.svg";
const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Stroke applied to the exported polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgStyle {
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self::from(&Style::default())
    }
}

impl From<&Style> for SvgStyle {
    fn from(style: &Style) -> Self {
        Self {
            stroke: style.stroke_color.clone(),
            stroke_width: style.stroke_width,
        }
    }
}

/// One `<animate>` directive.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    pub begin: f64,
    pub duration: f64,
    pub from: Shape,
    pub to: Shape,
}

/// A finished export, ready to hand to a download.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub body: String,
}

/// Per-interval animation data in ascending time order.
pub fn intervals(timeline: &Timeline) -> Vec<Interval> {
    let keys: Vec<(f64, &Shape)> = timeline.iter().collect();
    let end = timeline.total_duration();

    keys.iter()
        .enumerate()
        .map(|(i, &(begin, from))| {
            let (until, to) = keys.get(i + 1).copied().unwrap_or((end, from));
            let (from, to) =
                normalize_pair(from, to).unwrap_or_else(|| (from.clone(), from.clone()));
            Interval {
                begin,
                duration: until - begin,
                from,
                to,
            }
        })
        .collect()
}

/// Serialize with the default stroke.
pub fn serialize(timeline: &Timeline, width: u32, height: u32) -> String {
    serialize_with_style(timeline, width, height, &SvgStyle::default())
}

pub fn serialize_with_style(
    timeline: &Timeline,
    width: u32,
    height: u32,
    style: &SvgStyle,
) -> String {
    let intervals = intervals(timeline);
    let initial = intervals
        .first()
        .map(|iv| iv.from.clone())
        .unwrap_or_else(|| timeline.shape_at_zero());
    log::debug!(
        "svg: serializing {} intervals at {}x{}",
        intervals.len(),
        width,
        height
    );
    SvgDocument {
        width,
        height,
        style,
        initial: &initial,
        intervals: &intervals,
    }
    .to_string()
}

/// Serialize at the configured canvas size and wrap it for download.
pub fn export(timeline: &Timeline, cfg: &Config) -> SvgExport {
    SvgExport {
        filename: DEFAULT_EXPORT_FILENAME.to_string(),
        mime_type: SVG_MIME_TYPE,
        body: serialize_with_style(
            timeline,
            cfg.canvas_width,
            cfg.canvas_height,
            &SvgStyle::from(&cfg.style),
        ),
    }
}

/// Whitespace-separated `x,y` pairs in point order.
pub fn points_attr(shape: &Shape) -> String {
    let mut out = String::new();
    for (i, p) in shape.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // writing into a String cannot fail
        let _ = write!(out, "{},{}", p.x, p.y);
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

struct SvgDocument<'a> {
    width: u32,
    height: u32,
    style: &'a SvgStyle,
    initial: &'a Shape,
    intervals: &'a [Interval],
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            r#"<svg width="{}" height="{}" xmlns="{}">"#,
            self.width, self.height, SVG_NS
        )?;
        writeln!(
            f,
            r#"  <polyline points="{}" fill="none" stroke="{}" stroke-width="{}">"#,
            points_attr(self.initial),
            escape_attr(&self.style.stroke),
            self.style.stroke_width
        )?;
        for iv in self.intervals {
            writeln!(
                f,
                r#"    <animate attributeName="points" from="{}" to="{}" dur="{}s" begin="{}s" fill="freeze"/>"#,
                points_attr(&iv.from),
                points_attr(&iv.to),
                iv.duration,
                iv.begin
            )?;
        }
        writeln!(f, "  </polyline>")?;
        writeln!(f, "</svg>")
    }
}
