use serde::Deserialize;

use crate::data::{Keyframe, Shape};
use crate::error::{EngineError, Result};
use crate::store::KeyframeStore;

/// Parse a timeline document into a populated [`KeyframeStore`].
///
/// Shape of the JSON:
/// ```json
/// { "duration": 5, "keyframes": [{ "time": 0, "shape": [{ "x": 0, "y": 0 }] }] }
/// ```
///
/// Notes:
/// - `duration` is in seconds; it defaults to 5 when omitted.
/// - Keyframes may come in any order; a later entry at the same time wins.
/// - A document without a time-0 keyframe still gets the empty one every store starts with.
/// - Points accept an optional `isGhost` flag.
pub fn parse_timeline_json(s: &str) -> Result<KeyframeStore> {
    let doc: TimelineDoc = serde_json::from_str(s).map_err(|e| EngineError::InvalidConfig {
        reason: format!("parse error: {e}"),
    })?;

    let keyframes = doc.keyframes.into_iter().map(|k| Keyframe {
        time: k.time,
        shape: k.shape,
    });
    KeyframeStore::from_keyframes(doc.duration, keyframes)
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct TimelineDoc {
    #[serde(default = "default_duration")]
    duration: f64,
    #[serde(default)]
    keyframes: Vec<DocKeyframe>,
}

#[derive(Debug, Deserialize)]
struct DocKeyframe {
    time: f64,
    #[serde(default)]
    shape: Shape,
}

fn default_duration() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unordered_keyframes() {
        let json = r#"{
            "duration": 4,
            "keyframes": [
                { "time": 2, "shape": [{ "x": 5, "y": 5 }] },
                { "time": 0, "shape": [{ "x": 0, "y": 0, "isGhost": true }] }
            ]
        }"#;
        let store = parse_timeline_json(json).unwrap();
        assert_eq!(store.total_duration(), 4.0);
        assert_eq!(store.sorted_times(), vec![0.0, 2.0]);
        assert!(store.get(0.0).unwrap().points()[0].is_ghost);
    }

    #[test]
    fn rejects_bad_documents() {
        let err = parse_timeline_json("{ not json").unwrap_err();
        assert_eq!(err.category(), "config");

        let out_of_range = r#"{ "duration": 1, "keyframes": [{ "time": 3, "shape": [] }] }"#;
        assert!(matches!(
            parse_timeline_json(out_of_range),
            Err(EngineError::TimeOutOfRange { .. })
        ));
    }
}
