use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use keyshape_core::{
    Config, EditorSession, ManualTicks, Point, ShapeTarget, SubscriptionId, TickHandle,
};

/// Browser-facing editor. The host owns the frame loop: after `toggle_playback`
/// it reads `pending_tick()`, schedules a `requestAnimationFrame`, and calls
/// `tick(handle, timestamp)` from the callback, repeating while a tick is pending.
#[wasm_bindgen]
pub struct KeyshapeEditor {
    session: EditorSession<ManualTicks>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<JsValue, JsError> {
    swb::to_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

/// Snapshot of the playback header for UI binding.
#[derive(Serialize)]
struct ViewState<'a> {
    time: f64,
    playing: bool,
    selected: Option<f64>,
    label: &'a str,
}

#[wasm_bindgen]
impl KeyshapeEditor {
    /// Create an editor. Pass a partial config object or undefined/null for defaults.
    /// Example:
    ///   new KeyshapeEditor({ total_duration: 8, style: { stroke_color: "teal" } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<KeyshapeEditor, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(KeyshapeEditor {
            session: EditorSession::new(cfg, ManualTicks::new())?,
        })
    }

    // ----- pointer & editing -----

    /// Returns `{ Grabbed: index }` or `{ Added: index }`.
    #[wasm_bindgen(js_name = pointer_down)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        let action = self.session.pointer_down(x, y)?;
        to_js(&action, "pointer_down")
    }

    #[wasm_bindgen(js_name = pointer_move)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, JsError> {
        Ok(self.session.pointer_move(x, y)?)
    }

    #[wasm_bindgen(js_name = pointer_up)]
    pub fn pointer_up(&mut self) {
        self.session.pointer_up();
    }

    /// Append a point to the edited shape. Returns its index.
    #[wasm_bindgen(js_name = add_point)]
    pub fn add_point(&mut self, x: f64, y: f64) -> Result<u32, JsError> {
        let target = self.session.target();
        let index = self.session.add_point(target, Point::new(x, y))?;
        Ok(index as u32)
    }

    #[wasm_bindgen(js_name = move_point)]
    pub fn move_point(&mut self, index: u32, x: f64, y: f64) -> Result<(), JsError> {
        let target = self.session.target();
        self.session
            .move_point(target, index as usize, Point::new(x, y))?;
        Ok(())
    }

    /// Edit a recorded keyframe directly, without selecting it.
    #[wasm_bindgen(js_name = add_point_at)]
    pub fn add_point_at(&mut self, time: f64, x: f64, y: f64) -> Result<u32, JsError> {
        let index = self
            .session
            .add_point(ShapeTarget::Keyframe(time), Point::new(x, y))?;
        Ok(index as u32)
    }

    // ----- timeline & playback -----

    /// Record the edited shape at the current time. Returns that time.
    #[wasm_bindgen]
    pub fn record(&mut self) -> Result<f64, JsError> {
        Ok(self.session.record()?)
    }

    #[wasm_bindgen(js_name = select_keyframe)]
    pub fn select_keyframe(&mut self, time: f64) -> Result<(), JsError> {
        Ok(self.session.select_keyframe(time)?)
    }

    #[wasm_bindgen]
    pub fn seek(&mut self, time: f64) -> Result<(), JsError> {
        Ok(self.session.seek(time)?)
    }

    /// Returns whether playback is now running.
    #[wasm_bindgen(js_name = toggle_playback)]
    pub fn toggle_playback(&mut self) -> bool {
        self.session.toggle_playback()
    }

    /// Handle to pass back to `tick`, or undefined when no tick is wanted.
    #[wasm_bindgen(js_name = pending_tick)]
    pub fn pending_tick(&self) -> Option<u32> {
        self.session.pending_tick().map(|h| h.0)
    }

    /// Deliver a frame callback. Returns whether a frame was published.
    #[wasm_bindgen]
    pub fn tick(&mut self, handle: u32, timestamp: f64) -> Result<bool, JsError> {
        Ok(self.session.tick(TickHandle(handle), timestamp)?)
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Drop every keyframe.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.session.clear_timeline();
    }

    /// Call `callback(frame)` with every published `{ time, shape }`. Returns an id for `unsubscribe`.
    ///
    /// The callback runs inside `tick`/`seek`/`reset` while the editor is
    /// borrowed, so it must not call back into the editor: wasm-bindgen would
    /// throw on the recursive borrow. Read `frame()` or `render()` after `tick`
    /// returns instead. A throwing callback is logged and does not fail the tick.
    #[wasm_bindgen]
    pub fn subscribe(&mut self, callback: Function) -> u32 {
        let id = self.session.clock_mut().subscribe(move |frame| {
            let value = match swb::to_value(frame) {
                Ok(value) => value,
                Err(e) => {
                    log::error!("subscribe: frame at {}s not serializable: {e}", frame.time);
                    return;
                }
            };
            if let Err(err) = callback.call1(&JsValue::UNDEFINED, &value) {
                log::error!("subscribe: observer threw at {}s: {:?}", frame.time, err);
            }
        });
        id.0
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&mut self, id: u32) -> bool {
        self.session.clock_mut().unsubscribe(SubscriptionId(id))
    }

    /// Queued clock events since the last call.
    #[wasm_bindgen(js_name = drain_events)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.session.clock_mut().drain_events();
        to_js(&events, "events")
    }

    // ----- views -----

    /// Last published `{ time, shape }`.
    #[wasm_bindgen]
    pub fn frame(&self) -> Result<JsValue, JsError> {
        to_js(self.session.clock().frame(), "frame")
    }

    /// The shape currently shown and edited.
    #[wasm_bindgen]
    pub fn shape(&self) -> Result<JsValue, JsError> {
        to_js(self.session.edited_shape(), "shape")
    }

    /// All keyframes as `[{ time, shape }]`, ascending.
    #[wasm_bindgen]
    pub fn keyframes(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.timeline().keyframes(), "keyframes")
    }

    #[wasm_bindgen(js_name = keyframe_labels)]
    pub fn keyframe_labels(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.keyframe_labels(), "labels")
    }

    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        let label = self.session.time_label();
        let state = ViewState {
            time: self.session.current_time(),
            playing: self.session.is_playing(),
            selected: self.session.selected_keyframe(),
            label: &label,
        };
        to_js(&state, "state")
    }

    /// Draw list: onion skins first, then the edited shape.
    #[wasm_bindgen]
    pub fn render(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.render(), "render")
    }

    #[wasm_bindgen(js_name = export_svg)]
    pub fn export_svg(&self) -> String {
        self.session.export_svg().body
    }

    #[wasm_bindgen(js_name = export_filename)]
    pub fn export_filename(&self) -> String {
        keyshape_core::svg::DEFAULT_EXPORT_FILENAME.to_string()
    }

    #[wasm_bindgen(js_name = export_mime_type)]
    pub fn export_mime_type(&self) -> String {
        keyshape_core::svg::SVG_MIME_TYPE.to_string()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
