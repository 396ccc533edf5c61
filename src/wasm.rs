//! Browser bindings.
//!
//! JavaScript owns the DOM, the timer and image fetching. It forwards canvas
//! events to a [`WasmViewer`], performs the loads returned by `open_case`, and
//! calls `render` whenever `needs_redraw` reports true.

use std::collections::HashMap;

use image::RgbaImage;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};
use web_time::Instant;

use crate::compositor::{DrawCommand, Rgba};
use crate::config::{AppConfig, LogLevel};
use crate::error::ViewerError;
use crate::geometry::{Point, Size};
use crate::ingest::UploadFile;
use crate::session::{Navigation, ViewerMessage, ViewerSession, ViewerStatus};
use crate::viewport::LoadRequest;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load_from_local_storage().unwrap_or_default();
    if let Err(e) = console_log::init_with_level(config.preferences.log_level.to_level()) {
        web_sys::console::log_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("MedView WASM starting...");
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn css_color(color: Rgba) -> String {
    let [r, g, b, a] = color;
    format!("rgba({}, {}, {}, {:.3})", r, g, b, a as f32 / 255.0)
}

/// Viewer handle exported to JavaScript.
#[wasm_bindgen]
pub struct WasmViewer {
    config: AppConfig,
    session: ViewerSession,
    loads: HashMap<u32, LoadRequest>,
    next_load: u32,
}

#[wasm_bindgen]
impl WasmViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmViewer, JsValue> {
        let config = AppConfig::load_from_local_storage().unwrap_or_default();
        let session = ViewerSession::with_sample_cases(&config).map_err(js_error)?;
        Ok(Self {
            config,
            session,
            loads: HashMap::new(),
            next_load: 0,
        })
    }

    /// All cases as a JSON array, newest first.
    pub fn cases_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.store().list()).map_err(js_error)
    }

    /// The open case as JSON, if any.
    pub fn active_case_json(&self) -> Result<Option<String>, JsValue> {
        self.session
            .active_case()
            .map(serde_json::to_string)
            .transpose()
            .map_err(js_error)
    }

    /// Open a case. Returns `[{ id, url }]` loads; answer each with
    /// `image_loaded` or `image_failed`.
    pub fn open_case(&mut self, case_id: &str) -> Result<js_sys::Array, JsValue> {
        self.loads.clear();
        let requests = self.session.open_case(case_id).map_err(js_error)?;

        let out = js_sys::Array::new();
        for request in requests {
            let id = self.next_load;
            self.next_load = self.next_load.wrapping_add(1);

            let entry = js_sys::Object::new();
            js_sys::Reflect::set(&entry, &"id".into(), &JsValue::from(id))?;
            js_sys::Reflect::set(&entry, &"url".into(), &JsValue::from_str(&request.url))?;
            out.push(&entry);
            self.loads.insert(id, request);
        }
        Ok(out)
    }

    pub fn close_case(&mut self) {
        self.loads.clear();
        self.session.close_case();
    }

    /// Deliver decoded RGBA pixels for a load. Returns false if it went stale.
    pub fn image_loaded(&mut self, load_id: u32, width: u32, height: u32, rgba: Vec<u8>) -> bool {
        let Some(request) = self.loads.remove(&load_id) else {
            return false;
        };
        let result = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            ViewerError::image_load(
                &request.url,
                format!("pixel buffer does not match {}x{}", width, height),
            )
        });
        self.session.image_loaded(&request.ticket, result)
    }

    pub fn image_failed(&mut self, load_id: u32, message: &str) -> bool {
        let Some(request) = self.loads.remove(&load_id) else {
            return false;
        };
        let error = ViewerError::image_load(&request.url, message);
        self.session.image_loaded(&request.ticket, Err(error))
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.session.handle(ViewerMessage::PointerDown(Point::new(x, y)));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.session.handle(ViewerMessage::PointerMove(Point::new(x, y)));
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.session.handle(ViewerMessage::PointerUp(Point::new(x, y)));
    }

    pub fn pointer_leave(&mut self) {
        self.session.handle(ViewerMessage::PointerLeave);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.session.handle(ViewerMessage::Wheel(delta_y));
    }

    pub fn zoom_in(&mut self) {
        self.session.handle(ViewerMessage::ZoomIn);
    }

    pub fn zoom_out(&mut self) {
        self.session.handle(ViewerMessage::ZoomOut);
    }

    pub fn reset_view(&mut self) {
        self.session.handle(ViewerMessage::ResetView);
    }

    pub fn toggle_heatmap(&mut self) {
        self.session.handle(ViewerMessage::ToggleHeatmap);
    }

    pub fn toggle_boxes(&mut self) {
        self.session.handle(ViewerMessage::ToggleBoxes);
    }

    pub fn select_finding(&mut self, finding_id: &str) {
        self.session
            .handle(ViewerMessage::SelectFinding(finding_id.to_string()));
    }

    /// Id of the selected finding, if any.
    pub fn selected(&self) -> Option<String> {
        self.session.viewport_state().selected().map(str::to_string)
    }

    pub fn zoom(&self) -> f32 {
        self.session.viewport_state().zoom()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.session
            .handle(ViewerMessage::Resized(Size::new(width, height)));
    }

    /// Start ingesting an uploaded file. Rejections come back as the error message.
    pub fn upload(&mut self, name: String, mime: String, bytes: Vec<u8>) -> Result<(), JsValue> {
        let file = UploadFile::new(name, mime, bytes);
        self.session
            .submit_upload(file, Instant::now())
            .map(|_| ())
            .map_err(js_error)
    }

    /// Label of the running ingestion stage.
    pub fn stage(&self) -> Option<String> {
        self.session.ingestion_stage().map(str::to_string)
    }

    /// Drive the ingestion timer. Returns the id of a case to navigate to.
    pub fn tick(&mut self) -> Result<Option<String>, JsValue> {
        self.session.poll(Instant::now()).map_err(js_error)?;
        Ok(self
            .session
            .take_navigation()
            .into_iter()
            .last()
            .map(|Navigation::OpenViewer(id)| id))
    }

    /// One of `no-case`, `not-found`, `loading`, `ready`, `error`.
    pub fn status(&self) -> String {
        match self.session.status() {
            ViewerStatus::NoCase => "no-case",
            ViewerStatus::NotFound(_) => "not-found",
            ViewerStatus::Loading => "loading",
            ViewerStatus::Ready => "ready",
            ViewerStatus::ImageLoadError(_) => "error",
        }
        .to_string()
    }

    /// Message accompanying `error` and `not-found` statuses.
    pub fn status_message(&self) -> Option<String> {
        match self.session.status() {
            ViewerStatus::NotFound(id) => Some(format!("Case not found: {id}")),
            ViewerStatus::ImageLoadError(error) => Some(error.to_string()),
            _ => None,
        }
    }

    pub fn needs_redraw(&mut self) -> bool {
        self.session.take_redraw()
    }

    pub fn report(&self) -> Option<String> {
        self.session.report()
    }

    /// Change the log level for this page. Call `save_config` to keep it.
    pub fn set_log_level(&mut self, level: &str) -> Result<(), JsValue> {
        let level: LogLevel = level.parse().map_err(js_error)?;
        log::set_max_level(level.to_level_filter());
        self.config.preferences.log_level = level;
        Ok(())
    }

    /// Persist the current settings to localStorage.
    pub fn save_config(&self) -> Result<(), JsValue> {
        self.config.save_to_local_storage().map_err(js_error)
    }

    /// Draw the current frame. Returns false if nothing could be drawn.
    pub fn render(&self, canvas: &HtmlCanvasElement) -> Result<bool, JsValue> {
        let (Some(frame), Some(pixels)) = (self.session.frame(), self.session.render()) else {
            return Ok(false);
        };

        canvas.set_width(pixels.width());
        canvas.set_height(pixels.height());
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixels.as_raw().as_slice()),
            pixels.width(),
            pixels.height(),
        )?;
        ctx.put_image_data(&data, 0.0, 0.0)?;

        // The rasterizer leaves labels to the browser's font stack
        for command in frame.commands() {
            match command {
                DrawCommand::SetTransform {
                    translate_x,
                    translate_y,
                    scale,
                } => ctx.set_transform(
                    f64::from(*scale),
                    0.0,
                    0.0,
                    f64::from(*scale),
                    f64::from(*translate_x),
                    f64::from(*translate_y),
                )?,
                DrawCommand::ResetTransform => ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?,
                DrawCommand::FillText {
                    text,
                    x,
                    y,
                    color,
                    font_size,
                } => {
                    ctx.set_font(&format!("{}px sans-serif", font_size));
                    ctx.set_fill_style_str(&css_color(*color));
                    ctx.fill_text(text, f64::from(*x), f64::from(*y))?;
                }
                _ => {}
            }
        }
        Ok(true)
    }
}
