//! WASM bindings.
//!
//! Exposes [`Calculator`] to JavaScript as `WasmCalculator`. State lives in
//! `localStorage`, reports are offered as browser downloads and the page
//! renders from the JSON snapshots returned here.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, HtmlElement, Url};

use crate::Calculator;
use crate::clock;
use crate::config::AppConfig;
use crate::drawing::{ClientPoint, ImageCodec, LineWidth, PngDataUrlCodec, PointerEvent, StrokeColor, Tool};
use crate::form::PieceForm;
use crate::listing::{SortField, filter_options};
use crate::report::{PdfRenderer, ReportError, ReportSink, ReportVariant};
use crate::state::{LocalStorage, SubscriptionId};
use crate::units::{format_area, format_dimensions_cm};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load_or_default(&LocalStorage);
    if let Err(e) = console_log::init_with_level(config.preferences.log_level.to_level()) {
        web_sys::console::log_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("Metragem WASM starting...");
}

/// Triggers a file download through a temporary object URL.
struct BrowserDownload;

impl ReportSink for BrowserDownload {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError> {
        download(filename, bytes).map_err(|e| ReportError::Download(format!("{:?}", e)))
    }
}

fn download(filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let array = js_sys::Array::new();
    array.push(&js_sys::Uint8Array::from(bytes));
    let blob = Blob::new_with_u8_array_sequence(&array)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let a = document.create_element("a")?.dyn_into::<HtmlElement>()?;
    a.set_attribute("href", &url)?;
    a.set_attribute("download", filename)?;
    a.click();
    Url::revoke_object_url(&url)?;
    log::info!("⬇️ Download started: {}", filename);
    Ok(())
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The calculator as seen from JavaScript.
#[wasm_bindgen]
pub struct WasmCalculator {
    inner: Calculator<LocalStorage>,
    config: AppConfig,
    on_change: Option<SubscriptionId>,
}

#[wasm_bindgen]
impl WasmCalculator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmCalculator, JsValue> {
        let config = AppConfig::load_or_default(&LocalStorage);
        let inner = Calculator::new(LocalStorage, &config).map_err(to_js)?;
        Ok(Self {
            inner,
            config,
            on_change: None,
        })
    }

    /// Full application state as persisted.
    pub fn state_json(&self) -> Result<String, JsValue> {
        self.inner.state().to_json().map_err(to_js)
    }

    /// Call `callback(stateJson)` after every state change, replacing any
    /// previous callback. `null` stops notifications.
    pub fn set_on_change(&mut self, callback: Option<js_sys::Function>) {
        if let Some(id) = self.on_change.take() {
            self.inner.unsubscribe(id);
        }
        self.on_change = callback.map(|callback| {
            self.inner.subscribe(move |state| {
                let json = match state.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        log::warn!("Failed to serialize state for callback: {}", e);
                        return;
                    }
                };
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("State change callback failed: {:?}", e);
                }
            })
        });
    }

    // Spaces

    pub fn add_group(&mut self, name: &str) -> bool {
        self.inner.add_group(name)
    }

    pub fn select_group(&mut self, name: &str) {
        self.inner.select_group(name);
    }

    // Form

    pub fn set_quantity(&mut self, text: &str) -> u32 {
        self.inner.form_mut().set_quantity(text);
        self.inner.form().quantity()
    }

    pub fn set_width(&mut self, text: &str) {
        self.inner.form_mut().set_width(text);
    }

    pub fn set_height(&mut self, text: &str) {
        self.inner.form_mut().set_height(text);
    }

    pub fn set_unit_price(&mut self, text: &str) {
        self.inner.form_mut().set_unit_price(text);
    }

    pub fn set_details(&mut self, text: &str) {
        self.inner.form_mut().set_details(text);
    }

    /// Current field values, title and error message.
    pub fn form_json(&self) -> String {
        let form = self.inner.form();
        let state = self.inner.state();
        serde_json::json!({
            "title": PieceForm::title(state),
            "submitLabel": PieceForm::submit_label(state),
            "quantity": form.quantity(),
            "width": form.width(),
            "height": form.height(),
            "unitPrice": form.unit_price(),
            "details": form.details(),
            "error": form.error().map(ToString::to_string),
        })
        .to_string()
    }

    /// Create or update; the error is the message to show.
    pub fn submit(&mut self) -> Result<(), JsValue> {
        self.inner.submit(clock::now_millis()).map_err(to_js)
    }

    pub fn start_edit(&mut self, index: usize) -> bool {
        self.inner.start_edit(index)
    }

    pub fn cancel_edit(&mut self) {
        self.inner.cancel_edit();
    }

    // Canvas

    pub fn set_canvas_origin(&mut self, x: f32, y: f32) {
        self.inner.set_canvas_origin(x, y);
    }

    pub fn resize_canvas(&mut self, width: u32) -> Result<(), JsValue> {
        self.inner.resize_canvas(width).map_err(to_js)
    }

    pub fn pointer_down(&mut self, client_x: f32, client_y: f32) -> Result<(), JsValue> {
        let point = ClientPoint::new(client_x, client_y);
        self.inner
            .handle_pointer(PointerEvent::Down(point))
            .map_err(to_js)
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) -> Result<(), JsValue> {
        let point = ClientPoint::new(client_x, client_y);
        self.inner
            .handle_pointer(PointerEvent::Move(point))
            .map_err(to_js)
    }

    pub fn pointer_up(&mut self) -> Result<(), JsValue> {
        self.inner.handle_pointer(PointerEvent::Up).map_err(to_js)
    }

    pub fn pointer_leave(&mut self) -> Result<(), JsValue> {
        self.inner.handle_pointer(PointerEvent::Leave).map_err(to_js)
    }

    pub fn undo(&mut self) -> Result<(), JsValue> {
        self.inner.undo_drawing().map_err(to_js)
    }

    pub fn redo(&mut self) -> Result<(), JsValue> {
        self.inner.redo_drawing().map_err(to_js)
    }

    pub fn clear_drawing(&mut self) {
        self.inner.clear_drawing();
    }

    pub fn set_eraser(&mut self, eraser: bool) {
        self.inner.canvas_mut().tools_mut().tool = if eraser { Tool::Eraser } else { Tool::Pencil };
    }

    /// Returns false if `hex` isn't `#rrggbb`.
    pub fn set_color(&mut self, hex: &str) -> bool {
        match StrokeColor::from_hex(hex) {
            Some(color) => {
                self.inner.canvas_mut().tools_mut().color = color;
                true
            }
            None => false,
        }
    }

    /// Width preset by pixel value (1, 2 or 4).
    pub fn set_line_width(&mut self, pixels: f32) {
        let preset = LineWidth::all()
            .iter()
            .copied()
            .find(|p| p.pixels() == pixels)
            .unwrap_or(LineWidth::Medium);
        self.inner.canvas_mut().tools_mut().set_preset(preset);
    }

    /// Active tool, color and width, plus the width presets.
    pub fn toolbar_json(&self) -> String {
        let tools = self.inner.canvas().tools();
        let presets: Vec<_> = LineWidth::all()
            .iter()
            .map(|preset| {
                serde_json::json!({
                    "name": preset.name(),
                    "pixels": preset.pixels(),
                    "active": preset.pixels() == tools.line_width,
                })
            })
            .collect();
        serde_json::json!({
            "tool": tools.tool.name(),
            "eraser": tools.tool == Tool::Eraser,
            "color": tools.color.to_hex(),
            "lineWidth": tools.line_width,
            "presets": presets,
            "canUndo": self.inner.canvas().history().can_undo(),
            "canRedo": self.inner.canvas().history().can_redo(),
        })
        .to_string()
    }

    /// Keep the current pencil color and width for the next visit.
    pub fn save_tool_defaults(&mut self) -> Result<(), JsValue> {
        self.config
            .canvas
            .remember_tools(self.inner.canvas().tools());
        self.config.save(&mut LocalStorage).map_err(to_js)
    }

    /// The canvas as it looks now, as a PNG data URL.
    pub fn canvas_image(&self) -> Result<String, JsValue> {
        PngDataUrlCodec
            .encode(self.inner.canvas().pixmap())
            .map_err(to_js)
    }

    // Listing

    /// `field` is a piece field name such as `"unitPrice"`.
    pub fn sort_by(&mut self, field: &str) -> bool {
        match SortField::from_key(field) {
            Some(field) => {
                self.inner.query_mut().sort_by(field);
                true
            }
            None => false,
        }
    }

    pub fn set_filter_group(&mut self, group: &str) {
        self.inner.query_mut().set_filter_group(group);
    }

    /// Column headers and group filter choices.
    pub fn listing_json(&self) -> String {
        let query = self.inner.query();
        let headers: Vec<_> = query
            .headers()
            .into_iter()
            .map(|h| {
                serde_json::json!({
                    "field": h.field.key(),
                    "label": h.label,
                    "arrow": h.arrow,
                })
            })
            .collect();
        let filters: Vec<_> = filter_options(self.inner.groups())
            .into_iter()
            .map(|(value, label)| serde_json::json!({ "value": value, "label": label }))
            .collect();
        serde_json::json!({
            "headers": headers,
            "filters": filters,
            "filterGroup": query.filter_group(),
        })
        .to_string()
    }

    /// Visible rows, each with the store index to pass to edit/delete.
    pub fn rows_json(&self) -> String {
        let currency = self.inner.currency();
        let rows: Vec<_> = self
            .inner
            .rows()
            .into_iter()
            .map(|row| {
                serde_json::json!({
                    "index": row.index,
                    "id": row.piece.id(),
                    "group": row.piece.group(),
                    "quantity": row.piece.quantity(),
                    "dimensions": format_dimensions_cm(row.piece.width(), row.piece.height()),
                    "area": format_area(row.piece.area()),
                    "value": currency.format(row.piece.total_value()),
                })
            })
            .collect();
        serde_json::Value::Array(rows).to_string()
    }

    /// Asks with `window.confirm` before deleting.
    pub fn delete_piece(&mut self, index: usize) -> bool {
        self.inner.delete_piece(index, |message| {
            web_sys::window()
                .and_then(|w| w.confirm_with_message(message).ok())
                .unwrap_or(false)
        })
    }

    // Summary and export

    pub fn total_area(&self) -> String {
        self.inner.totals_text().0
    }

    pub fn total_value(&self) -> String {
        self.inner.totals_text().1
    }

    pub fn can_export(&self) -> bool {
        self.inner.can_export()
    }

    pub fn export_client_pdf(&self) -> Result<(), JsValue> {
        self.export(ReportVariant::Client)
    }

    pub fn export_technical_pdf(&self) -> Result<(), JsValue> {
        self.export(ReportVariant::Technical)
    }
}

impl WasmCalculator {
    fn export(&self, variant: ReportVariant) -> Result<(), JsValue> {
        self.inner
            .export(variant, clock::today(), &PdfRenderer, &mut BrowserDownload)
            .map_err(to_js)
    }
}
