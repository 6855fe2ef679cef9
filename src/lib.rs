//! weightgrid - A browser-based weighted decision matrix using Rust, WASM, and egui
//!
//! Criteria (rows) are scored against options (columns). Every criterion
//! carries a weight, each cell's weighted value is `base * weight`, and cells
//! are colored on a red → white → green heatmap under a fixed or dynamic scale.
//! The matrix exports to Markdown and CSV.
//!
//! ## Architecture
//!
//! - `Grid`: the single source of truth for labels, weights and base values
//! - `render::sync`: pure projection of the grid into a `RenderState`
//! - `MatrixSession`: owns the grid and dispatches `Intent`s, re-syncing after each
//! - `MatrixWidget`: egui widget painting the latest `RenderState`
//! - `MatrixHandle`: WASM interface for JavaScript to control the matrix

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::HtmlCanvasElement;

#[cfg(target_arch = "wasm32")]
mod app;
pub mod colormap;
pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod intent;
pub mod render;
pub mod scale;
pub mod session;
#[cfg(target_arch = "wasm32")]
mod web;
pub mod widget;

pub use colormap::{color_for, HeatColor};
pub use config::MatrixConfig;
pub use error::MatrixError;
pub use export::{to_csv, to_markdown, MarkdownOptions};
pub use grid::{EditOutcome, Grid, Rejection};
pub use intent::{Intent, Notice, NoticeLevel};
pub use render::{sync, RenderState};
pub use scale::{resolve_range, ScaleMode, ScaleRange};
pub use session::{Dispatched, MatrixSession};
pub use widget::{MatrixAction, MatrixWidget};

#[cfg(target_arch = "wasm32")]
use app::{MatrixApp, MatrixShared};

/// Callbacks that can be registered from JavaScript
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct MatrixCallbacks {
    /// Called with the render state after every applied edit
    pub on_state_change: Option<js_sys::Function>,
    /// Called with `{ level, message }` for user-facing notices
    pub on_notify: Option<js_sys::Function>,
}

/// Callbacks that can be registered from JavaScript
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct MatrixCallbacks {}

/// A handle to a matrix instance. Each handle manages its own canvas and session.
///
/// This struct is exposed to JavaScript. It shares the session with `MatrixApp`
/// and keeps the eframe runner alive for the application lifecycle.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct MatrixHandle {
    /// Session, callbacks and repaint context (shared with MatrixApp)
    shared: Rc<MatrixShared>,
    /// The eframe runner (kept alive to maintain the render loop)
    runner: eframe::WebRunner,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl MatrixHandle {
    /// Create a matrix with the default configuration on the given canvas.
    /// Returns a promise that resolves to a MatrixHandle when initialization completes.
    #[wasm_bindgen]
    pub async fn create(canvas: HtmlCanvasElement) -> Result<MatrixHandle, JsValue> {
        Self::start(canvas, MatrixConfig::default()).await
    }

    /// Create a matrix from a camelCase JSON configuration object.
    /// Omitted fields keep their defaults; an invalid config rejects the promise.
    #[wasm_bindgen(js_name = createWithConfig)]
    pub async fn create_with_config(
        canvas: HtmlCanvasElement,
        config_json: String,
    ) -> Result<MatrixHandle, JsValue> {
        let config = MatrixConfig::from_json(&config_json).map_err(to_js_error)?;
        Self::start(canvas, config).await
    }

    /// End event loop and release resources
    #[wasm_bindgen(js_name = destroy)]
    pub fn destroy(&self) {
        self.runner.destroy();
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Dispatch an intent given as JSON, e.g. `{"type": "addRow"}`.
    /// Returns the outcome: "applied", "clamped", or "rejected".
    #[wasm_bindgen(js_name = dispatch)]
    pub fn dispatch_json(&self, intent_json: &str) -> Result<String, JsValue> {
        let intent = Intent::from_json(intent_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.dispatch_intent(intent))
    }

    /// Set a cell's base value (clamped to the value bounds)
    #[wasm_bindgen(js_name = editCell)]
    pub fn edit_cell(&self, row: usize, col: usize, value: f64) -> String {
        self.dispatch_intent(Intent::EditCell { row, col, value })
    }

    /// Change a cell's base value by `delta`
    #[wasm_bindgen(js_name = stepCell)]
    pub fn step_cell(&self, row: usize, col: usize, delta: f64) -> String {
        self.dispatch_intent(Intent::StepCell { row, col, delta })
    }

    /// Change a row's weight by `delta` (clamped to the weight bounds)
    #[wasm_bindgen(js_name = adjustWeight)]
    pub fn adjust_weight(&self, row: usize, delta: f64) -> String {
        self.dispatch_intent(Intent::EditWeight { row, delta })
    }

    #[wasm_bindgen(js_name = setTitle)]
    pub fn set_title(&self, title: String) -> String {
        self.dispatch_intent(Intent::SetTitle { title })
    }

    #[wasm_bindgen(js_name = renameRow)]
    pub fn rename_row(&self, row: usize, label: String) -> String {
        self.dispatch_intent(Intent::RenameRow { row, label })
    }

    #[wasm_bindgen(js_name = renameColumn)]
    pub fn rename_column(&self, col: usize, label: String) -> String {
        self.dispatch_intent(Intent::RenameColumn { col, label })
    }

    #[wasm_bindgen(js_name = addRow)]
    pub fn add_row(&self) -> String {
        self.dispatch_intent(Intent::AddRow)
    }

    #[wasm_bindgen(js_name = addColumn)]
    pub fn add_column(&self) -> String {
        self.dispatch_intent(Intent::AddColumn)
    }

    /// Remove the last row; a no-op at the minimum row count
    #[wasm_bindgen(js_name = removeRow)]
    pub fn remove_row(&self) -> String {
        self.dispatch_intent(Intent::RemoveRow)
    }

    /// Remove the last column; a no-op at the minimum column count
    #[wasm_bindgen(js_name = removeColumn)]
    pub fn remove_column(&self) -> String {
        self.dispatch_intent(Intent::RemoveColumn)
    }

    /// Rebuild the matrix from its configuration
    #[wasm_bindgen(js_name = reset)]
    pub fn reset(&self) -> String {
        self.dispatch_intent(Intent::Reset)
    }

    // =========================================================================
    // Scale and opacity
    // =========================================================================

    /// Get current scale mode as string: "fixed" or "dynamic"
    #[wasm_bindgen(js_name = getScaleMode)]
    pub fn get_scale_mode(&self) -> String {
        self.shared.session().mode().name().to_string()
    }

    /// Set scale mode: "fixed" or "dynamic"
    #[wasm_bindgen(js_name = setScaleMode)]
    pub fn set_scale_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = ScaleMode::from_name(mode)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown scale mode: {}", mode)))?;
        self.dispatch_intent(Intent::SetScaleMode { mode });
        Ok(())
    }

    /// Get heatmap opacity (0.0 to 1.0)
    #[wasm_bindgen(js_name = getOpacity)]
    pub fn get_opacity(&self) -> f64 {
        self.shared.session().opacity()
    }

    /// Set heatmap opacity (clamped to 0.0 to 1.0)
    #[wasm_bindgen(js_name = setOpacity)]
    pub fn set_opacity(&self, opacity: f64) -> String {
        self.dispatch_intent(Intent::SetOpacity { opacity })
    }

    /// Get the current render state as a JavaScript object
    #[wasm_bindgen(js_name = getRenderState)]
    pub fn get_render_state(&self) -> Result<JsValue, JsValue> {
        let json = serde_json::to_string(self.shared.session().render())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        js_sys::JSON::parse(&json)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Render the matrix as a Markdown table
    #[wasm_bindgen(js_name = toMarkdown)]
    pub fn to_markdown(&self, include_weights: bool, include_weighted: bool) -> Result<String, JsValue> {
        let options = MarkdownOptions {
            include_weights,
            include_weighted_values: include_weighted,
        };
        self.shared.session().export_markdown(options).map_err(to_js_error)
    }

    /// Render the matrix as CSV
    #[wasm_bindgen(js_name = toCsv)]
    pub fn to_csv(&self) -> Result<String, JsValue> {
        self.shared.session().export_csv().map_err(to_js_error)
    }

    /// Copy the Markdown export to the clipboard.
    /// Returns a promise that rejects with the error message on failure.
    #[wasm_bindgen(js_name = copyMarkdown)]
    pub fn copy_markdown(&self) -> js_sys::Promise {
        let shared = self.shared.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            shared
                .copy_markdown(MarkdownOptions::default())
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(to_js_error)
        })
    }

    /// Download the CSV export as `{title}_matrix.csv`
    #[wasm_bindgen(js_name = downloadCsv)]
    pub fn download_csv(&self) -> Result<(), JsValue> {
        self.shared.download_csv().map_err(to_js_error)
    }

    // =========================================================================
    // Callback registration
    // =========================================================================

    /// Register a callback to be called after every applied edit.
    /// The callback receives the render state:
    /// { title, columns, rows, mode, range, opacity, minLabel, maxLabel }
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&self, callback: js_sys::Function) {
        self.shared.callbacks_mut().on_state_change = Some(callback);
    }

    /// Register a callback for user-facing notices.
    /// The callback receives: { level, message }. The welcome notice is
    /// delivered on first registration.
    #[wasm_bindgen(js_name = onNotify)]
    pub fn on_notify(&self, callback: js_sys::Function) {
        self.shared.set_on_notify(callback);
    }

    /// Clear all registered callbacks.
    #[wasm_bindgen(js_name = clearCallbacks)]
    pub fn clear_callbacks(&self) {
        let mut callbacks = self.shared.callbacks_mut();
        callbacks.on_state_change = None;
        callbacks.on_notify = None;
    }
}

#[cfg(target_arch = "wasm32")]
impl MatrixHandle {
    async fn start(canvas: HtmlCanvasElement, config: MatrixConfig) -> Result<MatrixHandle, JsValue> {
        // Initialize logging for debug builds
        #[cfg(debug_assertions)]
        {
            eframe::WebLogger::init(log::LevelFilter::Debug).ok();
        }
        #[cfg(not(debug_assertions))]
        {
            eframe::WebLogger::init(log::LevelFilter::Warn).ok();
        }

        let session = MatrixSession::new(config).map_err(to_js_error)?;
        let shared = Rc::new(MatrixShared::new(session));
        let shared_for_app = shared.clone();

        let web_options = eframe::WebOptions::default();
        let runner = eframe::WebRunner::new();

        runner
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(MatrixApp::new(cc, shared_for_app)))),
            )
            .await?;

        log::debug!("Matrix created");
        Ok(MatrixHandle { shared, runner })
    }

    fn dispatch_intent(&self, intent: Intent) -> String {
        outcome_name(self.shared.dispatch(intent).outcome).to_string()
    }
}

#[cfg(target_arch = "wasm32")]
fn to_js_error(err: MatrixError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Name reported to JavaScript for an edit outcome
pub fn outcome_name(outcome: EditOutcome) -> &'static str {
    match outcome {
        EditOutcome::Applied => "applied",
        EditOutcome::Clamped => "clamped",
        EditOutcome::Rejected(_) => "rejected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_names() {
        assert_eq!(outcome_name(EditOutcome::Applied), "applied");
        assert_eq!(outcome_name(EditOutcome::Clamped), "clamped");
        assert_eq!(
            outcome_name(EditOutcome::Rejected(Rejection::MinimumSize)),
            "rejected"
        );
    }
}
