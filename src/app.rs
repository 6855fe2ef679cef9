//! eframe application shell and the state it shares with the JavaScript handle

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;

use crate::error::MatrixError;
use crate::export::MarkdownOptions;
use crate::intent::{Intent, Notice};
use crate::session::{Dispatched, MatrixSession};
use crate::web;
use crate::widget::{MatrixAction, MatrixWidget};
use crate::MatrixCallbacks;

/// State shared between `MatrixApp` and `MatrixHandle`.
///
/// Borrows are released before any JavaScript callback runs, so a callback may
/// call straight back into the handle.
pub struct MatrixShared {
    session: RefCell<MatrixSession>,
    callbacks: RefCell<MatrixCallbacks>,
    /// egui context of the running app, used to request repaints
    ctx: RefCell<Option<egui::Context>>,
    /// Notices raised before `onNotify` was registered (the welcome)
    pending_notices: RefCell<Vec<Notice>>,
}

impl MatrixShared {
    pub fn new(session: MatrixSession) -> Self {
        Self {
            session: RefCell::new(session),
            callbacks: RefCell::new(MatrixCallbacks::default()),
            ctx: RefCell::new(None),
            pending_notices: RefCell::new(vec![MatrixSession::welcome_notice()]),
        }
    }

    pub fn session(&self) -> std::cell::Ref<'_, MatrixSession> {
        self.session.borrow()
    }

    pub fn callbacks_mut(&self) -> std::cell::RefMut<'_, MatrixCallbacks> {
        self.callbacks.borrow_mut()
    }

    /// Register `onNotify` and deliver anything raised before it existed
    pub fn set_on_notify(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_notify = Some(callback);
        let pending = std::mem::take(&mut *self.pending_notices.borrow_mut());
        for notice in &pending {
            self.notify(notice);
        }
    }

    fn attach_context(&self, ctx: egui::Context) {
        *self.ctx.borrow_mut() = Some(ctx);
    }

    /// Dispatch an intent, then fire the state-change and notice callbacks
    pub fn dispatch(&self, intent: Intent) -> Dispatched {
        let dispatched = self.session.borrow_mut().dispatch(intent);
        if dispatched.outcome.is_applied() {
            self.emit_state_change();
            if let Some(ctx) = self.ctx.borrow().as_ref() {
                ctx.request_repaint();
            }
        }
        if let Some(notice) = &dispatched.notice {
            self.notify(notice);
        }
        dispatched
    }

    /// Send the current render state to `onStateChange`
    pub fn emit_state_change(&self) {
        let Some(callback) = self.callbacks.borrow().on_state_change.clone() else {
            return;
        };
        let json = serde_json::to_string(self.session.borrow().render());
        match json {
            Ok(json) => call_with_json(&callback, &json),
            Err(e) => log::warn!("Failed to serialize render state: {}", e),
        }
    }

    /// Send a notice to `onNotify`
    pub fn notify(&self, notice: &Notice) {
        log::debug!("{:?}: {}", notice.level, notice.message);
        let Some(callback) = self.callbacks.borrow().on_notify.clone() else {
            return;
        };
        match serde_json::to_string(notice) {
            Ok(json) => call_with_json(&callback, &json),
            Err(e) => log::warn!("Failed to serialize notice: {}", e),
        }
    }

    /// Copy the Markdown export to the clipboard and report the result
    pub async fn copy_markdown(&self, options: MarkdownOptions) -> Result<(), MatrixError> {
        let markdown = self.session.borrow().export_markdown(options)?;
        match web::copy_text(&markdown).await {
            Ok(()) => {
                self.notify(&Notice::success("Copied to clipboard!"));
                Ok(())
            }
            Err(e) => {
                log::warn!("{}", e);
                self.notify(&Notice::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Markdown for the preview pane; the notice goes out only when `announce` is set
    pub fn preview_markdown(&self, announce: bool) -> Option<String> {
        let preview = self.session.borrow().preview_markdown(MarkdownOptions::default());
        match preview {
            Ok((markdown, notice)) => {
                if announce {
                    self.notify(&notice);
                }
                Some(markdown)
            }
            Err(e) => {
                log::warn!("Markdown preview failed: {}", e);
                self.notify(&Notice::error(e.to_string()));
                None
            }
        }
    }

    /// Download the CSV export and report the result
    pub fn download_csv(&self) -> Result<(), MatrixError> {
        let result = {
            let session = self.session.borrow();
            session
                .export_csv()
                .and_then(|csv| web::download_text(&session.csv_file_name(), web::CSV_MIME, &csv))
        };
        match &result {
            Ok(()) => self.notify(&Notice::success("Matrix exported to CSV")),
            Err(e) => {
                log::warn!("CSV export failed: {}", e);
                self.notify(&Notice::error(format!("Failed to export to CSV: {}", e)));
            }
        }
        result
    }
}

/// Call a JS callback with a parsed JSON object argument
fn call_with_json(callback: &js_sys::Function, json: &str) {
    let arg = js_sys::JSON::parse(json).unwrap_or_else(|_| JsValue::from_str(json));
    if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
        log::warn!("Callback threw: {:?}", e);
    }
}

/// The egui application hosting a `MatrixWidget`
pub struct MatrixApp {
    shared: Rc<MatrixShared>,
    widget: MatrixWidget,
    /// Session revision last handed to the widget
    seen_revision: Option<u64>,
}

impl MatrixApp {
    pub fn new(cc: &eframe::CreationContext<'_>, shared: Rc<MatrixShared>) -> Self {
        shared.attach_context(cc.egui_ctx.clone());
        let widget = {
            let session = shared.session();
            MatrixWidget::new(session.config().value_step, session.config().weight_step)
        };
        Self {
            shared,
            widget,
            seen_revision: None,
        }
    }

    /// Hand the widget a fresh render state if the session moved on. An open
    /// Markdown preview is regenerated alongside it.
    fn refresh_widget(&mut self) {
        let revision = {
            let session = self.shared.session();
            if self.seen_revision == Some(session.revision()) {
                return;
            }
            self.widget.set_render_state(session.render().clone());
            session.revision()
        };
        self.seen_revision = Some(revision);
        if self.widget.markdown_preview().is_some() {
            let markdown = self.shared.preview_markdown(false);
            self.widget.set_markdown_preview(markdown);
        }
    }

    fn apply(&mut self, action: MatrixAction) {
        match action {
            MatrixAction::Intent(intent) => {
                self.shared.dispatch(intent);
            }
            MatrixAction::CopyMarkdown => {
                let shared = self.shared.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    // Failures were already reported through onNotify
                    let _ = shared.copy_markdown(MarkdownOptions::default()).await;
                });
            }
            MatrixAction::PreviewMarkdown => {
                let markdown = self.shared.preview_markdown(true);
                self.widget.set_markdown_preview(markdown);
            }
            MatrixAction::ExportCsv => {
                let _ = self.shared.download_csv();
            }
        }
    }
}

impl eframe::App for MatrixApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_widget();

        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| self.widget.show(ui))
            .inner;

        let changed = !actions.is_empty();
        for action in actions {
            self.apply(action);
        }
        if changed {
            self.refresh_widget();
        }
    }
}
