//! MatrixWidget - an egui widget that paints a decision matrix heatmap
//!
//! The widget is a thin presentation layer. It holds only the latest
//! `RenderState` handed to it and turns clicks, text edits and toggles into
//! `MatrixAction`s. It never edits the grid itself; the caller dispatches the
//! returned actions and passes the next render state back in.

use egui::{Color32, CornerRadius, Id, Response, Sense, Stroke, StrokeKind, Ui, Vec2};

use crate::colormap::{color_for, HeatColor};
use crate::config::{DEFAULT_VALUE_STEP, DEFAULT_WEIGHT_STEP};
use crate::intent::Intent;
use crate::render::{CellRenderState, RenderState};
use crate::scale::ScaleMode;

/// Size of one heatmap cell in points
const CELL_SIZE: Vec2 = Vec2::new(76.0, 42.0);
/// Width of the row label and weight columns
const LABEL_WIDTH: f32 = 120.0;
const WEIGHT_WIDTH: f32 = 56.0;
/// Legend strip dimensions
const LEGEND_WIDTH: f32 = 240.0;
const LEGEND_HEIGHT: f32 = 14.0;
/// Number of color stops painted in the legend
const LEGEND_STOPS: usize = 48;

/// Something the host must act on after `show`
#[derive(Clone, Debug, PartialEq)]
pub enum MatrixAction {
    /// Dispatch this intent to the session
    Intent(Intent),
    /// Copy the Markdown export to the clipboard
    CopyMarkdown,
    /// Render the Markdown export into the preview pane
    PreviewMarkdown,
    /// Download the CSV export
    ExportCsv,
}

/// Question asked before a reset wipes every edit
const RESET_WARNING: &str = "Are you sure you want to reset the matrix? All data will be lost.";

/// A self-contained widget for displaying and editing a decision matrix.
///
/// Multiple instances can coexist without sharing state as long as each has
/// its own id salt.
pub struct MatrixWidget {
    /// Root of every interactive id the widget hands out
    id: Id,
    /// Latest projection of the grid
    state: Option<RenderState>,
    /// Amount a cell changes per click
    value_step: f64,
    /// Amount a weight changes per click
    weight_step: f64,
    /// Reset was clicked and the confirmation dialog is open
    confirm_reset: bool,
    /// Markdown shown in the preview pane, once requested
    markdown_preview: Option<String>,

    // === Text edit buffers ===
    title_buffer: String,
    row_buffers: Vec<String>,
    column_buffers: Vec<String>,
}

impl Default for MatrixWidget {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_STEP, DEFAULT_WEIGHT_STEP)
    }
}

impl MatrixWidget {
    pub fn new(value_step: f64, weight_step: f64) -> Self {
        Self {
            id: Id::new("matrix_widget"),
            state: None,
            value_step,
            weight_step,
            confirm_reset: false,
            markdown_preview: None,
            title_buffer: String::new(),
            row_buffers: Vec::new(),
            column_buffers: Vec::new(),
        }
    }

    /// Distinguish this widget from others shown in the same context
    pub fn with_id_salt(mut self, salt: impl std::hash::Hash) -> Self {
        self.id = Id::new(salt);
        self
    }

    /// Replace the displayed state; label edit buffers follow it
    pub fn set_render_state(&mut self, state: RenderState) {
        self.title_buffer.clone_from(&state.title);
        self.row_buffers = state.rows.iter().map(|r| r.label.clone()).collect();
        self.column_buffers.clone_from(&state.columns);
        self.state = Some(state);
    }

    pub fn render_state(&self) -> Option<&RenderState> {
        self.state.as_ref()
    }

    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }

    /// Show `markdown` in the preview pane, or hide the pane with `None`
    pub fn set_markdown_preview(&mut self, markdown: Option<String>) {
        self.markdown_preview = markdown;
    }

    pub fn markdown_preview(&self) -> Option<&str> {
        self.markdown_preview.as_deref()
    }

    /// True while the reset confirmation dialog is waiting for an answer
    pub fn is_confirming_reset(&self) -> bool {
        self.confirm_reset
    }

    /// Show the widget and return the actions the user triggered this frame
    pub fn show(&mut self, ui: &mut Ui) -> Vec<MatrixAction> {
        let mut actions = Vec::new();

        let Some(state) = self.state.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label("No matrix loaded");
            });
            return actions;
        };
        let id = self.id;

        let title_response = ui.add(
            egui::TextEdit::singleline(&mut self.title_buffer)
                .font(egui::TextStyle::Heading)
                .desired_width(f32::INFINITY),
        );
        if title_response.changed() {
            actions.push(MatrixAction::Intent(Intent::SetTitle {
                title: self.title_buffer.clone(),
            }));
        }

        ui.add_space(6.0);
        if render_structure_controls(ui, id, &mut actions) {
            self.confirm_reset = true;
        }
        ui.add_space(6.0);

        let backdrop = {
            let fill = ui.visuals().panel_fill;
            [fill.r(), fill.g(), fill.b()]
        };
        let value_step = self.value_step;
        let weight_step = self.weight_step;

        egui::ScrollArea::both().id_salt(id.with("scroll")).show(ui, |ui| {
            egui::Grid::new(id.with("grid"))
                .spacing(Vec2::new(4.0, 4.0))
                .show(ui, |ui| {
                    // Header: corner, weight caption, option labels
                    ui.label(egui::RichText::new("Criteria").strong());
                    ui.label(egui::RichText::new("Weight").strong());
                    for (col, buffer) in self.column_buffers.iter_mut().enumerate() {
                        let response =
                            ui.add(egui::TextEdit::singleline(buffer).desired_width(CELL_SIZE.x));
                        if response.changed() {
                            actions.push(MatrixAction::Intent(Intent::RenameColumn {
                                col,
                                label: buffer.clone(),
                            }));
                        }
                    }
                    ui.end_row();

                    for (row, (row_state, buffer)) in
                        state.rows.iter().zip(self.row_buffers.iter_mut()).enumerate()
                    {
                        let response =
                            ui.add(egui::TextEdit::singleline(buffer).desired_width(LABEL_WIDTH));
                        if response.changed() {
                            actions.push(MatrixAction::Intent(Intent::RenameRow {
                                row,
                                label: buffer.clone(),
                            }));
                        }

                        let weight = weight_button(
                            ui,
                            weight_id(id, row),
                            &row_state.display_weight,
                            weight_step,
                        );
                        if let Some(delta) = weight {
                            actions.push(MatrixAction::Intent(Intent::EditWeight { row, delta }));
                        }

                        for (col, cell) in row_state.cells.iter().enumerate() {
                            let clicked =
                                heat_cell(ui, cell_id(id, row, col), cell, backdrop, value_step);
                            if let Some(delta) = clicked {
                                actions.push(MatrixAction::Intent(Intent::StepCell {
                                    row,
                                    col,
                                    delta,
                                }));
                            }
                        }
                        ui.end_row();
                    }
                });
        });

        ui.add_space(8.0);
        render_scale_controls(ui, id, state, &mut actions);
        ui.add_space(4.0);
        render_legend(ui, state);
        ui.add_space(8.0);
        render_export_controls(ui, id, &mut actions);
        if let Some(markdown) = &self.markdown_preview {
            render_markdown_preview(ui, id, markdown);
        }

        if self.confirm_reset {
            match reset_dialog(ui.ctx(), id) {
                Some(true) => {
                    self.confirm_reset = false;
                    actions.push(MatrixAction::Intent(Intent::Reset));
                }
                Some(false) => self.confirm_reset = false,
                None => {}
            }
        }

        actions
    }
}

// =============================================================================
// Stable ids
// =============================================================================

fn cell_id(base: Id, row: usize, col: usize) -> Id {
    base.with(("cell", row, col))
}

fn weight_id(base: Id, row: usize) -> Id {
    base.with(("weight", row))
}

fn control_id(base: Id, name: &str) -> Id {
    base.with(("control", name))
}

// =============================================================================
// Control groups
// =============================================================================

/// Add/remove/reset buttons. Returns true when Reset was clicked; the reset
/// itself waits for the confirmation dialog.
fn render_structure_controls(ui: &mut Ui, id: Id, actions: &mut Vec<MatrixAction>) -> bool {
    let frame_style = overlay_frame(ui);
    let text_color = get_overlay_text_color(ui);
    let mut reset_clicked = false;

    frame_style.show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;
            let buttons = [
                ("add_row", "+ Row", Intent::AddRow),
                ("remove_row", "− Row", Intent::RemoveRow),
                ("add_column", "+ Column", Intent::AddColumn),
                ("remove_column", "− Column", Intent::RemoveColumn),
            ];
            for (name, label, intent) in buttons {
                let text = egui::RichText::new(label).color(text_color);
                if id_button(ui, control_id(id, name), text, false).clicked() {
                    actions.push(MatrixAction::Intent(intent));
                }
            }

            ui.separator();

            let text = egui::RichText::new("⟲ Reset").color(text_color);
            reset_clicked = id_button(ui, control_id(id, "reset"), text, false)
                .on_hover_text("Restore the default matrix")
                .clicked();
        });
    });

    reset_clicked
}

/// Fixed/Dynamic selector and opacity slider
fn render_scale_controls(ui: &mut Ui, id: Id, state: &RenderState, actions: &mut Vec<MatrixAction>) {
    let frame_style = overlay_frame(ui);

    ui.horizontal(|ui| {
        frame_style.show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 2.0;
                ui.label("Scale:");
                let modes = [
                    (
                        "scale_fixed",
                        ScaleMode::Fixed,
                        "Fixed",
                        "Color against the configured value range",
                    ),
                    (
                        "scale_dynamic",
                        ScaleMode::Dynamic,
                        "Dynamic",
                        "Color by the live range of weighted values",
                    ),
                ];
                for (name, mode, label, hint) in modes {
                    let selected = state.mode == mode;
                    let clicked = id_button(ui, control_id(id, name), label, selected)
                        .on_hover_text(hint)
                        .clicked();
                    if clicked && !selected {
                        actions.push(MatrixAction::Intent(Intent::SetScaleMode { mode }));
                    }
                }
            });
        });

        ui.separator();

        let mut percent = state.opacity * 100.0;
        let slider = egui::Slider::new(&mut percent, 0.0..=100.0)
            .text("Opacity")
            .suffix("%")
            .fixed_decimals(0);
        if ui.add(slider).changed() {
            actions.push(MatrixAction::Intent(Intent::SetOpacity {
                opacity: percent / 100.0,
            }));
        }
    });
}

/// Gradient strip with the scale labels on either side
fn render_legend(ui: &mut Ui, state: &RenderState) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(&state.min_label).small());

        let (rect, _) = ui.allocate_exact_size(Vec2::new(LEGEND_WIDTH, LEGEND_HEIGHT), Sense::hover());
        let painter = ui.painter_at(rect);
        let stops = gradient_stops(LEGEND_STOPS, state.opacity);
        let stop_width = rect.width() / stops.len() as f32;
        for (i, color) in stops.iter().enumerate() {
            let min = egui::pos2(rect.min.x + stop_width * i as f32, rect.min.y);
            let stop = egui::Rect::from_min_size(min, Vec2::new(stop_width + 0.5, rect.height()));
            painter.rect_filled(stop, CornerRadius::ZERO, color.to_color32());
        }
        painter.rect_stroke(
            rect,
            CornerRadius::same(2),
            Stroke::new(1.0, Color32::GRAY),
            StrokeKind::Outside,
        );

        ui.label(egui::RichText::new(&state.max_label).small());
    });
}

fn render_export_controls(ui: &mut Ui, id: Id, actions: &mut Vec<MatrixAction>) {
    ui.horizontal(|ui| {
        if id_button(ui, control_id(id, "copy_markdown"), "Copy Markdown", false)
            .on_hover_text("Copy the matrix as a Markdown table")
            .clicked()
        {
            actions.push(MatrixAction::CopyMarkdown);
        }
        if id_button(ui, control_id(id, "preview_markdown"), "Preview Markdown", false).clicked() {
            actions.push(MatrixAction::PreviewMarkdown);
        }
        if id_button(ui, control_id(id, "export_csv"), "Export CSV", false).clicked() {
            actions.push(MatrixAction::ExportCsv);
        }
    });
}

/// Collapsible, read-only view of the last Markdown export
fn render_markdown_preview(ui: &mut Ui, id: Id, markdown: &str) {
    egui::CollapsingHeader::new("Markdown preview")
        .id_salt(id.with("markdown_preview"))
        .default_open(true)
        .show(ui, |ui| {
            let mut text = markdown;
            ui.add(
                egui::TextEdit::multiline(&mut text)
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
        });
}

/// Modal asking whether to reset. `Some(true)` once confirmed, `Some(false)`
/// once cancelled or dismissed, `None` while still open.
fn reset_dialog(ctx: &egui::Context, id: Id) -> Option<bool> {
    let modal = egui::Modal::new(id.with("reset_dialog")).show(ctx, |ui| {
        ui.set_max_width(320.0);
        ui.heading("Reset matrix");
        ui.label(RESET_WARNING);
        ui.add_space(8.0);

        let mut choice = None;
        ui.horizontal(|ui| {
            if id_button(ui, control_id(id, "reset_confirm"), "Reset", false).clicked() {
                choice = Some(true);
            }
            if id_button(ui, control_id(id, "reset_cancel"), "Cancel", false).clicked() {
                choice = Some(false);
            }
        });
        choice
    });

    if modal.should_close() {
        modal.inner.or(Some(false))
    } else {
        modal.inner
    }
}

// =============================================================================
// Clickable pieces
// =============================================================================

/// Button whose id is fixed by the caller rather than by layout order.
/// Paints a background only when selected or interacted with.
fn id_button(ui: &mut Ui, id: Id, text: impl Into<egui::WidgetText>, selected: bool) -> Response {
    let padding = ui.spacing().button_padding;
    let galley = text.into().into_galley(
        ui,
        Some(egui::TextWrapMode::Extend),
        f32::INFINITY,
        egui::TextStyle::Button,
    );
    let size = (galley.size() + 2.0 * padding).max(Vec2::new(0.0, ui.spacing().interact_size.y));
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let response = ui.interact(rect, id, Sense::click());

    if ui.is_rect_visible(rect) {
        let visuals = ui.style().interact_selectable(&response, selected);
        if selected || response.hovered() || response.is_pointer_button_down_on() {
            ui.painter().rect(
                rect,
                visuals.corner_radius,
                visuals.weak_bg_fill,
                visuals.bg_stroke,
                StrokeKind::Inside,
            );
        }
        let text_pos = ui
            .layout()
            .align_size_within_rect(galley.size(), rect.shrink2(padding))
            .min;
        ui.painter().galley(text_pos, galley, visuals.text_color());
    }

    response
}

/// Paint one heatmap cell; returns the step delta if it was clicked
fn heat_cell(
    ui: &mut Ui,
    id: Id,
    cell: &CellRenderState,
    backdrop: [u8; 3],
    step: f64,
) -> Option<f64> {
    let (rect, _) = ui.allocate_exact_size(CELL_SIZE, Sense::hover());
    let response = ui.interact(rect, id, Sense::click());

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        painter.rect_filled(rect, CornerRadius::same(3), cell.color.to_color32());
        if response.hovered() {
            painter.rect_stroke(
                rect,
                CornerRadius::same(3),
                Stroke::new(1.0, ui.visuals().strong_text_color()),
                StrokeKind::Inside,
            );
        }

        let text_color = cell.color.text_contrast(backdrop);
        painter.text(
            rect.center() - Vec2::new(0.0, 7.0),
            egui::Align2::CENTER_CENTER,
            &cell.display_base,
            egui::FontId::proportional(15.0),
            text_color,
        );
        painter.text(
            rect.center() + Vec2::new(0.0, 10.0),
            egui::Align2::CENTER_CENTER,
            format!("({})", cell.display_weighted),
            egui::FontId::proportional(11.0),
            text_color.gamma_multiply(0.8),
        );
    }

    let response = response.on_hover_text("Click to increase, right-click to decrease");
    click_delta(response.clicked(), response.secondary_clicked(), step)
}

/// Weight button: left click raises the weight, right click lowers it
fn weight_button(ui: &mut Ui, id: Id, display_weight: &str, step: f64) -> Option<f64> {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(WEIGHT_WIDTH, CELL_SIZE.y), Sense::hover());
    let response = ui.interact(rect, id, Sense::click());

    if ui.is_rect_visible(rect) {
        let visuals = ui.style().interact(&response);
        ui.painter().rect(
            rect,
            visuals.corner_radius,
            visuals.weak_bg_fill,
            visuals.bg_stroke,
            StrokeKind::Inside,
        );
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            display_weight,
            egui::FontId::proportional(14.0),
            visuals.text_color(),
        );
    }

    let response = response.on_hover_text("Click to increase, right-click to decrease");
    click_delta(response.clicked(), response.secondary_clicked(), step)
}

/// Signed step for a click; primary wins if both fired in one frame
fn click_delta(primary: bool, secondary: bool, step: f64) -> Option<f64> {
    if primary {
        Some(step)
    } else if secondary {
        Some(-step)
    } else {
        None
    }
}

/// Evenly spaced colors across the full gradient, red end first
fn gradient_stops(count: usize, opacity: f64) -> Vec<HeatColor> {
    let last = count.saturating_sub(1).max(1) as f64;
    (0..count)
        .map(|i| color_for(i as f64 / last, 0.0, 1.0, opacity))
        .collect()
}

/// Get a translucent background color appropriate for light/dark mode
fn get_overlay_bg(ui: &Ui) -> Color32 {
    if ui.visuals().dark_mode {
        Color32::from_black_alpha(180)
    } else {
        Color32::from_white_alpha(220)
    }
}

/// Get text color appropriate for light/dark mode overlays
fn get_overlay_text_color(ui: &Ui) -> Color32 {
    if ui.visuals().dark_mode {
        Color32::WHITE
    } else {
        Color32::from_gray(30)
    }
}

/// Create a frame style for control groups that adapts to light/dark mode
fn overlay_frame(ui: &Ui) -> egui::Frame {
    let bg = get_overlay_bg(ui);
    egui::Frame::new()
        .fill(bg)
        .corner_radius(4)
        .inner_margin(egui::Margin::symmetric(6, 4))
}
