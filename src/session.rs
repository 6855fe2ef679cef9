//! MatrixSession - owns the grid and keeps its render state in step
//!
//! Every intent goes through `dispatch`, which mutates the grid and then runs a
//! full `render::sync` before returning. Callers only ever observe a grid and a
//! `RenderState` that agree with each other.

use crate::config::{MatrixConfig, DEFAULT_TITLE};
use crate::error::MatrixError;
use crate::export::{self, MarkdownOptions};
use crate::grid::{EditOutcome, Grid};
use crate::intent::{Intent, Notice};
use crate::render::{self, RenderState};
use crate::scale::ScaleMode;

/// What a dispatched intent did
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatched {
    pub outcome: EditOutcome,
    /// Message worth surfacing to the user, if any
    pub notice: Option<Notice>,
}

/// Single-writer owner of a matrix and its latest render state
pub struct MatrixSession {
    config: MatrixConfig,
    grid: Grid,
    mode: ScaleMode,
    opacity: f64,
    render: RenderState,
    /// Bumped after every sync so hosts can tell when to repaint
    revision: u64,
}

impl Default for MatrixSession {
    fn default() -> Self {
        Self::from_valid_config(MatrixConfig::default())
    }
}

impl MatrixSession {
    /// Create a session after validating `config`
    pub fn new(config: MatrixConfig) -> Result<Self, MatrixError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: MatrixConfig) -> Self {
        let grid = Grid::new(&config);
        let mode = config.scale_mode;
        let opacity = config.opacity;
        let render = render::sync(&grid, mode, opacity);
        Self {
            config,
            grid,
            mode,
            opacity,
            render,
            revision: 0,
        }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The render state produced by the most recent sync
    pub fn render(&self) -> &RenderState {
        &self.render
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply one intent and re-sync.
    ///
    /// Rejected edits leave the grid untouched and skip the sync.
    pub fn dispatch(&mut self, intent: Intent) -> Dispatched {
        let notice = structural_notice(&intent);
        let structural = intent.is_structural();
        let outcome = match intent {
            Intent::EditCell { row, col, value } => self.grid.set_cell_base(row, col, value),
            Intent::StepCell { row, col, delta } => self.grid.step_cell(row, col, delta),
            Intent::EditWeight { row, delta } => self.grid.adjust_weight(row, delta),
            Intent::SetTitle { title } => self.grid.set_title(title),
            Intent::RenameRow { row, label } => self.grid.rename_row(row, label),
            Intent::RenameColumn { col, label } => self.grid.rename_column(col, label),
            Intent::AddRow => self.grid.add_row(),
            Intent::AddColumn => self.grid.add_column(),
            Intent::RemoveRow => self.grid.remove_row(),
            Intent::RemoveColumn => self.grid.remove_column(),
            Intent::Reset => {
                self.grid.reset(&self.config);
                EditOutcome::Applied
            }
            Intent::SetScaleMode { mode } => {
                self.mode = mode;
                EditOutcome::Applied
            }
            Intent::SetOpacity { opacity } => self.set_opacity(opacity),
        };

        if let EditOutcome::Rejected(reason) = outcome {
            log::debug!("Edit rejected: {:?}", reason);
            return Dispatched {
                outcome,
                notice: None,
            };
        }

        self.sync();
        debug_assert!(self.grid.is_consistent());
        if structural {
            log::debug!(
                "Grid is now {}x{} (revision {})",
                self.grid.row_count(),
                self.grid.column_count(),
                self.revision
            );
        }
        Dispatched { outcome, notice }
    }

    /// Recompute the render state from the grid
    fn sync(&mut self) {
        self.render = render::sync(&self.grid, self.mode, self.opacity);
        self.revision = self.revision.wrapping_add(1);
    }

    fn set_opacity(&mut self, opacity: f64) -> EditOutcome {
        if !opacity.is_finite() {
            return EditOutcome::Rejected(crate::grid::Rejection::NotFinite);
        }
        let clamped = opacity.clamp(0.0, 1.0);
        self.opacity = clamped;
        if clamped == opacity {
            EditOutcome::Applied
        } else {
            EditOutcome::Clamped
        }
    }

    // =========================================================================
    // Export
    // =========================================================================

    pub fn export_markdown(&self, options: MarkdownOptions) -> Result<String, MatrixError> {
        export::ensure_exportable(&self.grid, "markdown")?;
        Ok(export::to_markdown(&self.grid, options))
    }

    /// Markdown export for the preview pane, with the notice to show alongside it
    pub fn preview_markdown(&self, options: MarkdownOptions) -> Result<(String, Notice), MatrixError> {
        let markdown = self.export_markdown(options)?;
        Ok((markdown, Notice::success("Matrix converted to Markdown")))
    }

    pub fn export_csv(&self) -> Result<String, MatrixError> {
        export::to_csv(&self.grid)
    }

    /// Notice greeting the user when a matrix is first shown
    pub fn welcome_notice() -> Notice {
        Notice::info(format!("Welcome to the {}!", DEFAULT_TITLE))
    }

    /// File name offered when downloading the CSV export
    pub fn csv_file_name(&self) -> String {
        export::csv_file_name(self.grid.title())
    }
}

/// Notice shown after a successful structural change
fn structural_notice(intent: &Intent) -> Option<Notice> {
    match intent {
        Intent::AddRow => Some(Notice::info("Row added")),
        Intent::AddColumn => Some(Notice::info("Column added")),
        Intent::RemoveRow => Some(Notice::info("Row removed")),
        Intent::RemoveColumn => Some(Notice::info("Column removed")),
        Intent::Reset => Some(Notice::warning("Matrix reset to default values")),
        _ => None,
    }
}
