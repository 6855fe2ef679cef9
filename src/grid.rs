//! Grid model: criteria rows, option columns, weights, and base values
//!
//! The grid is the single source of truth for the matrix. Every operation keeps
//! `row.cells.len() == columns.len()` for all rows and never shrinks the grid
//! below its configured floor. Operations report what happened through
//! [`EditOutcome`] instead of failing; callers re-run `render::sync` afterwards.

use crate::config::{GridLimits, MatrixConfig};

/// Why an edit left the grid untouched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Row or column index does not exist
    OutOfBounds,
    /// Value or delta was NaN or infinite
    NotFinite,
    /// Removal would go below the minimum row/column count
    MinimumSize,
}

/// Result of a grid operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Stored exactly as requested
    Applied,
    /// Stored after clamping into the allowed range
    Clamped,
    /// Nothing changed
    Rejected(Rejection),
}

impl EditOutcome {
    /// True if the grid changed (or may have changed) and needs a re-sync
    pub fn is_applied(&self) -> bool {
        !matches!(self, EditOutcome::Rejected(_))
    }

    fn from_clamp(requested: f64, stored: f64) -> Self {
        if requested == stored {
            EditOutcome::Applied
        } else {
            EditOutcome::Clamped
        }
    }
}

/// One (criterion, option) intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    base: f64,
}

impl Cell {
    fn new(base: f64) -> Self {
        Self { base }
    }

    /// User-entered score
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Score multiplied by the owning row's weight
    pub fn weighted(&self, weight: f64) -> f64 {
        self.base * weight
    }
}

/// One criterion
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    label: String,
    weight: f64,
    cells: Vec<Cell>,
}

impl Row {
    fn new(label: String, weight: f64, columns: usize, value: f64) -> Self {
        Self {
            label,
            weight,
            cells: vec![Cell::new(value); columns],
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Weighted value of the cell in column `col`
    pub fn weighted(&self, col: usize) -> Option<f64> {
        self.cells.get(col).map(|cell| cell.weighted(self.weight))
    }

    /// Weighted values of every cell in this row, left to right
    pub fn weighted_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().map(move |cell| cell.weighted(self.weight))
    }
}

/// Default label for the row appended at zero-based `index` (`P1`, `P2`, ...)
pub fn default_row_label(index: usize) -> String {
    format!("P{}", index + 1)
}

/// Default label for the column appended at zero-based `index` (`S1`, `S2`, ...)
pub fn default_column_label(index: usize) -> String {
    format!("S{}", index + 1)
}

/// The matrix of criteria versus options
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    title: String,
    columns: Vec<String>,
    rows: Vec<Row>,
    limits: GridLimits,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(&MatrixConfig::default())
    }
}

impl Grid {
    /// Build a grid from the config's title, labels, and defaults.
    ///
    /// The config is expected to have passed `MatrixConfig::validate`.
    pub fn new(config: &MatrixConfig) -> Self {
        let limits = config.limits();
        let columns = config.column_labels.clone();
        let rows = config
            .row_labels
            .iter()
            .map(|label| {
                Row::new(
                    label.clone(),
                    limits.default_weight,
                    columns.len(),
                    limits.default_value,
                )
            })
            .collect();

        Self {
            title: config.title.clone(),
            columns,
            rows,
            limits,
        }
    }

    /// Discard every row, column, weight, and value and rebuild from `config`
    pub fn reset(&mut self, config: &MatrixConfig) {
        *self = Self::new(config);
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    pub fn limits(&self) -> &GridLimits {
        &self.limits
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.get(col)
    }

    /// `base * weight` for one cell
    pub fn weighted(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row)?.weighted(col)
    }

    /// Every weighted value in row-major order
    pub fn weighted_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().flat_map(|row| row.weighted_values())
    }

    /// Largest absolute row weight, or `None` for a grid without rows
    pub fn max_abs_weight(&self) -> Option<f64> {
        self.rows
            .iter()
            .map(|row| row.weight.abs())
            .reduce(f64::max)
    }

    /// Check the structural invariants (cell counts and minimum size)
    pub fn is_consistent(&self) -> bool {
        self.rows.len() >= self.limits.min_rows
            && self.columns.len() >= self.limits.min_columns
            && self.rows.iter().all(|row| row.cells.len() == self.columns.len())
    }

    // =========================================================================
    // Value edits
    // =========================================================================

    /// Set a cell's base value, clamped into `[min_value, max_value]`
    pub fn set_cell_base(&mut self, row: usize, col: usize, value: f64) -> EditOutcome {
        if !value.is_finite() {
            return EditOutcome::Rejected(Rejection::NotFinite);
        }
        let stored = self.limits.clamp_value(value);
        match self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col)) {
            Some(cell) => {
                cell.base = stored;
                EditOutcome::from_clamp(value, stored)
            }
            None => EditOutcome::Rejected(Rejection::OutOfBounds),
        }
    }

    /// Move a cell's base value by `delta`, clamped into the value range
    pub fn step_cell(&mut self, row: usize, col: usize, delta: f64) -> EditOutcome {
        match self.cell(row, col) {
            Some(cell) => {
                let target = cell.base + delta;
                self.set_cell_base(row, col, target)
            }
            None => EditOutcome::Rejected(Rejection::OutOfBounds),
        }
    }

    /// Move a row's weight by `delta`, clamped into the weight bounds
    pub fn adjust_weight(&mut self, row: usize, delta: f64) -> EditOutcome {
        if !delta.is_finite() {
            return EditOutcome::Rejected(Rejection::NotFinite);
        }
        let bounds = self.limits.weight_bounds;
        match self.rows.get_mut(row) {
            Some(r) => {
                let requested = r.weight + delta;
                let stored = bounds.clamp(requested);
                r.weight = stored;
                EditOutcome::from_clamp(requested, stored)
            }
            None => EditOutcome::Rejected(Rejection::OutOfBounds),
        }
    }

    // =========================================================================
    // Label edits
    // =========================================================================

    pub fn set_title(&mut self, title: impl Into<String>) -> EditOutcome {
        self.title = title.into();
        EditOutcome::Applied
    }

    pub fn rename_row(&mut self, row: usize, label: impl Into<String>) -> EditOutcome {
        match self.rows.get_mut(row) {
            Some(r) => {
                r.label = label.into();
                EditOutcome::Applied
            }
            None => EditOutcome::Rejected(Rejection::OutOfBounds),
        }
    }

    pub fn rename_column(&mut self, col: usize, label: impl Into<String>) -> EditOutcome {
        match self.columns.get_mut(col) {
            Some(c) => {
                *c = label.into();
                EditOutcome::Applied
            }
            None => EditOutcome::Rejected(Rejection::OutOfBounds),
        }
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Append a row labeled `P{n}` with default weight and values
    pub fn add_row(&mut self) -> EditOutcome {
        self.add_row_with(default_row_label)
    }

    /// Append a row whose label is produced from its zero-based index
    pub fn add_row_with<F>(&mut self, make_label: F) -> EditOutcome
    where
        F: FnOnce(usize) -> String,
    {
        let label = make_label(self.rows.len());
        self.rows.push(Row::new(
            label,
            self.limits.default_weight,
            self.columns.len(),
            self.limits.default_value,
        ));
        EditOutcome::Applied
    }

    /// Append a column labeled `S{n}` and a default cell to every row
    pub fn add_column(&mut self) -> EditOutcome {
        self.add_column_with(default_column_label)
    }

    /// Append a column whose label is produced from its zero-based index
    pub fn add_column_with<F>(&mut self, make_label: F) -> EditOutcome
    where
        F: FnOnce(usize) -> String,
    {
        let label = make_label(self.columns.len());
        self.columns.push(label);
        let value = self.limits.default_value;
        for row in &mut self.rows {
            row.cells.push(Cell::new(value));
        }
        EditOutcome::Applied
    }

    /// Remove the last row, unless that would go below the minimum row count
    pub fn remove_row(&mut self) -> EditOutcome {
        if self.rows.len() <= self.limits.min_rows {
            return EditOutcome::Rejected(Rejection::MinimumSize);
        }
        self.rows.pop();
        EditOutcome::Applied
    }

    /// Remove the last column from the header and every row, unless that
    /// would go below the minimum column count
    pub fn remove_column(&mut self) -> EditOutcome {
        if self.columns.len() <= self.limits.min_columns {
            return EditOutcome::Rejected(Rejection::MinimumSize);
        }
        self.columns.pop();
        for row in &mut self.rows {
            row.cells.pop();
        }
        EditOutcome::Applied
    }
}
