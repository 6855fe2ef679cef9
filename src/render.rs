//! Render/sync engine
//!
//! Projects the grid into a `RenderState`: every cell's displayed base and
//! weighted values plus its heatmap color, the row and column captions, and the
//! two scale labels. The projection is pure, so a presentation layer can repaint
//! from it without ever touching the grid.

use serde::Serialize;

use crate::colormap::{color_for, HeatColor};
use crate::grid::Grid;
use crate::scale::{resolve_range, ScaleMode, ScaleRange};

/// Display state for one cell
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRenderState {
    pub display_base: String,
    pub display_weighted: String,
    pub color: HeatColor,
}

/// Display state for one criterion row
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRenderState {
    pub label: String,
    pub display_weight: String,
    pub cells: Vec<CellRenderState>,
}

/// Everything a presentation layer needs to paint the matrix
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<RowRenderState>,
    pub mode: ScaleMode,
    pub range: ScaleRange,
    pub opacity: f64,
    pub min_label: String,
    pub max_label: String,
}

impl RenderState {
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellRenderState> {
        self.rows.get(row)?.cells.get(col)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &CellRenderState> {
        self.rows.iter().flat_map(|row| row.cells.iter())
    }
}

/// Recompute every derived value and color of `grid`.
///
/// Fixed mode colors each unweighted base against the configured value bounds;
/// Dynamic mode colors each weighted value against the live weighted range. The
/// scale labels always show the resolved range for the mode.
pub fn sync(grid: &Grid, mode: ScaleMode, opacity: f64) -> RenderState {
    let range = resolve_range(grid, mode);
    let limits = grid.limits();

    let rows = grid
        .rows()
        .iter()
        .map(|row| {
            let cells = row
                .cells()
                .iter()
                .map(|cell| {
                    let base = cell.base();
                    let weighted = cell.weighted(row.weight());
                    let color = match mode {
                        ScaleMode::Fixed => {
                            color_for(base, limits.min_value, limits.max_value, opacity)
                        }
                        ScaleMode::Dynamic => color_for(weighted, range.min, range.max, opacity),
                    };
                    CellRenderState {
                        display_base: format_value(base),
                        display_weighted: format_value(weighted),
                        color,
                    }
                })
                .collect();
            RowRenderState {
                label: row.label().to_string(),
                display_weight: format_value(row.weight()),
                cells,
            }
        })
        .collect();

    RenderState {
        title: grid.title().to_string(),
        columns: grid.columns().to_vec(),
        rows,
        mode,
        range,
        opacity,
        min_label: min_label(range),
        max_label: max_label(range),
    }
}

/// Format a number to one decimal place; negative zero prints as `0.0`
pub fn format_value(v: f64) -> String {
    let s = format!("{:.1}", v);
    if s == "-0.0" {
        "0.0".to_string()
    } else {
        s
    }
}

pub fn min_label(range: ScaleRange) -> String {
    format!("Negative Impact ({})", format_value(range.min))
}

pub fn max_label(range: ScaleRange) -> String {
    format!("Positive Impact (+{})", format_value(range.max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::NEUTRAL_GRAY;

    #[test]
    fn test_default_grid_render() {
        let grid = Grid::default();
        let state = sync(&grid, ScaleMode::Fixed, 0.5);
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.columns.len(), 4);
        assert_eq!(state.cells().count(), 12);
        assert_eq!(state.min_label, "Negative Impact (-10.0)");
        assert_eq!(state.max_label, "Positive Impact (+10.0)");
        for cell in state.cells() {
            assert_eq!(cell.display_base, "0.0");
            assert_eq!(cell.display_weighted, "0.0");
            assert_eq!(cell.color.rgb(), [255, 255, 255], "zero sits at the white midpoint");
        }
        assert_eq!(state.rows[0].display_weight, "1.0");
    }

    #[test]
    fn test_single_edit_scenario() {
        let mut grid = Grid::default();
        grid.set_cell_base(0, 0, 5.0);

        let state = sync(&grid, ScaleMode::Fixed, 0.5);
        assert_eq!(state.cell(0, 0).unwrap().display_weighted, "5.0");

        let state = sync(&grid, ScaleMode::Dynamic, 0.5);
        assert_eq!(state.range, ScaleRange { min: 0.0, max: 5.0 });
        assert_eq!(state.min_label, "Negative Impact (0.0)");
        assert_eq!(state.max_label, "Positive Impact (+5.0)");
        // Top of the dynamic range is pure green, the zeros are at its red end
        assert_eq!(state.cell(0, 0).unwrap().color.rgb(), [0, 255, 0]);
        assert_eq!(state.cell(1, 1).unwrap().color.rgb(), [255, 0, 0]);
    }

    #[test]
    fn test_fixed_mode_colors_unweighted_base() {
        let mut grid = Grid::default();
        grid.set_cell_base(0, 0, 5.0);
        grid.adjust_weight(0, 2.0);

        let state = sync(&grid, ScaleMode::Fixed, 1.0);
        // Labels reflect the weight-scaled range...
        assert_eq!(state.range, ScaleRange { min: -30.0, max: 30.0 });
        assert_eq!(state.max_label, "Positive Impact (+30.0)");
        // ...but the cell color compares base 5 against [-10, 10]
        assert_eq!(state.cell(0, 0).unwrap().color, color_for(5.0, -10.0, 10.0, 1.0));
        assert_eq!(state.cell(0, 0).unwrap().display_weighted, "15.0");
    }

    #[test]
    fn test_dynamic_mode_colors_weighted_value() {
        let mut grid = Grid::default();
        grid.set_cell_base(0, 0, 5.0);
        grid.set_cell_base(1, 0, -2.0);
        grid.adjust_weight(1, 2.0);

        let state = sync(&grid, ScaleMode::Dynamic, 1.0);
        assert_eq!(state.range, ScaleRange { min: -6.0, max: 5.0 });
        assert_eq!(state.cell(1, 0).unwrap().color, color_for(-6.0, -6.0, 5.0, 1.0));
        assert_eq!(state.cell(1, 0).unwrap().display_weighted, "-6.0");
    }

    #[test]
    fn test_all_zero_dynamic_is_neutral() {
        let grid = Grid::default();
        let state = sync(&grid, ScaleMode::Dynamic, 0.3);
        assert_eq!(state.min_label, "Negative Impact (0.0)");
        assert_eq!(state.max_label, "Positive Impact (+0.0)");
        assert!(state.cells().all(|c| c.color.rgb() == NEUTRAL_GRAY));
    }

    #[test]
    fn test_negative_zero_formatting() {
        let mut grid = Grid::default();
        grid.adjust_weight(0, -3.0);
        let state = sync(&grid, ScaleMode::Fixed, 0.5);
        assert_eq!(state.cell(0, 0).unwrap().display_weighted, "0.0");
        assert_eq!(format_value(-0.04), "0.0");
        assert_eq!(format_value(-1.5), "-1.5");
        assert_eq!(format_value(2.0), "2.0");
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut grid = Grid::default();
        grid.set_cell_base(2, 3, -7.0);
        grid.adjust_weight(2, 1.0);
        for mode in [ScaleMode::Fixed, ScaleMode::Dynamic] {
            let first = sync(&grid, mode, 0.6);
            let second = sync(&grid, mode, 0.6);
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_mode_toggle_recolors_without_value_change() {
        let mut grid = Grid::default();
        grid.set_cell_base(0, 0, 2.0);
        let fixed = sync(&grid, ScaleMode::Fixed, 0.5);
        let dynamic = sync(&grid, ScaleMode::Dynamic, 0.5);
        assert_eq!(
            fixed.cell(0, 0).unwrap().display_base,
            dynamic.cell(0, 0).unwrap().display_base
        );
        assert_ne!(fixed.cell(0, 0).unwrap().color, dynamic.cell(0, 0).unwrap().color);
    }

    #[test]
    fn test_serialized_field_names() {
        let state = sync(&Grid::default(), ScaleMode::Dynamic, 0.5);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"displayBase\":\"0.0\""));
        assert!(json.contains("\"minLabel\":\"Negative Impact (0.0)\""));
        assert!(json.contains("\"mode\":\"dynamic\""));
    }
}
