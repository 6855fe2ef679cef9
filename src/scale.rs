//! Scale resolution for heatmap coloring
//!
//! Pure functions that compute the effective [min, max] range of the grid under
//! the current scale mode. Nothing here is cached: any single cell or weight
//! edit can move the dynamic range, so callers resolve again after every edit.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Range used by Dynamic mode when the grid has no cells
pub const EMPTY_DYNAMIC_RANGE: ScaleRange = ScaleRange { min: -1.0, max: 1.0 };

/// How the color range is derived
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Configured value bounds scaled by the largest absolute weight
    #[default]
    Fixed,
    /// Live min/max over every weighted value
    Dynamic,
}

impl ScaleMode {
    /// Get display name for UI
    pub fn name(&self) -> &'static str {
        match self {
            ScaleMode::Fixed => "fixed",
            ScaleMode::Dynamic => "dynamic",
        }
    }

    /// Parse a mode name ("fixed" or "dynamic", case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fixed" => Some(ScaleMode::Fixed),
            "dynamic" => Some(ScaleMode::Dynamic),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ScaleMode::Fixed => ScaleMode::Dynamic,
            ScaleMode::Dynamic => ScaleMode::Fixed,
        }
    }
}

/// Inclusive color range
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

/// Resolve the color range of `grid` under `mode`
pub fn resolve_range(grid: &Grid, mode: ScaleMode) -> ScaleRange {
    match mode {
        ScaleMode::Fixed => fixed_range(grid),
        ScaleMode::Dynamic => dynamic_range(grid),
    }
}

/// `[min_value * m, max_value * m]` where `m` is the largest absolute weight
fn fixed_range(grid: &Grid) -> ScaleRange {
    let limits = grid.limits();
    let max_weight = grid.max_abs_weight().unwrap_or(limits.default_weight);
    ScaleRange {
        min: limits.min_value * max_weight,
        max: limits.max_value * max_weight,
    }
}

/// Min/max over all weighted values
fn dynamic_range(grid: &Grid) -> ScaleRange {
    grid.weighted_values()
        .fold(None, |acc: Option<ScaleRange>, v| {
            Some(match acc {
                None => ScaleRange { min: v, max: v },
                Some(r) => ScaleRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            })
        })
        .unwrap_or(EMPTY_DYNAMIC_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatrixConfig;

    fn grid_with(weights: &[f64], values: &[&[f64]]) -> Grid {
        let config = MatrixConfig {
            row_labels: (0..weights.len()).map(|i| format!("R{}", i)).collect(),
            column_labels: (0..values[0].len()).map(|i| format!("C{}", i)).collect(),
            ..MatrixConfig::default()
        };
        let mut grid = Grid::new(&config);
        for (r, (&w, row_values)) in weights.iter().zip(values).enumerate() {
            grid.adjust_weight(r, w - 1.0);
            for (c, &v) in row_values.iter().enumerate() {
                grid.set_cell_base(r, c, v);
            }
        }
        grid
    }

    #[test]
    fn test_dynamic_range_min_max() {
        let grid = grid_with(&[1.0], &[&[-4.0, 2.0, 7.0, -1.0]]);
        assert_eq!(
            resolve_range(&grid, ScaleMode::Dynamic),
            ScaleRange { min: -4.0, max: 7.0 }
        );
    }

    #[test]
    fn test_dynamic_range_uses_weighted_values() {
        let grid = grid_with(&[2.0, -1.0], &[&[3.0, 0.0], &[4.0, 1.0]]);
        // weighted: [6, 0, -4, -1]
        assert_eq!(
            resolve_range(&grid, ScaleMode::Dynamic),
            ScaleRange { min: -4.0, max: 6.0 }
        );
    }

    #[test]
    fn test_fixed_range_uses_max_abs_weight() {
        let grid = grid_with(&[1.0, 3.0, -2.0], &[&[0.0], &[0.0], &[0.0]]);
        assert_eq!(
            resolve_range(&grid, ScaleMode::Fixed),
            ScaleRange { min: -30.0, max: 30.0 }
        );
    }

    #[test]
    fn test_fixed_range_ignores_values() {
        let a = grid_with(&[1.0], &[&[0.0, 0.0]]);
        let b = grid_with(&[1.0], &[&[9.0, -3.0]]);
        assert_eq!(resolve_range(&a, ScaleMode::Fixed), resolve_range(&b, ScaleMode::Fixed));
    }

    #[test]
    fn test_single_nonzero_value() {
        let mut grid = Grid::default();
        grid.set_cell_base(0, 0, 5.0);
        assert_eq!(
            resolve_range(&grid, ScaleMode::Dynamic),
            ScaleRange { min: 0.0, max: 5.0 }
        );
    }

    #[test]
    fn test_all_zero_dynamic_range_is_degenerate() {
        let grid = Grid::default();
        let range = resolve_range(&grid, ScaleMode::Dynamic);
        assert!(range.is_degenerate());
        assert_eq!(range.min, 0.0);
    }

    #[test]
    fn test_grid_without_cells_uses_fallbacks() {
        // Not reachable through a validated config, but the resolver must not panic
        let config = MatrixConfig {
            row_labels: Vec::new(),
            default_weight: 2.0,
            ..MatrixConfig::default()
        };
        let grid = Grid::new(&config);
        assert_eq!(resolve_range(&grid, ScaleMode::Dynamic), EMPTY_DYNAMIC_RANGE);
        assert_eq!(
            resolve_range(&grid, ScaleMode::Fixed),
            ScaleRange { min: -20.0, max: 20.0 }
        );
    }

    #[test]
    fn test_scale_mode_names() {
        assert_eq!(ScaleMode::from_name("Dynamic"), Some(ScaleMode::Dynamic));
        assert_eq!(ScaleMode::from_name("fixed"), Some(ScaleMode::Fixed));
        assert_eq!(ScaleMode::from_name("log"), None);
        assert_eq!(ScaleMode::Fixed.toggled(), ScaleMode::Dynamic);
        assert_eq!(ScaleMode::Dynamic.name(), "dynamic");
    }
}
