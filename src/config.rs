//! Matrix configuration: value limits, weight bounds, and the default grid
//!
//! A `MatrixConfig` describes everything needed to build (or rebuild on reset)
//! a grid. It can be deserialized from the camelCase JSON object JavaScript
//! passes to `MatrixHandle.createWithConfig`; any omitted field keeps its default.

use serde::Deserialize;

use crate::error::MatrixError;
use crate::scale::ScaleMode;

/// Default matrix title
pub const DEFAULT_TITLE: &str = "Weighted Matrix Tool";
/// Default row (criteria) labels
pub const DEFAULT_ROW_LABELS: [&str; 3] = ["Criteria 1", "Criteria 2", "Criteria 3"];
/// Default column (option) labels
pub const DEFAULT_COLUMN_LABELS: [&str; 4] = ["Option 1", "Option 2", "Option 3", "Option 4"];
/// Weight given to every new row
pub const DEFAULT_WEIGHT: f64 = 1.0;
/// Base value given to every new cell
pub const DEFAULT_VALUE: f64 = 0.0;
/// Lowest allowed base value
pub const DEFAULT_MIN_VALUE: f64 = -10.0;
/// Highest allowed base value
pub const DEFAULT_MAX_VALUE: f64 = 10.0;
/// Amount a cell changes per click
pub const DEFAULT_VALUE_STEP: f64 = 1.0;
/// Amount a weight changes per click
pub const DEFAULT_WEIGHT_STEP: f64 = 1.0;
/// Heatmap opacity; the slider starts at 50%
pub const DEFAULT_OPACITY: f64 = 0.5;
/// Smallest number of rows the grid may shrink to
pub const DEFAULT_MIN_ROWS: usize = 1;
/// Smallest number of columns the grid may shrink to
pub const DEFAULT_MIN_COLUMNS: usize = 1;

/// Inclusive bounds applied whenever a row weight is adjusted
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightBounds {
    pub min: f64,
    pub max: f64,
}

impl WeightBounds {
    /// Bounds of `±limit`
    pub fn symmetric(limit: f64) -> Self {
        Self {
            min: -limit,
            max: limit,
        }
    }

    pub fn clamp(&self, weight: f64) -> f64 {
        weight.clamp(self.min, self.max)
    }
}

/// The `weightBounds` entry of a config. A missing end follows `maxValue`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeightBoundsOverride {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// The numeric rules a grid enforces on every edit.
///
/// Copied into the grid so that structural operations never need the full config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLimits {
    pub min_value: f64,
    pub max_value: f64,
    pub weight_bounds: WeightBounds,
    pub default_weight: f64,
    pub default_value: f64,
    pub min_rows: usize,
    pub min_columns: usize,
}

impl Default for GridLimits {
    fn default() -> Self {
        MatrixConfig::default().limits()
    }
}

impl GridLimits {
    /// Clamp a base value into `[min_value, max_value]`
    pub fn clamp_value(&self, value: f64) -> f64 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// Full configuration for a matrix session
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatrixConfig {
    pub title: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub default_weight: f64,
    pub default_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub weight_bounds: WeightBoundsOverride,
    pub min_rows: usize,
    pub min_columns: usize,
    pub value_step: f64,
    pub weight_step: f64,
    pub opacity: f64,
    pub scale_mode: ScaleMode,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            row_labels: DEFAULT_ROW_LABELS.iter().map(|s| s.to_string()).collect(),
            column_labels: DEFAULT_COLUMN_LABELS.iter().map(|s| s.to_string()).collect(),
            default_weight: DEFAULT_WEIGHT,
            default_value: DEFAULT_VALUE,
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
            weight_bounds: WeightBoundsOverride::default(),
            min_rows: DEFAULT_MIN_ROWS,
            min_columns: DEFAULT_MIN_COLUMNS,
            value_step: DEFAULT_VALUE_STEP,
            weight_step: DEFAULT_WEIGHT_STEP,
            opacity: DEFAULT_OPACITY,
            scale_mode: ScaleMode::default(),
        }
    }
}

impl MatrixConfig {
    /// Parse a camelCase JSON object and validate it
    pub fn from_json(json: &str) -> Result<Self, MatrixError> {
        let config: MatrixConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Weight bounds in effect: `±max_value` unless `weightBounds` overrides an end
    pub fn weight_bounds(&self) -> WeightBounds {
        let derived = WeightBounds::symmetric(self.max_value);
        WeightBounds {
            min: self.weight_bounds.min.unwrap_or(derived.min),
            max: self.weight_bounds.max.unwrap_or(derived.max),
        }
    }

    /// Extract the limits a grid enforces
    pub fn limits(&self) -> GridLimits {
        GridLimits {
            min_value: self.min_value,
            max_value: self.max_value,
            weight_bounds: self.weight_bounds(),
            default_weight: self.default_weight,
            default_value: self.default_value,
            min_rows: self.min_rows,
            min_columns: self.min_columns,
        }
    }

    /// Check that the config describes a buildable grid.
    ///
    /// Every numeric field must be finite and the click steps positive. Ranges
    /// must be ordered, the defaults must lie inside their ranges, and the
    /// default labels must satisfy the minimum grid size.
    pub fn validate(&self) -> Result<(), MatrixError> {
        let weight_bounds = self.weight_bounds();
        let numbers = [
            ("defaultWeight", self.default_weight),
            ("defaultValue", self.default_value),
            ("minValue", self.min_value),
            ("maxValue", self.max_value),
            ("weightBounds.min", weight_bounds.min),
            ("weightBounds.max", weight_bounds.max),
            ("valueStep", self.value_step),
            ("weightStep", self.weight_step),
            ("opacity", self.opacity),
        ];
        if let Some((name, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MatrixError::InvalidConfig(format!("{} must be finite", name)));
        }
        let steps = [("valueStep", self.value_step), ("weightStep", self.weight_step)];
        if let Some((name, step)) = steps.iter().find(|(_, v)| *v <= 0.0) {
            return Err(MatrixError::InvalidConfig(format!(
                "{} ({}) must be greater than 0",
                name, step
            )));
        }
        if self.min_value >= self.max_value {
            return Err(MatrixError::InvalidConfig(format!(
                "minValue ({}) must be below maxValue ({})",
                self.min_value, self.max_value
            )));
        }
        if weight_bounds.min > weight_bounds.max {
            return Err(MatrixError::InvalidConfig(format!(
                "weightBounds.min ({}) must not exceed weightBounds.max ({})",
                weight_bounds.min, weight_bounds.max
            )));
        }
        if !(self.min_value..=self.max_value).contains(&self.default_value) {
            return Err(MatrixError::InvalidConfig(format!(
                "defaultValue ({}) is outside [{}, {}]",
                self.default_value, self.min_value, self.max_value
            )));
        }
        if !(weight_bounds.min..=weight_bounds.max).contains(&self.default_weight) {
            return Err(MatrixError::InvalidConfig(format!(
                "defaultWeight ({}) is outside [{}, {}]",
                self.default_weight, weight_bounds.min, weight_bounds.max
            )));
        }
        if self.min_rows == 0 || self.min_columns == 0 {
            return Err(MatrixError::InvalidConfig(
                "minRows and minColumns must be at least 1".to_string(),
            ));
        }
        if self.row_labels.len() < self.min_rows {
            return Err(MatrixError::InvalidConfig(format!(
                "{} row labels given, at least {} required",
                self.row_labels.len(),
                self.min_rows
            )));
        }
        if self.column_labels.len() < self.min_columns {
            return Err(MatrixError::InvalidConfig(format!(
                "{} column labels given, at least {} required",
                self.column_labels.len(),
                self.min_columns
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(MatrixError::InvalidConfig(format!(
                "opacity ({}) must be within [0, 1]",
                self.opacity
            )));
        }
        Ok(())
    }
}
