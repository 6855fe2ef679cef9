//! User intents and the notices they produce
//!
//! A presentation layer turns raw input (clicks, text edits, toggles) into
//! `Intent` values and hands them to `MatrixSession::dispatch`. Intents also
//! arrive from JavaScript as JSON, e.g. `{"type": "editCell", "row": 0, "col": 1, "value": 4}`.

use serde::{Deserialize, Serialize};

use crate::scale::ScaleMode;

/// One discrete user action against the matrix
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    /// Set a cell's base value (clamped)
    EditCell { row: usize, col: usize, value: f64 },
    /// Nudge a cell's base value by `delta` (clamped)
    StepCell { row: usize, col: usize, delta: f64 },
    /// Nudge a row's weight by `delta` (clamped to the weight bounds)
    EditWeight { row: usize, delta: f64 },
    SetTitle { title: String },
    RenameRow { row: usize, label: String },
    RenameColumn { col: usize, label: String },
    AddRow,
    AddColumn,
    RemoveRow,
    RemoveColumn,
    /// Rebuild the grid from the session's configuration
    Reset,
    SetScaleMode { mode: ScaleMode },
    SetOpacity { opacity: f64 },
}

impl Intent {
    /// Parse an intent from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// True for intents that change the number of rows or columns
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Intent::AddRow
                | Intent::AddColumn
                | Intent::RemoveRow
                | Intent::RemoveColumn
                | Intent::Reset
        )
    }
}

/// Severity of a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short user-facing message; showing it (as a toast or otherwise) is up to the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_json() {
        assert_eq!(
            Intent::from_json(r#"{"type": "editCell", "row": 0, "col": 1, "value": 4}"#).unwrap(),
            Intent::EditCell { row: 0, col: 1, value: 4.0 }
        );
        assert_eq!(
            Intent::from_json(r#"{"type": "addRow"}"#).unwrap(),
            Intent::AddRow
        );
        assert_eq!(
            Intent::from_json(r#"{"type": "setScaleMode", "mode": "dynamic"}"#).unwrap(),
            Intent::SetScaleMode { mode: ScaleMode::Dynamic }
        );
        assert_eq!(
            Intent::from_json(r#"{"type": "renameColumn", "col": 2, "label": "Rent"}"#).unwrap(),
            Intent::RenameColumn { col: 2, label: "Rent".to_string() }
        );
    }

    #[test]
    fn test_intent_from_json_rejects_unknown() {
        assert!(Intent::from_json(r#"{"type": "undo"}"#).is_err());
        assert!(Intent::from_json(r#"{"type": "editCell", "row": 0}"#).is_err());
    }

    #[test]
    fn test_structural_intents() {
        assert!(Intent::AddColumn.is_structural());
        assert!(Intent::Reset.is_structural());
        assert!(!Intent::SetOpacity { opacity: 0.2 }.is_structural());
    }

    #[test]
    fn test_notice_serializes_level() {
        let json = serde_json::to_string(&Notice::warning("Matrix reset")).unwrap();
        assert_eq!(json, r#"{"level":"warning","message":"Matrix reset"}"#);
    }
}
