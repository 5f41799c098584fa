//! Form and field state.

use maklar_core::ValidationError;
use serde::{Deserialize, Serialize};

/// When field-level validation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Validate a field whenever its value changes.
    #[default]
    OnChange,
    /// Validate a field when it loses focus.
    OnBlur,
    /// Validate only on submit.
    OnSubmit,
    /// Validate on change and on blur.
    All,
}

impl ValidationMode {
    /// Whether a change event validates the field.
    #[must_use]
    pub const fn validates_on_change(self) -> bool {
        matches!(self, Self::OnChange | Self::All)
    }

    /// Whether a blur event validates the field.
    #[must_use]
    pub const fn validates_on_blur(self) -> bool {
        matches!(self, Self::OnBlur | Self::All)
    }
}

/// Whether the form has been edited since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dirtiness {
    /// No edits yet.
    #[default]
    Pristine,
    /// At least one field changed.
    Dirty,
}

/// Whether the user has interacted with the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Touch {
    /// No field focused or changed yet.
    #[default]
    Untouched,
    /// At least one field changed or blurred.
    Touched,
}

/// Whether a submit is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Submission {
    /// No submit running.
    #[default]
    Idle,
    /// The submit handler is running.
    Submitting,
}

/// Snapshot of the whole form's validation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationState {
    /// `true` unless the last whole-form validation or submit failed.
    pub is_valid: bool,
    /// Errors of the last whole-form validation or submit.
    pub errors: Vec<ValidationError>,
    /// Any field changed since the last reset.
    pub is_dirty: bool,
    /// Any field changed or blurred since the last reset.
    pub is_touched: bool,
    /// A submit handler is running.
    pub is_submitting: bool,
}

/// Result of the last check of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum FieldStatus {
    /// Not checked yet.
    #[default]
    Unvalidated,
    /// Passed its last check.
    Valid,
    /// Failed its last check with this message.
    Invalid(String),
}

impl FieldStatus {
    /// The error message, if invalid.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Invalid(message) => Some(message),
            _ => None,
        }
    }
}

/// Per-field state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationState {
    /// Last check result.
    pub status: FieldStatus,
    /// The field's value changed.
    pub is_dirty: bool,
    /// The field changed or blurred.
    pub is_touched: bool,
}

/// What a UI binds to one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldProps {
    /// Field name.
    pub name: String,
    /// Current value; absent and null values render as an empty string.
    pub value: serde_json::Value,
    /// Error message to display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Mirrors an invalid status for assistive technology.
    #[serde(rename = "aria-invalid")]
    pub aria_invalid: bool,
    /// Id of the element carrying the error message (`<name>-error`).
    #[serde(rename = "aria-describedby", skip_serializing_if = "Option::is_none")]
    pub aria_describedby: Option<String>,
}
