//! Validation report entries.

use crate::FieldPath;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named substitution parameters attached to a violation or message.
pub type Params = BTreeMap<String, ParamValue>;

/// A value substituted into a message template.
///
/// Numbers, dates and booleans are rendered with locale-aware formatting when
/// a message is resolved; text is inserted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean, rendered as the locale's yes/no word.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Number(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Free text.
    Text(String),
    /// List of text values, rendered comma separated.
    List(Vec<String>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::Text(value) => f.write_str(value),
            Self::List(values) => f.write_str(&values.join(", ")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// One field-addressable error entry.
///
/// `field` uses dot/bracket notation; an empty `field` marks a whole-entity
/// error. `params` is only present when the caller asked for it.
///
/// # Example
///
/// ```
/// use maklar_core::ValidationError;
///
/// let error = ValidationError::new("postnummer", "Ogiltigt postnummer", "invalid_postal_code");
/// let json = serde_json::to_value(&error).unwrap();
/// assert_eq!(json["field"], "postnummer");
/// assert!(json.get("params").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Path of the offending field.
    pub field: FieldPath,
    /// Resolved, human-readable message.
    pub message: String,
    /// Stable machine-readable code.
    pub code: String,
    /// Substitution parameters, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl ValidationError {
    /// Creates an entry without parameters.
    #[must_use]
    pub fn new(
        field: impl Into<FieldPath>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            params: None,
        }
    }

    /// Creates a whole-entity entry (`field == ""`).
    #[must_use]
    pub fn top_level(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(FieldPath::root(), message, code)
    }

    /// Attaches parameters. Empty maps are dropped.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = if params.is_empty() { None } else { Some(params) };
        self
    }

    /// Returns `true` if this entry addresses the entity as a whole.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.field.is_root()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_root() {
            write!(f, "{} ({})", self.message, self.code)
        } else {
            write!(f, "{}: {} ({})", self.field, self.message, self.code)
        }
    }
}
