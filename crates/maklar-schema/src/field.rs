//! Field primitives.
//!
//! Each [`FieldKind`] checks exactly one concern and normalizes the value it
//! accepts (trimmed text, lower-cased e-mail, canonical postal code, ...).
//! A [`FieldSpec`] wraps a kind with presence rules.

use crate::violation::{Subject, Violation, ViolationKind};
use maklar_core::{FieldPath, ParamValue};
use maklar_validators::Identifier;
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;
use uuid::Uuid;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
    })
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid regex"))
}

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// The primitive checks a field can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text, trimmed, with optional character bounds.
    Text {
        /// Minimum character count after trimming.
        min_len: Option<usize>,
        /// Maximum character count after trimming.
        max_len: Option<usize>,
    },
    /// E-mail address, lower-cased.
    Email,
    /// UUID in any textual form, normalized to hyphenated lower case.
    Uuid,
    /// `http`/`https` URL.
    Url,
    /// Number with optional bounds.
    Number {
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
        /// Whole numbers only.
        integer: bool,
        /// Value must be a multiple of this step.
        step: Option<f64>,
    },
    /// Boolean.
    Boolean,
    /// One of a fixed set of strings.
    Enumeration(Vec<String>),
    /// Calendar date (`YYYY-MM-DD`) or RFC 3339 timestamp.
    Date,
    /// National identifier with checksum/format rules.
    Identifier(Identifier),
}

impl FieldKind {
    /// Unbounded text.
    #[must_use]
    pub const fn text() -> Self {
        Self::Text {
            min_len: None,
            max_len: None,
        }
    }

    /// Text with a maximum length.
    #[must_use]
    pub const fn text_max(max_len: usize) -> Self {
        Self::Text {
            min_len: None,
            max_len: Some(max_len),
        }
    }

    /// Number within `min..=max`.
    #[must_use]
    pub const fn number(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: Some(max),
            integer: false,
            step: None,
        }
    }

    /// Whole number within `min..=max`.
    #[must_use]
    pub const fn integer(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(min),
            max: Some(max),
            integer: true,
            step: None,
        }
    }

    /// Unbounded number.
    #[must_use]
    pub const fn any_number() -> Self {
        Self::Number {
            min: None,
            max: None,
            integer: false,
            step: None,
        }
    }

    /// Enumeration from string literals.
    #[must_use]
    pub fn one_of(options: &[&str]) -> Self {
        Self::Enumeration(options.iter().map(|o| (*o).to_string()).collect())
    }

    /// Name of the JSON type this kind expects, used in `invalid_type` params.
    #[must_use]
    pub const fn expected_type(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            _ => "string",
        }
    }

    /// Checks and normalizes a present, non-null value.
    ///
    /// When `coerce` is set, numeric and boolean kinds also accept their
    /// string renderings (query strings, route params, filter inputs).
    pub fn check(&self, path: &FieldPath, value: &Value, coerce: bool) -> Result<Value, Violation> {
        match self {
            Self::Number {
                min,
                max,
                integer,
                step,
            } => check_number(path, value, coerce, *min, *max, *integer, *step),
            Self::Boolean => check_boolean(path, value, coerce),
            _ => {
                let Value::String(raw) = value else {
                    return Err(invalid_type(path, self.expected_type(), value));
                };
                self.check_text(path, raw.trim())
            }
        }
    }

    fn check_text(&self, path: &FieldPath, text: &str) -> Result<Value, Violation> {
        let fail = |kind| Err(Violation::new(path.clone(), kind));
        match self {
            Self::Text { min_len, max_len } => {
                let len = text.chars().count();
                if let Some(min) = min_len.filter(|min| len < *min) {
                    return Err(Violation::new(
                        path.clone(),
                        ViolationKind::TooSmall {
                            subject: Subject::String,
                        },
                    )
                    .with_param("min", min as i64));
                }
                if let Some(max) = max_len.filter(|max| len > *max) {
                    return Err(Violation::new(
                        path.clone(),
                        ViolationKind::TooBig {
                            subject: Subject::String,
                        },
                    )
                    .with_param("max", max as i64));
                }
                Ok(Value::String(text.to_string()))
            }
            Self::Email => {
                if email_pattern().is_match(text) {
                    Ok(Value::String(text.to_lowercase()))
                } else {
                    fail(ViolationKind::InvalidEmail)
                }
            }
            Self::Uuid => match Uuid::parse_str(text) {
                Ok(uuid) => Ok(Value::String(uuid.hyphenated().to_string())),
                Err(_) => fail(ViolationKind::InvalidUuid),
            },
            Self::Url => {
                if url_pattern().is_match(text) {
                    Ok(Value::String(text.to_string()))
                } else {
                    fail(ViolationKind::InvalidUrl)
                }
            }
            Self::Enumeration(options) => {
                if options.iter().any(|option| option == text) {
                    Ok(Value::String(text.to_string()))
                } else {
                    Err(Violation::new(path.clone(), ViolationKind::InvalidEnum)
                        .with_param("options", ParamValue::List(options.clone()))
                        .with_param("received", text))
                }
            }
            Self::Date => {
                let valid = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
                    || chrono::DateTime::parse_from_rfc3339(text).is_ok();
                if valid {
                    Ok(Value::String(text.to_string()))
                } else {
                    fail(ViolationKind::InvalidDate)
                }
            }
            Self::Identifier(identifier) => {
                if identifier.is_valid(text) {
                    Ok(Value::String(identifier.format(text)))
                } else {
                    fail(ViolationKind::Identifier {
                        identifier: *identifier,
                    })
                }
            }
            Self::Number { .. } | Self::Boolean => {
                self.check(path, &Value::String(text.to_string()), true)
            }
        }
    }
}

fn check_number(
    path: &FieldPath,
    value: &Value,
    coerce: bool,
    min: Option<f64>,
    max: Option<f64>,
    integer: bool,
    step: Option<f64>,
) -> Result<Value, Violation> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if coerce => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    };
    let Some(number) = number else {
        return Err(invalid_type(path, "number", value));
    };

    let range = |kind| Violation::new(path.clone(), kind);
    if integer && number.fract() != 0.0 {
        return Err(range(ViolationKind::NotInteger));
    }
    if let Some(min) = min.filter(|min| number < *min) {
        return Err(range(ViolationKind::TooSmall {
            subject: Subject::Number,
        })
        .with_param("min", number_param(min)));
    }
    if let Some(max) = max.filter(|max| number > *max) {
        return Err(range(ViolationKind::TooBig {
            subject: Subject::Number,
        })
        .with_param("max", number_param(max)));
    }
    if let Some(step) = step.filter(|step| *step > 0.0) {
        let ratio = number / step;
        if (ratio - ratio.round()).abs() > 1e-9 {
            return Err(range(ViolationKind::NotMultipleOf).with_param("multipleOf", number_param(step)));
        }
    }
    Ok(number_value(number))
}

fn check_boolean(path: &FieldPath, value: &Value, coerce: bool) -> Result<Value, Violation> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) if coerce => match s.trim() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid_type(path, "boolean", value)),
        },
        _ => Err(invalid_type(path, "boolean", value)),
    }
}

fn invalid_type(path: &FieldPath, expected: &'static str, value: &Value) -> Violation {
    Violation::new(path.clone(), ViolationKind::InvalidType)
        .with_param("expected", expected)
        .with_param("received", json_type_name(value))
}

/// Renders whole numbers as integers so bounds read `1800`, not `1800.0`.
pub(crate) fn number_param(value: f64) -> ParamValue {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        ParamValue::Integer(value as i64)
    } else {
        ParamValue::Number(value)
    }
}

/// Emits whole numbers as JSON integers.
pub(crate) fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// JSON type name of a value (`string`, `number`, `object`, ...).
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns `true` for values treated as "not provided": `null` and blank strings.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// A named field with its primitive and presence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
    default: Option<Value>,
}

impl FieldSpec {
    /// Creates an optional field.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
        }
    }

    /// Creates a required field.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            required: true,
            ..Self::optional(name, kind)
        }
    }

    /// Sets the value used when the field is absent.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Makes the field optional and drops its default.
    #[must_use]
    pub fn relaxed(mut self) -> Self {
        self.required = false;
        self.default = None;
        self
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field primitive.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field must be present.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Default used when absent.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Validates one field value.
    ///
    /// Returns `Ok(None)` when the field is absent and optional, `Ok(Some(_))`
    /// with the normalized value otherwise. Blank optional values normalize to
    /// `null`.
    pub fn check(&self, value: Option<&Value>, coerce: bool) -> Result<Option<Value>, Violation> {
        let path = FieldPath::field(self.name.clone());
        match value {
            None => {
                if let Some(default) = &self.default {
                    Ok(Some(default.clone()))
                } else if self.required {
                    Err(Violation::new(path, ViolationKind::Required))
                } else {
                    Ok(None)
                }
            }
            Some(value) if is_blank(value) => {
                if self.required {
                    Err(Violation::new(path, ViolationKind::Required))
                } else {
                    Ok(Some(Value::Null))
                }
            }
            Some(value) => self.kind.check(&path, value, coerce).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> FieldPath {
        FieldPath::field("f")
    }

    #[test]
    fn test_text_is_trimmed_and_bounded() {
        let kind = FieldKind::Text {
            min_len: Some(2),
            max_len: Some(4),
        };
        assert_eq!(kind.check(&path(), &json!("  ab "), false).unwrap(), json!("ab"));

        let err = kind.check(&path(), &json!("a"), false).unwrap_err();
        assert_eq!(err.code(), "too_small");
        assert_eq!(err.params["min"], ParamValue::Integer(2));

        let err = kind.check(&path(), &json!("abcde"), false).unwrap_err();
        assert_eq!(err.code(), "too_big");
    }

    #[test]
    fn test_email_is_lowercased() {
        let value = FieldKind::Email
            .check(&path(), &json!("Anna@Example.SE"), false)
            .unwrap();
        assert_eq!(value, json!("anna@example.se"));
        assert!(FieldKind::Email.check(&path(), &json!("anna@"), false).is_err());
    }

    #[test]
    fn test_number_bounds_and_type() {
        let kind = FieldKind::integer(1800.0, 2030.0);
        assert_eq!(kind.check(&path(), &json!(1999), false).unwrap(), json!(1999));

        let err = kind.check(&path(), &json!(1700), false).unwrap_err();
        assert_eq!(err.code(), "too_small");
        assert_eq!(err.params["min"], ParamValue::Integer(1800));

        assert_eq!(kind.check(&path(), &json!(1999.5), false).unwrap_err().code(), "not_integer");

        let err = kind.check(&path(), &json!("1999"), false).unwrap_err();
        assert_eq!(err.code(), "invalid_type");
        assert_eq!(err.params["expected"], ParamValue::from("number"));
        assert_eq!(err.params["received"], ParamValue::from("string"));
    }

    #[test]
    fn test_number_coercion() {
        let kind = FieldKind::any_number();
        assert_eq!(kind.check(&path(), &json!(" 42 "), true).unwrap(), json!(42));
        assert_eq!(kind.check(&path(), &json!("2.5"), true).unwrap(), json!(2.5));
        assert!(kind.check(&path(), &json!("abc"), true).is_err());
        assert!(kind.check(&path(), &json!("NaN"), true).is_err());
    }

    #[test]
    fn test_step() {
        let kind = FieldKind::Number {
            min: Some(0.5),
            max: Some(50.0),
            integer: false,
            step: Some(0.5),
        };
        assert!(kind.check(&path(), &json!(2.5), false).is_ok());
        assert_eq!(kind.check(&path(), &json!(2.3), false).unwrap_err().code(), "not_multiple_of");
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(FieldKind::Boolean.check(&path(), &json!("true"), true).unwrap(), json!(true));
        assert!(FieldKind::Boolean.check(&path(), &json!("true"), false).is_err());
    }

    #[test]
    fn test_enumeration_params() {
        let kind = FieldKind::one_of(&["villa", "tomt"]);
        let err = kind.check(&path(), &json!("slott"), false).unwrap_err();
        assert_eq!(err.code(), "invalid_enum_value");
        assert_eq!(
            err.params["options"],
            ParamValue::List(vec!["villa".into(), "tomt".into()])
        );
    }

    #[test]
    fn test_identifier_is_canonicalized() {
        let kind = FieldKind::Identifier(Identifier::PostalCode);
        assert_eq!(kind.check(&path(), &json!("11122"), false).unwrap(), json!("111 22"));
        assert_eq!(
            kind.check(&path(), &json!("09999"), false).unwrap_err().code(),
            "invalid_postal_code"
        );
    }

    #[test]
    fn test_uuid_and_date() {
        let id = "0190F7C2-1D2B-7C4E-9F00-1234567890AB";
        let value = FieldKind::Uuid.check(&path(), &json!(id), false).unwrap();
        assert_eq!(value, json!(id.to_lowercase()));

        assert!(FieldKind::Date.check(&path(), &json!("2024-02-29"), false).is_ok());
        assert!(FieldKind::Date.check(&path(), &json!("2023-02-29"), false).is_err());
    }

    #[test]
    fn test_spec_presence() {
        let required = FieldSpec::required("adress", FieldKind::text());
        assert_eq!(required.check(None, false).unwrap_err().code(), "required");
        assert_eq!(required.check(Some(&json!("  ")), false).unwrap_err().code(), "required");

        let optional = FieldSpec::optional("ort", FieldKind::text());
        assert_eq!(optional.check(None, false).unwrap(), None);
        assert_eq!(optional.check(Some(&json!("")), false).unwrap(), Some(Value::Null));

        let defaulted = FieldSpec::optional("kategori", FieldKind::one_of(&["ovrig"]))
            .with_default("ovrig");
        assert_eq!(defaulted.check(None, false).unwrap(), Some(json!("ovrig")));
    }
}
