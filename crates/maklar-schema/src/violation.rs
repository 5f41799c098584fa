//! Raw validation violations.
//!
//! A [`Violation`] is what a schema produces before any message is resolved.
//! It carries a stable code, a catalog key and the parameters the message
//! template needs.

use crate::rules::RuleKind;
use maklar_core::{ErrorCategory, FieldPath, ParamValue, Params};
use maklar_validators::Identifier;
use serde::{Deserialize, Serialize};

/// The kind of value a size bound applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    /// Character count of a string.
    String,
    /// Numeric value.
    Number,
    /// Element count of an array.
    Array,
}

impl Subject {
    const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field is missing, null or blank.
    Required,
    /// The value has the wrong JSON type.
    InvalidType,
    /// A numeric value must be a whole number.
    NotInteger,
    /// A lower bound was violated.
    TooSmall {
        /// What the bound applies to.
        subject: Subject,
    },
    /// An upper bound was violated.
    TooBig {
        /// What the bound applies to.
        subject: Subject,
    },
    /// A numeric value is not a multiple of the configured step.
    NotMultipleOf,
    /// The value is not one of the allowed options.
    InvalidEnum,
    /// Malformed e-mail address.
    InvalidEmail,
    /// Malformed UUID.
    InvalidUuid,
    /// Malformed URL.
    InvalidUrl,
    /// Unparseable date.
    InvalidDate,
    /// A national identifier failed its format or checksum check.
    Identifier {
        /// Which identifier.
        identifier: Identifier,
    },
    /// A strict schema received undeclared keys.
    UnrecognizedKeys,
    /// The field belongs to a different variant of a discriminated schema.
    NotApplicable,
    /// A cross-field rule failed.
    Rule {
        /// Which rule.
        rule: RuleKind,
    },
}

impl ViolationKind {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidType => "invalid_type",
            Self::NotInteger => "not_integer",
            Self::TooSmall { .. } => "too_small",
            Self::TooBig { .. } => "too_big",
            Self::NotMultipleOf => "not_multiple_of",
            Self::InvalidEnum => "invalid_enum_value",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidUrl => "invalid_url",
            Self::InvalidDate => "invalid_date",
            Self::Identifier { identifier } => identifier.code(),
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::NotApplicable => "not_applicable",
            Self::Rule { rule } => rule.code(),
        }
    }

    /// Error taxonomy bucket.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Required | Self::InvalidType | Self::NotApplicable => ErrorCategory::Structural,
            Self::NotInteger
            | Self::InvalidEnum
            | Self::InvalidEmail
            | Self::InvalidUuid
            | Self::InvalidUrl
            | Self::InvalidDate
            | Self::Identifier { .. } => ErrorCategory::Format,
            Self::TooSmall { .. } | Self::TooBig { .. } | Self::NotMultipleOf => {
                ErrorCategory::Range
            }
            Self::UnrecognizedKeys => ErrorCategory::UnknownField,
            Self::Rule { .. } => ErrorCategory::CrossField,
        }
    }

    /// Dot-path key of the message template in a catalog.
    #[must_use]
    pub fn message_key(&self) -> String {
        match self {
            Self::TooSmall { subject } => format!("validation.too_small.{}", subject.as_str()),
            Self::TooBig { subject } => format!("validation.too_big.{}", subject.as_str()),
            Self::Identifier { identifier } => identifier.message_key().to_string(),
            Self::Rule { rule } => rule.message_key().to_string(),
            other => format!("validation.{}", other.code()),
        }
    }
}

/// One violated constraint, before localization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Where the violation occurred.
    pub path: FieldPath,
    /// What went wrong.
    #[serde(flatten)]
    pub kind: ViolationKind,
    /// Template parameters (`min`, `max`, `expected`, `received`, ...).
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
}

impl Violation {
    /// Creates a violation without parameters.
    #[must_use]
    pub fn new(path: impl Into<FieldPath>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
            params: Params::new(),
        }
    }

    /// Adds one template parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Shorthand for [`ViolationKind::code`].
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_keys_depend_on_subject() {
        let kind = ViolationKind::TooSmall {
            subject: Subject::String,
        };
        assert_eq!(kind.message_key(), "validation.too_small.string");
        assert_eq!(kind.code(), "too_small");
        assert_eq!(kind.category(), ErrorCategory::Range);
    }

    #[test]
    fn test_identifier_keys() {
        let kind = ViolationKind::Identifier {
            identifier: Identifier::PostalCode,
        };
        assert_eq!(kind.code(), "invalid_postal_code");
        assert_eq!(kind.message_key(), "swedish.postnummer.invalid");
        assert_eq!(kind.category(), ErrorCategory::Format);
    }

    #[test]
    fn test_rule_category() {
        let kind = ViolationKind::Rule {
            rule: RuleKind::AreaRelation,
        };
        assert_eq!(kind.category(), ErrorCategory::CrossField);
        assert_eq!(kind.message_key(), "objekt.area.invalid_relation");
    }

    #[test]
    fn test_generic_keys() {
        assert_eq!(ViolationKind::Required.message_key(), "validation.required");
        assert_eq!(
            ViolationKind::UnrecognizedKeys.message_key(),
            "validation.unrecognized_keys"
        );
    }
}
