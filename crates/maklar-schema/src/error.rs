//! Schema construction errors.

use thiserror::Error;

/// Errors raised while building schemas or loading rule policy.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A refinement policy value is out of range or inconsistent.
    #[error("invalid refinement policy: {field}: {message}")]
    InvalidPolicy {
        /// Offending policy field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A discriminated schema was built without variants.
    #[error("discriminated schema '{schema}' has no variants")]
    NoVariants {
        /// Schema name.
        schema: String,
    },
}

impl SchemaError {
    /// Creates an invalid-policy error.
    pub fn invalid_policy(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPolicy {
            field: field.into(),
            message: message.into(),
        }
    }
}
