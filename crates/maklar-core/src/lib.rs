//! # Maklar Core
//!
//! Core types shared by every stage of the Maklar validation pipeline.
//!
//! This crate provides the foundational types used throughout Maklar:
//!
//! - [`RequestId`] - UUID v7 correlation identifier
//! - [`FieldPath`] - dot/bracket path addressing a field inside an entity draft
//! - [`ValidationError`] - one field-addressable, localized error entry
//! - [`ErrorCategory`] - the error taxonomy (structural, format, range, ...)
//! - [`AppError`] - request-level error with its HTTP envelope

#![doc(html_root_url = "https://docs.rs/maklar-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod path;
mod validation;

pub use context::RequestId;
pub use error::{
    AppError, AppResult, ErrorBody, ErrorCategory, ErrorEnvelope, INTERNAL_ERROR_MESSAGE,
    VALIDATION_ERROR_MESSAGE,
};
pub use path::FieldPath;
pub use validation::{ParamValue, Params, ValidationError};
