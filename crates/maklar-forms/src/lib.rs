//! # Maklar Forms
//!
//! Field-level validation for interactive forms.
//!
//! A [`FormController`] owns one form session and tracks
//! `{pristine|dirty} x {untouched|touched} x {idle|submitting}` plus a
//! [`FieldValidationState`] per field. When fields are checked depends on the
//! [`ValidationMode`]; submit always runs whole-entity validation.
//!
//! ```
//! use maklar_forms::{entities, ValidationMode};
//! use maklar_messages::ErrorFormatter;
//! use serde_json::json;
//!
//! let mut form = entities::contact_create(ErrorFormatter::default())
//!     .unwrap()
//!     .with_mode(ValidationMode::OnChange);
//!
//! form.change("typ", json!("privatperson"));
//! form.change("personnummer", json!("811218-9875"));
//!
//! let props = form.field_props("personnummer");
//! assert!(props.aria_invalid);
//! assert_eq!(props.aria_describedby.as_deref(), Some("personnummer-error"));
//! assert!(!form.should_show("organisationsnummer"));
//! ```

#![doc(html_root_url = "https://docs.rs/maklar-forms/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod controller;
pub mod entities;
mod state;

pub use controller::{FormController, SubmitOutcome, SUBMIT_FAILED_CODE};
pub use state::{
    Dirtiness, FieldProps, FieldStatus, FieldValidationState, Submission, Touch, ValidationMode,
    ValidationState,
};
