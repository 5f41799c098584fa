//! The field-level validation controller.
//!
//! One controller owns one form session. Events (`change`, `blur`,
//! `submit`, `reset`) are applied sequentially through `&mut self`.

use crate::state::{
    Dirtiness, FieldProps, FieldStatus, FieldValidationState, Submission, Touch, ValidationMode,
    ValidationState,
};
use maklar_core::ValidationError;
use maklar_messages::{ErrorFormatter, SUBMIT_FAILED_KEY};
use maklar_schema::{Draft, EntitySchema};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Code of the top-level error reported when the submit handler fails.
pub const SUBMIT_FAILED_CODE: &str = "submit_failed";

/// How a submit ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The draft was valid and the handler succeeded.
    Submitted,
    /// The draft failed validation; the handler was not called.
    Invalid(Vec<ValidationError>),
    /// The handler returned an error.
    Failed,
}

impl SubmitOutcome {
    /// Returns `true` for [`SubmitOutcome::Submitted`].
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// Returns the submit flag to idle when dropped, including on unwind.
struct IdleOnDrop<'a>(&'a mut Submission);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = Submission::Idle;
    }
}

/// Per-session form state machine.
pub struct FormController {
    schema: Arc<dyn EntitySchema>,
    formatter: ErrorFormatter,
    mode: ValidationMode,
    defaults: Draft,
    draft: Draft,
    dirtiness: Dirtiness,
    touch: Touch,
    submission: Submission,
    is_valid: bool,
    errors: Vec<ValidationError>,
    fields: BTreeMap<String, FieldValidationState>,
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("schema", &self.schema.name())
            .field("mode", &self.mode)
            .field("draft", &self.draft)
            .field("dirtiness", &self.dirtiness)
            .field("touch", &self.touch)
            .field("submission", &self.submission)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

impl FormController {
    /// Creates a pristine, untouched, idle controller.
    pub fn new(schema: Arc<dyn EntitySchema>, formatter: ErrorFormatter) -> Self {
        Self {
            schema,
            formatter,
            mode: ValidationMode::default(),
            defaults: Draft::new(),
            draft: Draft::new(),
            dirtiness: Dirtiness::Pristine,
            touch: Touch::Untouched,
            submission: Submission::Idle,
            is_valid: true,
            errors: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Sets the validation mode.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the initial values, also used by [`reset`](Self::reset).
    pub fn with_defaults(mut self, defaults: Draft) -> Self {
        self.draft = defaults.clone();
        self.defaults = defaults;
        self
    }

    /// Validation mode.
    pub const fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Current draft.
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Current value of a field.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.draft.get(name)
    }

    /// Form dirtiness.
    pub const fn dirtiness(&self) -> Dirtiness {
        self.dirtiness
    }

    /// Form touch state.
    pub const fn touch(&self) -> Touch {
        self.touch
    }

    /// Submit state.
    pub const fn submission(&self) -> Submission {
        self.submission
    }

    /// Snapshot of the form state.
    pub fn state(&self) -> ValidationState {
        ValidationState {
            is_valid: self.is_valid,
            errors: self.errors.clone(),
            is_dirty: self.dirtiness == Dirtiness::Dirty,
            is_touched: self.touch == Touch::Touched,
            is_submitting: self.submission == Submission::Submitting,
        }
    }

    /// State of one field; unvalidated if never changed or checked.
    pub fn field_state(&self, name: &str) -> FieldValidationState {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Whether the field applies to the current draft.
    pub fn should_show(&self, name: &str) -> bool {
        self.schema.is_relevant(&self.draft, name)
    }

    /// Whether the field must be filled in for the current draft.
    pub fn is_required(&self, name: &str) -> bool {
        self.schema.is_required(&self.draft, name)
    }

    /// Applies a value change.
    ///
    /// Changing the discriminant removes the fields that no longer apply.
    pub fn change(&mut self, name: &str, value: Value) {
        let previous = self.draft.insert(name.to_string(), value);

        if self.schema.discriminant() == Some(name) && previous.as_ref() != self.draft.get(name) {
            self.clear_irrelevant_fields();
        }

        self.dirtiness = Dirtiness::Dirty;
        self.touch = Touch::Touched;

        let status = if self.mode.validates_on_change() {
            Some(self.check_field(name))
        } else {
            None
        };
        let field = self.fields.entry(name.to_string()).or_default();
        field.is_dirty = true;
        field.is_touched = true;
        if let Some(status) = status {
            field.status = status;
        }
    }

    /// Marks a field as touched, validating it in blur modes.
    pub fn blur(&mut self, name: &str) {
        self.touch = Touch::Touched;
        let status = self
            .mode
            .validates_on_blur()
            .then(|| self.check_field(name));
        let field = self.fields.entry(name.to_string()).or_default();
        field.is_touched = true;
        if let Some(status) = status {
            field.status = status;
        }
    }

    fn clear_irrelevant_fields(&mut self) {
        for name in self.schema.irrelevant_fields(&self.draft) {
            if self.draft.remove(&name).is_some() {
                tracing::debug!(field = %name, schema = self.schema.name(), "cleared irrelevant field");
            }
            self.fields.remove(&name);
        }
    }

    fn check_field(&self, name: &str) -> FieldStatus {
        match self.schema.validate_field(&self.draft, name) {
            Ok(()) => FieldStatus::Valid,
            Err(violation) => {
                let message = self
                    .formatter
                    .format_sync(std::slice::from_ref(&violation))
                    .into_iter()
                    .next()
                    .map_or_else(|| violation.code().to_string(), |error| error.message);
                FieldStatus::Invalid(message)
            }
        }
    }

    /// Runs whole-entity validation and records the result.
    ///
    /// Returns the normalized draft on success.
    pub fn validate(&mut self) -> Result<Draft, Vec<ValidationError>> {
        match self.schema.validate(&self.draft) {
            Ok(normalized) => {
                self.is_valid = true;
                self.errors.clear();
                self.mark_all_valid();
                Ok(normalized)
            }
            Err(violations) => {
                let errors = self.formatter.format_sync(&violations);
                self.record_errors(&errors);
                Err(errors)
            }
        }
    }

    fn mark_all_valid(&mut self) {
        for name in self.draft.keys() {
            self.fields.entry(name.clone()).or_default();
        }
        for field in self.fields.values_mut() {
            field.status = FieldStatus::Valid;
        }
    }

    fn record_errors(&mut self, errors: &[ValidationError]) {
        self.is_valid = false;
        self.errors = errors.to_vec();

        let mut first: BTreeMap<&str, &str> = BTreeMap::new();
        for error in errors.iter().filter(|e| !e.is_top_level()) {
            first.entry(error.field.as_str()).or_insert(&error.message);
        }
        let names: Vec<String> = self
            .draft
            .keys()
            .map(String::as_str)
            .chain(first.keys().copied())
            .map(str::to_string)
            .collect();
        for name in names {
            let status = first
                .get(name.as_str())
                .map_or(FieldStatus::Valid, |message| FieldStatus::Invalid((*message).to_string()));
            self.fields.insert(
                name,
                FieldValidationState {
                    status,
                    is_dirty: true,
                    is_touched: true,
                },
            );
        }
    }

    /// Validates the whole draft and, if valid, runs `handler` with the
    /// normalized draft and the current state.
    ///
    /// The submitting flag is cleared however the submit ends. A handler
    /// error becomes one top-level `submit_failed` error, separate from
    /// schema errors.
    pub async fn submit<F, Fut>(&mut self, handler: F) -> SubmitOutcome
    where
        F: FnOnce(Draft, ValidationState) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let normalized = match self.validate() {
            Ok(normalized) => normalized,
            Err(errors) => {
                self.submission = Submission::Idle;
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.submission = Submission::Submitting;
        let state = self.state();
        let result = {
            let _idle = IdleOnDrop(&mut self.submission);
            handler(normalized, state).await
        };

        match result {
            Ok(()) => {
                self.is_valid = true;
                self.errors.clear();
                SubmitOutcome::Submitted
            }
            Err(e) => {
                tracing::warn!(schema = self.schema.name(), error = %e, "submit handler failed");
                self.is_valid = false;
                self.errors = vec![self
                    .formatter
                    .top_level_sync(SUBMIT_FAILED_CODE, SUBMIT_FAILED_KEY)];
                SubmitOutcome::Failed
            }
        }
    }

    /// Restores the defaults (or `values`) and clears all state.
    pub fn reset(&mut self, values: Option<Draft>) {
        if let Some(values) = values {
            self.defaults = values;
        }
        self.draft = self.defaults.clone();
        self.dirtiness = Dirtiness::Pristine;
        self.touch = Touch::Untouched;
        self.submission = Submission::Idle;
        self.is_valid = true;
        self.errors.clear();
        self.fields.clear();
    }

    /// Everything a UI needs to render one input.
    pub fn field_props(&self, name: &str) -> FieldProps {
        let value = match self.draft.get(name) {
            None | Some(Value::Null) => Value::String(String::new()),
            Some(value) => value.clone(),
        };
        let state = self.fields.get(name);
        let error = state.and_then(|s| s.status.error()).map(str::to_string);
        FieldProps {
            name: name.to_string(),
            value,
            aria_invalid: error.is_some(),
            aria_describedby: error.as_ref().map(|_| format!("{name}-error")),
            error,
        }
    }
}
