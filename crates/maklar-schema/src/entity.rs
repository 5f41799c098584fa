//! The interface form controllers and request stages validate through.

use crate::compose::{Draft, Schema, UnknownFields};
use crate::field::FieldSpec;
use crate::violation::Violation;

/// A schema that can validate whole drafts and single fields of a draft.
///
/// Implemented by plain [`Schema`]s and by
/// [`DiscriminatedSchema`](crate::DiscriminatedSchema)s, whose answers depend
/// on the draft's discriminant.
pub trait EntitySchema: Send + Sync {
    /// Schema name, used in logs.
    fn name(&self) -> &str;

    /// Validates a whole draft, returning the normalized draft or every violation.
    fn validate(&self, draft: &Draft) -> Result<Draft, Vec<Violation>>;

    /// Validates the current value of one field in `draft`.
    fn validate_field(&self, draft: &Draft, name: &str) -> Result<(), Violation>;

    /// Returns `true` if `name` applies to this draft.
    fn is_relevant(&self, draft: &Draft, name: &str) -> bool;

    /// Returns `true` if `name` must be filled in for this draft.
    fn is_required(&self, draft: &Draft, name: &str) -> bool;

    /// The field that selects a variant, if any.
    fn discriminant(&self) -> Option<&str> {
        None
    }

    /// Fields present in some variant but not applicable to this draft.
    fn irrelevant_fields(&self, _draft: &Draft) -> Vec<String> {
        Vec::new()
    }
}

impl EntitySchema for Schema {
    fn name(&self) -> &str {
        Schema::name(self)
    }

    fn validate(&self, draft: &Draft) -> Result<Draft, Vec<Violation>> {
        Schema::validate(self, draft)
    }

    fn validate_field(&self, draft: &Draft, name: &str) -> Result<(), Violation> {
        Schema::validate_field(self, name, draft.get(name)).map(|_| ())
    }

    fn is_relevant(&self, _draft: &Draft, name: &str) -> bool {
        self.contains(name) || self.unknown_fields() == UnknownFields::Allow
    }

    fn is_required(&self, _draft: &Draft, name: &str) -> bool {
        self.field(name).is_some_and(FieldSpec::is_required)
    }
}
