//! Schema composition.
//!
//! Schemas are assembled from reusable [`Section`]s. Sections are merged in
//! the order they are added; when two sections declare the same field, the
//! later declaration wins and keeps the position of the first one.
//!
//! The merged fields form the schema's per-field registry, so validating a
//! single field is a map lookup.
//!
//! # Example
//!
//! ```
//! use maklar_schema::{FieldKind, FieldSpec, SchemaBuilder, SchemaVariant, Section};
//! use serde_json::json;
//!
//! let address = Section::new("address")
//!     .field(FieldSpec::required("adress", FieldKind::text()))
//!     .field(FieldSpec::optional("ort", FieldKind::text()));
//!
//! let schema = SchemaBuilder::new("example", SchemaVariant::Create)
//!     .section(address)
//!     .build();
//!
//! let draft = json!({"adress": "  Storgatan 1 "}).as_object().cloned().unwrap();
//! let normalized = schema.validate(&draft).unwrap();
//! assert_eq!(normalized["adress"], "Storgatan 1");
//! ```

use crate::field::FieldSpec;
use crate::rules::Refinement;
use crate::violation::{Violation, ViolationKind};
use indexmap::IndexMap;
use maklar_core::{FieldPath, ParamValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A partial, possibly incomplete entity.
pub type Draft = Map<String, Value>;

/// Which flavor of schema to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// Declared-required fields are mandatory; defaults are applied.
    Create,
    /// Every field is optional; no defaults.
    Update,
    /// Loose search input: optional fields, unknown keys stripped, strings coerced.
    Filter,
}

/// What to do with keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFields {
    /// Report an `unrecognized_keys` violation.
    Reject,
    /// Drop them from the output.
    Strip,
    /// Copy them to the output unchecked.
    Allow,
}

/// A named, reusable group of fields.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    fields: IndexMap<String, FieldSpec>,
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.insert(spec.name().to_string(), spec);
        self
    }

    /// Section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    variant: SchemaVariant,
    sections: Vec<Section>,
    unknown_fields: Option<UnknownFields>,
    coerce_strings: Option<bool>,
    refinements: Vec<Arc<dyn Refinement>>,
}

impl SchemaBuilder {
    /// Starts a schema of the given variant.
    #[must_use]
    pub fn new(name: impl Into<String>, variant: SchemaVariant) -> Self {
        Self {
            name: name.into(),
            variant,
            sections: Vec::new(),
            unknown_fields: None,
            coerce_strings: None,
            refinements: Vec::new(),
        }
    }

    /// Appends a section. On a field-name collision the later section wins.
    #[must_use]
    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Overrides the unknown-field policy (default: strip).
    #[must_use]
    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = Some(policy);
        self
    }

    /// Overrides string coercion (default: on for filters only).
    #[must_use]
    pub fn coerce_strings(mut self, coerce: bool) -> Self {
        self.coerce_strings = Some(coerce);
        self
    }

    /// Adds a cross-field rule.
    #[must_use]
    pub fn refine(mut self, refinement: impl Refinement + 'static) -> Self {
        self.refinements.push(Arc::new(refinement));
        self
    }

    /// Merges the sections into the field registry.
    #[must_use]
    pub fn build(self) -> Schema {
        let mut registry: IndexMap<String, FieldSpec> = IndexMap::new();
        for section in self.sections {
            for (name, spec) in section.fields {
                let spec = match self.variant {
                    SchemaVariant::Create => spec,
                    SchemaVariant::Update | SchemaVariant::Filter => spec.relaxed(),
                };
                if registry.insert(name.clone(), spec).is_some() {
                    tracing::debug!(
                        schema = %self.name,
                        field = %name,
                        section = %section.name,
                        "later section overrides field"
                    );
                }
            }
        }

        Schema {
            name: self.name,
            variant: self.variant,
            registry,
            unknown_fields: self.unknown_fields.unwrap_or(UnknownFields::Strip),
            coerce_strings: self
                .coerce_strings
                .unwrap_or(self.variant == SchemaVariant::Filter),
            refinements: self.refinements,
        }
    }
}

/// A composed entity schema.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    variant: SchemaVariant,
    registry: IndexMap<String, FieldSpec>,
    unknown_fields: UnknownFields,
    coerce_strings: bool,
    refinements: Vec<Arc<dyn Refinement>>,
}

impl Schema {
    /// Schema name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema variant.
    #[must_use]
    pub const fn variant(&self) -> SchemaVariant {
        self.variant
    }

    /// Unknown-field policy.
    #[must_use]
    pub const fn unknown_fields(&self) -> UnknownFields {
        self.unknown_fields
    }

    /// Looks up a field in the registry.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.registry.get(name)
    }

    /// Returns `true` if the schema declares `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Declared fields in registry order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.registry.values()
    }

    /// Returns `true` if `name` is declared and required.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.field(name).is_some_and(FieldSpec::is_required)
    }

    /// Validates one field through the registry.
    ///
    /// Undeclared names are accepted unchanged unless the schema rejects
    /// unknown keys.
    pub fn validate_field(&self, name: &str, value: Option<&Value>) -> Result<Option<Value>, Violation> {
        match self.field(name) {
            Some(spec) => spec.check(value, self.coerce_strings),
            None if self.unknown_fields == UnknownFields::Reject => {
                Err(unrecognized(vec![name.to_string()]))
            }
            None => Ok(value.cloned()),
        }
    }

    /// Validates a whole draft.
    ///
    /// Every field violation is collected. Cross-field rules run only when all
    /// field checks pass, and then all of them run.
    pub fn validate(&self, draft: &Draft) -> Result<Draft, Vec<Violation>> {
        let mut output = Draft::new();
        let mut violations = Vec::new();

        for (name, spec) in &self.registry {
            match spec.check(draft.get(name), self.coerce_strings) {
                Ok(Some(value)) => {
                    output.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(violation) => violations.push(violation),
            }
        }

        let unknown: Vec<String> = draft
            .keys()
            .filter(|key| !self.registry.contains_key(*key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            match self.unknown_fields {
                UnknownFields::Reject => violations.push(unrecognized(unknown)),
                UnknownFields::Strip => {
                    tracing::trace!(schema = %self.name, keys = ?unknown, "stripping unknown keys");
                }
                UnknownFields::Allow => {
                    for key in unknown {
                        if let Some(value) = draft.get(&key) {
                            output.insert(key, value.clone());
                        }
                    }
                }
            }
        }

        if violations.is_empty() {
            violations.extend(self.refinements.iter().filter_map(|rule| rule.check(&output)));
        }

        if violations.is_empty() {
            Ok(output)
        } else {
            tracing::trace!(schema = %self.name, count = violations.len(), "draft rejected");
            Err(violations)
        }
    }
}

fn unrecognized(keys: Vec<String>) -> Violation {
    Violation::new(FieldPath::root(), ViolationKind::UnrecognizedKeys)
        .with_param("keys", ParamValue::List(keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use crate::rules::AreaRelation;
    use serde_json::json;

    fn draft(value: Value) -> Draft {
        value.as_object().cloned().unwrap()
    }

    fn sections() -> (Section, Section) {
        let first = Section::new("first")
            .field(FieldSpec::required("name", FieldKind::text()))
            .field(FieldSpec::optional("size", FieldKind::number(0.0, 10.0)));
        let second = Section::new("second")
            .field(FieldSpec::optional("size", FieldKind::number(0.0, 100.0)))
            .field(FieldSpec::optional("kind", FieldKind::one_of(&["a", "b"])).with_default("a"));
        (first, second)
    }

    #[test]
    fn test_later_section_wins() {
        let (first, second) = sections();
        let schema = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(first)
            .section(second)
            .build();

        let names: Vec<&str> = schema.fields().map(FieldSpec::name).collect();
        assert_eq!(names, vec!["name", "size", "kind"]);
        assert!(schema.validate(&draft(json!({"name": "x", "size": 50}))).is_ok());
    }

    #[test]
    fn test_collects_every_field_violation() {
        let (first, second) = sections();
        let schema = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(first)
            .section(second)
            .build();

        let violations = schema
            .validate(&draft(json!({"size": 500, "kind": "z"})))
            .unwrap_err();
        let codes: Vec<&str> = violations.iter().map(Violation::code).collect();
        assert_eq!(codes, vec!["required", "too_big", "invalid_enum_value"]);
    }

    #[test]
    fn test_create_applies_defaults_update_does_not() {
        let (first, second) = sections();
        let create = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(first.clone())
            .section(second.clone())
            .build();
        let update = SchemaBuilder::new("t", SchemaVariant::Update)
            .section(first)
            .section(second)
            .build();

        let created = create.validate(&draft(json!({"name": "x"}))).unwrap();
        assert_eq!(created["kind"], "a");

        let updated = update.validate(&draft(json!({}))).unwrap();
        assert!(updated.is_empty());
    }

    #[test]
    fn test_unknown_field_policies() {
        let (first, _) = sections();
        let input = draft(json!({"name": "x", "extra": 1}));

        let strict = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(first.clone())
            .unknown_fields(UnknownFields::Reject)
            .build();
        let violations = strict.validate(&input).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].path.is_root());
        assert_eq!(
            violations[0].params["keys"],
            ParamValue::List(vec!["extra".to_string()])
        );

        let strip = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(first.clone())
            .build();
        assert!(!strip.validate(&input).unwrap().contains_key("extra"));

        let allow = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(first)
            .unknown_fields(UnknownFields::Allow)
            .build();
        assert_eq!(allow.validate(&input).unwrap()["extra"], 1);
    }

    #[test]
    fn test_filter_coerces_strings() {
        let (first, _) = sections();
        let filter = SchemaBuilder::new("t", SchemaVariant::Filter)
            .section(first)
            .build();
        let output = filter.validate(&draft(json!({"size": "7"}))).unwrap();
        assert_eq!(output["size"], 7);
    }

    #[test]
    fn test_refinements_wait_for_field_checks() {
        let section = Section::new("areas")
            .field(FieldSpec::optional("boarea", FieldKind::number(0.0, 1000.0)))
            .field(FieldSpec::optional("biarea", FieldKind::number(0.0, 1000.0)))
            .field(FieldSpec::optional("rum", FieldKind::number(1.0, 10.0)));
        let schema = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(section)
            .refine(AreaRelation)
            .build();

        let violations = schema
            .validate(&draft(json!({"boarea": 10, "biarea": 20, "rum": 99})))
            .unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code(), "too_big");

        let violations = schema
            .validate(&draft(json!({"boarea": 10, "biarea": 20})))
            .unwrap_err();
        assert_eq!(violations[0].code(), "area_relation");
    }

    #[test]
    fn test_validate_field_uses_registry() {
        let (first, _) = sections();
        let schema = SchemaBuilder::new("t", SchemaVariant::Create)
            .section(first)
            .build();
        assert_eq!(
            schema.validate_field("name", None).unwrap_err().code(),
            "required"
        );
        assert_eq!(
            schema.validate_field("size", Some(&json!(3))).unwrap(),
            Some(json!(3))
        );
        assert!(schema.validate_field("unknown", Some(&json!(1))).is_ok());
    }
}
