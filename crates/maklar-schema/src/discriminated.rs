//! Discriminated schemas.
//!
//! A discriminant field (e.g. `typ`) selects one variant schema. Fields that
//! belong only to other variants are rejected when they carry a value.

use crate::compose::{Draft, Schema};
use crate::entity::EntitySchema;
use crate::error::SchemaError;
use crate::field::is_blank;
use crate::violation::{Violation, ViolationKind};
use indexmap::IndexMap;
use maklar_core::{FieldPath, ParamValue};
use serde_json::Value;

/// A schema whose shape depends on the value of one discriminant field.
#[derive(Debug, Clone)]
pub struct DiscriminatedSchema {
    name: String,
    discriminant: String,
    variants: IndexMap<String, Schema>,
}

impl DiscriminatedSchema {
    /// Creates a discriminated schema.
    ///
    /// Each variant schema should declare the discriminant field itself so it
    /// survives normalization.
    pub fn new(
        name: impl Into<String>,
        discriminant: impl Into<String>,
        variants: impl IntoIterator<Item = (String, Schema)>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let variants: IndexMap<String, Schema> = variants.into_iter().collect();
        if variants.is_empty() {
            return Err(SchemaError::NoVariants { schema: name });
        }
        Ok(Self {
            name,
            discriminant: discriminant.into(),
            variants,
        })
    }

    /// Discriminant values in declaration order.
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// The variant schema for a discriminant value.
    #[must_use]
    pub fn variant(&self, tag: &str) -> Option<&Schema> {
        self.variants.get(tag)
    }

    /// The variant selected by `draft`, if its discriminant is valid.
    #[must_use]
    pub fn select(&self, draft: &Draft) -> Option<&Schema> {
        draft
            .get(&self.discriminant)
            .and_then(Value::as_str)
            .and_then(|tag| self.variants.get(tag.trim()))
    }

    fn check_discriminant(&self, draft: &Draft) -> Result<&Schema, Violation> {
        let path = FieldPath::field(self.discriminant.clone());
        let value = draft.get(&self.discriminant);
        match value {
            None => Err(Violation::new(path, ViolationKind::Required)),
            Some(value) if is_blank(value) => Err(Violation::new(path, ViolationKind::Required)),
            Some(value) => self.select(draft).ok_or_else(|| {
                let options: Vec<String> = self.variants.keys().cloned().collect();
                Violation::new(path, ViolationKind::InvalidEnum)
                    .with_param("options", ParamValue::List(options))
                    .with_param("received", value.as_str().unwrap_or_default())
            }),
        }
    }

    fn owned_elsewhere(&self, selected: &Schema, name: &str) -> bool {
        !selected.contains(name) && self.variants.values().any(|schema| schema.contains(name))
    }

    fn in_every_variant(&self, name: &str) -> bool {
        self.variants.values().all(|schema| schema.contains(name))
    }

    /// Shape checks for the fields every variant shares, without presence
    /// rules. Used when no variant can be selected.
    fn check_shared_fields(&self, draft: &Draft) -> Vec<Violation> {
        let Some(first) = self.variants.values().next() else {
            return Vec::new();
        };
        first
            .fields()
            .filter(|spec| spec.name() != self.discriminant && self.in_every_variant(spec.name()))
            .filter_map(|spec| spec.clone().relaxed().check(draft.get(spec.name()), false).err())
            .collect()
    }
}

impl EntitySchema for DiscriminatedSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, draft: &Draft) -> Result<Draft, Vec<Violation>> {
        let selected = match self.check_discriminant(draft) {
            Ok(selected) => selected,
            Err(violation) => {
                let mut violations = vec![violation];
                violations.extend(self.check_shared_fields(draft));
                return Err(violations);
            }
        };

        let mut misplaced: Vec<Violation> = draft
            .iter()
            .filter(|(key, value)| !is_blank(value) && self.owned_elsewhere(selected, key))
            .map(|(key, _)| Violation::new(FieldPath::field(key.clone()), ViolationKind::NotApplicable))
            .collect();

        match selected.validate(draft) {
            Ok(output) if misplaced.is_empty() => Ok(output),
            Ok(_) => Err(misplaced),
            Err(mut violations) => {
                violations.append(&mut misplaced);
                Err(violations)
            }
        }
    }

    fn validate_field(&self, draft: &Draft, name: &str) -> Result<(), Violation> {
        if name == self.discriminant {
            return self.check_discriminant(draft).map(|_| ());
        }
        let value = draft.get(name);
        match self.select(draft) {
            Some(selected) if selected.contains(name) => {
                selected.validate_field(name, value).map(|_| ())
            }
            Some(selected) if self.owned_elsewhere(selected, name) => match value {
                Some(value) if !is_blank(value) => Err(Violation::new(
                    FieldPath::field(name.to_string()),
                    ViolationKind::NotApplicable,
                )),
                _ => Ok(()),
            },
            Some(selected) => selected.validate_field(name, value).map(|_| ()),
            None => {
                // No variant yet: check the value's shape without presence rules.
                let spec = self.variants.values().find_map(|schema| schema.field(name));
                match spec {
                    Some(spec) => spec.clone().relaxed().check(value, false).map(|_| ()),
                    None => Ok(()),
                }
            }
        }
    }

    fn is_relevant(&self, draft: &Draft, name: &str) -> bool {
        if name == self.discriminant {
            return true;
        }
        match self.select(draft) {
            Some(selected) => selected.contains(name),
            None => self.in_every_variant(name),
        }
    }

    fn is_required(&self, draft: &Draft, name: &str) -> bool {
        if name == self.discriminant {
            return true;
        }
        self.select(draft).is_some_and(|selected| selected.is_required(name))
    }

    fn discriminant(&self) -> Option<&str> {
        Some(&self.discriminant)
    }

    fn irrelevant_fields(&self, draft: &Draft) -> Vec<String> {
        let Some(selected) = self.select(draft) else {
            return Vec::new();
        };
        let mut fields: Vec<String> = Vec::new();
        for schema in self.variants.values() {
            for spec in schema.fields() {
                let name = spec.name();
                if !selected.contains(name) && !fields.iter().any(|f| f == name) {
                    fields.push(name.to_string());
                }
            }
        }
        fields
    }
}
