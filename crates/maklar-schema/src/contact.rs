//! Contact (kontakt) schemas.
//!
//! Contacts are either private individuals (`privatperson`) or organizations
//! (`foretag`). The `typ` field is the discriminant.

use crate::compose::{Draft, Schema, SchemaBuilder, SchemaVariant, Section};
use crate::discriminated::DiscriminatedSchema;
use crate::error::SchemaError;
use crate::field::{FieldKind, FieldSpec};
use maklar_validators::Identifier;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Name of the discriminant field.
pub const DISCRIMINANT: &str = "typ";

/// Fields shared by every contact kind.
pub const BASE_FIELDS: [&str; 8] = [
    "typ",
    "kategori",
    "email",
    "telefon",
    "mobil",
    "adress",
    "postnummer",
    "ort",
];

/// Wildcard accepted by the contact filter for `typ` and `kategori`.
pub const FILTER_ALL: &str = "alla";

/// The kind of contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// A private individual.
    #[serde(rename = "privatperson")]
    Individual,
    /// A company or other organization.
    #[serde(rename = "foretag")]
    Organization,
}

impl ContactKind {
    /// All kinds.
    pub const ALL: [Self; 2] = [Self::Individual, Self::Organization];

    /// Discriminant value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "privatperson",
            Self::Organization => "foretag",
        }
    }

    /// Reads the kind from a draft's discriminant.
    #[must_use]
    pub fn from_draft(draft: &Draft) -> Option<Self> {
        draft
            .get(DISCRIMINANT)
            .and_then(Value::as_str)
            .and_then(|tag| tag.trim().parse().ok())
    }

    /// Fields only this kind carries (besides [`BASE_FIELDS`]).
    #[must_use]
    pub const fn own_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Individual => &["fornamn", "efternamn", "personnummer"],
            Self::Organization => &["foretag", "organisationsnummer", "fornamn", "efternamn"],
        }
    }

    /// Whether `field` should be shown for this kind.
    #[must_use]
    pub fn is_relevant(&self, field: &str) -> bool {
        BASE_FIELDS.contains(&field) || self.own_fields().contains(&field)
    }

    /// Whether `field` must be filled in for this kind.
    #[must_use]
    pub fn is_required(&self, field: &str) -> bool {
        match self {
            Self::Individual => matches!(field, "typ" | "fornamn" | "efternamn"),
            Self::Organization => matches!(field, "typ" | "foretag"),
        }
    }

    /// Fields that must be cleared when switching to this kind.
    #[must_use]
    pub fn irrelevant_fields(&self) -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|other| *other != self)
            .flat_map(ContactKind::own_fields)
            .copied()
            .filter(|field| !self.is_relevant(field))
            .collect()
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown contact kind '{s}'"))
    }
}

/// Contact category values.
pub const CATEGORIES: [&str; 4] = ["saljare", "kopare", "spekulant", "ovrig"];

fn kinds() -> Vec<&'static str> {
    ContactKind::ALL.iter().map(ContactKind::as_str).collect()
}

fn name_text() -> FieldKind {
    FieldKind::Text {
        min_len: Some(1),
        max_len: Some(100),
    }
}

/// Fields shared by every contact kind.
#[must_use]
pub fn base_section() -> Section {
    Section::new("contact.base")
        .field(FieldSpec::required("typ", FieldKind::one_of(&kinds())))
        .field(FieldSpec::optional("kategori", FieldKind::one_of(&CATEGORIES)).with_default("ovrig"))
        .field(FieldSpec::optional("email", FieldKind::Email))
        .field(FieldSpec::optional("telefon", FieldKind::Identifier(Identifier::PhoneNumber)))
        .field(FieldSpec::optional("mobil", FieldKind::Identifier(Identifier::PhoneNumber)))
        .field(FieldSpec::optional("adress", FieldKind::text_max(200)))
        .field(FieldSpec::optional("postnummer", FieldKind::Identifier(Identifier::PostalCode)))
        .field(FieldSpec::optional("ort", FieldKind::text_max(100)))
}

/// Fields of a private individual.
#[must_use]
pub fn individual_section() -> Section {
    Section::new("contact.individual")
        .field(FieldSpec::required("fornamn", name_text()))
        .field(FieldSpec::required("efternamn", name_text()))
        .field(FieldSpec::optional("personnummer", FieldKind::Identifier(Identifier::PersonalId)))
}

/// Fields of an organization; first and last name name the contact person.
#[must_use]
pub fn organization_section() -> Section {
    Section::new("contact.organization")
        .field(FieldSpec::required(
            "foretag",
            FieldKind::Text {
                min_len: Some(1),
                max_len: Some(200),
            },
        ))
        .field(FieldSpec::optional(
            "organisationsnummer",
            FieldKind::Identifier(Identifier::OrganizationNumber),
        ))
        .field(FieldSpec::optional("fornamn", FieldKind::text_max(100)))
        .field(FieldSpec::optional("efternamn", FieldKind::text_max(100)))
}

fn kind_section(kind: ContactKind) -> Section {
    match kind {
        ContactKind::Individual => individual_section(),
        ContactKind::Organization => organization_section(),
    }
}

/// Create schema: the variant is selected by `typ`.
pub fn create_schema() -> Result<DiscriminatedSchema, SchemaError> {
    let variants = ContactKind::ALL.into_iter().map(|kind| {
        let schema = SchemaBuilder::new(format!("contact.create.{kind}"), SchemaVariant::Create)
            .section(base_section())
            .section(kind_section(kind))
            .build();
        (kind.as_str().to_string(), schema)
    });
    DiscriminatedSchema::new("contact.create", DISCRIMINANT, variants)
}

/// Update schema: every field optional.
#[must_use]
pub fn update_schema() -> Schema {
    SchemaBuilder::new("contact.update", SchemaVariant::Update)
        .section(base_section())
        .section(individual_section())
        .section(organization_section())
        .build()
}

/// Filter schema for contact listings.
#[must_use]
pub fn filter_schema() -> Schema {
    let mut typ = kinds();
    typ.push(FILTER_ALL);
    let mut kategori = CATEGORIES.to_vec();
    kategori.push(FILTER_ALL);

    SchemaBuilder::new("contact.filter", SchemaVariant::Filter)
        .section(
            Section::new("contact.filter")
                .field(FieldSpec::optional("typ", FieldKind::one_of(&typ)))
                .field(FieldSpec::optional("kategori", FieldKind::one_of(&kategori)))
                .field(FieldSpec::optional("search", FieldKind::text_max(200))),
        )
        .build()
}
