//! # Maklar Schema
//!
//! Composable entity schemas for property listings and contacts.
//!
//! A schema is built from [`Section`]s of [`FieldSpec`]s, each wrapping one
//! [`FieldKind`] primitive. Validation collects every field [`Violation`] in a
//! single pass, then runs the schema's cross-field [`Refinement`]s.
//!
//! ## Variants
//!
//! - [`SchemaVariant::Create`]: declared-required fields are mandatory, defaults apply
//! - [`SchemaVariant::Update`]: every field optional
//! - [`SchemaVariant::Filter`]: optional, unknown keys stripped, strings coerced
//!
//! [`DiscriminatedSchema`] selects a variant schema by the value of one
//! field. Both kinds implement [`EntitySchema`], the interface form
//! controllers and request stages validate through.
//!
//! ## Entities
//!
//! - [`property`]: property listings with area, price, coordinate and energy rules
//! - [`contact`]: individuals and organizations discriminated by `typ`

#![doc(html_root_url = "https://docs.rs/maklar-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod compose;
mod discriminated;
mod entity;
mod error;
mod field;
mod policy;
mod rules;
mod violation;

pub mod contact;
pub mod property;

pub use compose::{Draft, Schema, SchemaBuilder, SchemaVariant, Section, UnknownFields};
pub use discriminated::DiscriminatedSchema;
pub use entity::EntitySchema;
pub use error::SchemaError;
pub use field::{is_blank, json_type_name, FieldKind, FieldSpec};
pub use policy::{EnergyBands, EnergyClass, GeoBounds, RatioBounds, RefinementPolicy};
pub use rules::{
    AcceptedPriceTolerance, AreaRelation, CoordinatesWithin, EnergyClassBand, PriceRatio,
    RangeOrder, Refinement, RuleKind,
};
pub use violation::{Subject, Violation, ViolationKind};
