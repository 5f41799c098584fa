//! Property listing (objekt) schemas.

use crate::compose::{Schema, SchemaBuilder, SchemaVariant, Section};
use crate::field::{FieldKind, FieldSpec};
use crate::policy::{EnergyClass, RefinementPolicy};
use crate::rules::{
    AcceptedPriceTolerance, AreaRelation, CoordinatesWithin, EnergyClassBand, PriceRatio,
    RangeOrder,
};
use chrono::Datelike;
use maklar_validators::Identifier;

/// Property types.
pub const TYPES: [&str; 5] = ["villa", "lagenhet", "radhus", "fritidshus", "tomt"];

/// Listing statuses, in workflow order.
pub const STATUSES: [&str; 5] = ["kundbearbetning", "uppdrag", "till_salu", "sald", "tilltraden"];

/// Standard levels.
pub const STANDARD_LEVELS: [&str; 6] = [
    "hög",
    "mycket_hög",
    "normal",
    "låg",
    "renovering_behövs",
    "totalrenovering_krävs",
];

/// Charger types.
pub const CHARGER_TYPES: [&str; 4] = ["1-fas_3.7kW", "3-fas_11kW", "3-fas_22kW", "dc_snabbladdare"];

/// Sortable listing columns.
pub const SORT_COLUMNS: [&str; 5] = ["created_at", "utgangspris", "boarea", "rum", "byggaar"];

const MAX_PRICE: f64 = 1_000_000_000.0;
const MAX_AREA: f64 = 100_000.0;

fn price() -> FieldKind {
    FieldKind::number(0.0, MAX_PRICE)
}

fn area() -> FieldKind {
    FieldKind::number(0.0, MAX_AREA)
}

fn required_text() -> FieldKind {
    FieldKind::Text {
        min_len: Some(1),
        max_len: Some(200),
    }
}

fn energy_classes() -> Vec<&'static str> {
    EnergyClass::ALL.iter().map(EnergyClass::as_str).collect()
}

/// Identity and address; required on create.
#[must_use]
pub fn base_section() -> Section {
    Section::new("property.base")
        .field(FieldSpec::required("typ", FieldKind::one_of(&TYPES)))
        .field(FieldSpec::required("adress", required_text()))
        .field(FieldSpec::required("postnummer", FieldKind::Identifier(Identifier::PostalCode)))
        .field(FieldSpec::required("ort", required_text()))
        .field(FieldSpec::required("kommun", required_text()))
        .field(FieldSpec::required("lan", required_text()))
        .field(FieldSpec::required("maklare_id", FieldKind::Uuid))
}

/// Status, prices, sizes and parties.
#[must_use]
pub fn details_section() -> Section {
    let max_year = f64::from(chrono::Utc::now().year() + 10);
    Section::new("property.details")
        .field(FieldSpec::optional("objektnummer", FieldKind::text_max(50)))
        .field(FieldSpec::optional("status", FieldKind::one_of(&STATUSES)).with_default("kundbearbetning"))
        .field(FieldSpec::optional("utgangspris", price()))
        .field(FieldSpec::optional("slutpris", price()))
        .field(FieldSpec::optional("accepterat_pris", price()))
        .field(FieldSpec::optional("boarea", area()))
        .field(FieldSpec::optional("biarea", area()))
        .field(FieldSpec::optional("tomtarea", area()))
        .field(FieldSpec::optional(
            "rum",
            FieldKind::Number {
                min: Some(0.5),
                max: Some(50.0),
                integer: false,
                step: Some(0.5),
            },
        ))
        .field(FieldSpec::optional("byggaar", FieldKind::integer(1800.0, max_year)))
        .field(FieldSpec::optional("saljare_id", FieldKind::Uuid))
        .field(FieldSpec::optional("kopare_id", FieldKind::Uuid))
        .field(FieldSpec::optional("beskrivning", FieldKind::text_max(10_000)))
}

/// Registry data and links.
#[must_use]
pub fn registry_section() -> Section {
    Section::new("property.registry")
        .field(FieldSpec::optional(
            "fastighetsbeteckning",
            FieldKind::Identifier(Identifier::PropertyDesignation),
        ))
        .field(FieldSpec::optional("undertyp", FieldKind::text_max(50)))
        .field(FieldSpec::optional("andel_i_forening", FieldKind::number(0.0, 100.0)))
        .field(FieldSpec::optional("virtuell_visning_url", FieldKind::Url))
        .field(FieldSpec::optional("boendekalkyl_url", FieldKind::Url))
}

/// Amenities.
#[must_use]
pub fn features_section() -> Section {
    let mut section = Section::new("property.features")
        .field(FieldSpec::optional("vaning", FieldKind::integer(-2.0, 100.0)))
        .field(FieldSpec::optional("badrum_antal", FieldKind::integer(0.0, 50.0)))
        .field(FieldSpec::optional("laddbox_antal", FieldKind::integer(0.0, 100.0)))
        .field(FieldSpec::optional("laddbox_typ", FieldKind::one_of(&CHARGER_TYPES)))
        .field(FieldSpec::optional("standard_niva", FieldKind::one_of(&STANDARD_LEVELS)))
        .field(FieldSpec::optional("garage", FieldKind::text_max(100)));
    for flag in [
        "balkong_terrass",
        "hiss",
        "forrad",
        "tradgard",
        "pool",
        "kamin",
        "laddbox",
        "solceller",
        "tillganglighetsanpassad",
    ] {
        section = section.field(FieldSpec::optional(flag, FieldKind::Boolean));
    }
    section
}

/// Energy and fees.
#[must_use]
pub fn technical_section() -> Section {
    Section::new("property.technical")
        .field(FieldSpec::optional("energiklass", FieldKind::one_of(&energy_classes())))
        .field(FieldSpec::optional("energiprestanda", FieldKind::number(0.0, 1000.0)))
        .field(FieldSpec::optional("manadsavgift", price()))
        .field(FieldSpec::optional("driftkostnad", price()))
        .field(FieldSpec::optional("taxeringsvarde", price()))
        .field(FieldSpec::optional("pantbrev", price()))
}

/// Coordinates and surroundings.
#[must_use]
pub fn location_section() -> Section {
    Section::new("property.location")
        .field(FieldSpec::optional("latitude", FieldKind::number(-90.0, 90.0)))
        .field(FieldSpec::optional("longitude", FieldKind::number(-180.0, 180.0)))
        .field(FieldSpec::optional("havsnara", FieldKind::Boolean))
        .field(FieldSpec::optional("sjonara", FieldKind::Boolean))
        .field(FieldSpec::optional("skogsnara", FieldKind::Boolean))
}

fn entity_schema(name: &str, variant: SchemaVariant, policy: &RefinementPolicy) -> Schema {
    SchemaBuilder::new(name, variant)
        .section(base_section())
        .section(details_section())
        .section(registry_section())
        .section(features_section())
        .section(technical_section())
        .section(location_section())
        .refine(AreaRelation)
        .refine(PriceRatio::new(policy.price_ratio))
        .refine(AcceptedPriceTolerance::new(policy.accepted_price_tolerance))
        .refine(CoordinatesWithin::new(policy.coordinate_bounds))
        .refine(EnergyClassBand::new(policy.energy_bands.clone()))
        .build()
}

/// Create schema with all cross-field rules.
#[must_use]
pub fn create_schema(policy: &RefinementPolicy) -> Schema {
    entity_schema("property.create", SchemaVariant::Create, policy)
}

/// Update schema: every field optional, rules apply to the fields supplied.
#[must_use]
pub fn update_schema(policy: &RefinementPolicy) -> Schema {
    entity_schema("property.update", SchemaVariant::Update, policy)
}

/// Filter schema for property listings.
#[must_use]
pub fn filter_schema() -> Schema {
    SchemaBuilder::new("property.filter", SchemaVariant::Filter)
        .section(
            Section::new("property.filter")
                .field(FieldSpec::optional("status", FieldKind::one_of(&STATUSES)))
                .field(FieldSpec::optional("typ", FieldKind::one_of(&TYPES)))
                .field(FieldSpec::optional("maklare_id", FieldKind::Uuid))
                .field(FieldSpec::optional("kommun", FieldKind::text_max(100)))
                .field(FieldSpec::optional("minPris", price()))
                .field(FieldSpec::optional("maxPris", price()))
                .field(FieldSpec::optional("minBoarea", area()))
                .field(FieldSpec::optional("maxBoarea", area()))
                .field(FieldSpec::optional("minRum", FieldKind::number(0.0, 50.0)))
                .field(FieldSpec::optional("maxRum", FieldKind::number(0.0, 50.0))),
        )
        .section(
            Section::new("listing.paging")
                .field(FieldSpec::optional("sortBy", FieldKind::one_of(&SORT_COLUMNS)))
                .field(FieldSpec::optional("sortOrder", FieldKind::one_of(&["asc", "desc"])))
                .field(FieldSpec::optional(
                    "page",
                    FieldKind::Number {
                        min: Some(1.0),
                        max: None,
                        integer: true,
                        step: None,
                    },
                ))
                .field(FieldSpec::optional("limit", FieldKind::integer(1.0, 100.0))),
        )
        .refine(RangeOrder::new("minPris", "maxPris"))
        .refine(RangeOrder::new("minBoarea", "maxBoarea"))
        .refine(RangeOrder::new("minRum", "maxRum"))
        .build()
}
