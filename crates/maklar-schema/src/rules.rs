//! Cross-field rules.
//!
//! Rules run on the normalized draft after every per-field check has passed.
//! Each rule is independent: all failing rules are reported together.

use crate::compose::Draft;
use crate::field::number_param;
use crate::policy::{EnergyBands, EnergyClass, GeoBounds, RatioBounds};
use crate::violation::{Violation, ViolationKind};
use maklar_core::FieldPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a cross-field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// `boarea >= biarea`.
    AreaRelation,
    /// `slutpris / utgangspris` within bounds.
    PriceRatio,
    /// `accepterat_pris` close to `slutpris`.
    AcceptedPriceTolerance,
    /// Coordinates inside the national bounding box.
    CoordinatesOutOfBounds,
    /// Energy performance inside the declared class band.
    EnergyClassMismatch,
    /// A `min*` filter bound exceeds its `max*` counterpart.
    RangeOrder,
}

impl RuleKind {
    /// Stable violation code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AreaRelation => "area_relation",
            Self::PriceRatio => "price_ratio",
            Self::AcceptedPriceTolerance => "accepted_price_tolerance",
            Self::CoordinatesOutOfBounds => "coordinates_out_of_bounds",
            Self::EnergyClassMismatch => "energy_class_mismatch",
            Self::RangeOrder => "range_order",
        }
    }

    /// Catalog key of the failure message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::AreaRelation => "objekt.area.invalid_relation",
            Self::PriceRatio => "objekt.pris.invalid_ratio",
            Self::AcceptedPriceTolerance => "objekt.pris.accepted_mismatch",
            Self::CoordinatesOutOfBounds => "objekt.koordinater.outside_sweden",
            Self::EnergyClassMismatch => "objekt.energi.prestanda_mismatch",
            Self::RangeOrder => "validation.range_order",
        }
    }
}

/// A whole-entity check spanning several fields.
pub trait Refinement: Send + Sync + fmt::Debug {
    /// Which rule this is.
    fn kind(&self) -> RuleKind;

    /// Returns a violation if the rule does not hold for `data`.
    ///
    /// Rules only fire when every field they read is present.
    fn check(&self, data: &Draft) -> Option<Violation>;
}

fn number(data: &Draft, field: &str) -> Option<f64> {
    data.get(field).and_then(serde_json::Value::as_f64)
}

fn violation(field: &str, rule: RuleKind) -> Violation {
    Violation::new(FieldPath::field(field), ViolationKind::Rule { rule })
}

/// Living area must be at least the secondary area.
#[derive(Debug, Clone, Default)]
pub struct AreaRelation;

impl Refinement for AreaRelation {
    fn kind(&self) -> RuleKind {
        RuleKind::AreaRelation
    }

    fn check(&self, data: &Draft) -> Option<Violation> {
        let boarea = number(data, "boarea")?;
        let biarea = number(data, "biarea")?;
        (boarea < biarea).then(|| {
            violation("biarea", self.kind())
                .with_param("boarea", number_param(boarea))
                .with_param("biarea", number_param(biarea))
        })
    }
}

/// Final price must stay within a ratio of the asking price.
#[derive(Debug, Clone)]
pub struct PriceRatio {
    bounds: RatioBounds,
}

impl PriceRatio {
    /// Creates the rule with the given bounds.
    #[must_use]
    pub const fn new(bounds: RatioBounds) -> Self {
        Self { bounds }
    }
}

impl Refinement for PriceRatio {
    fn kind(&self) -> RuleKind {
        RuleKind::PriceRatio
    }

    fn check(&self, data: &Draft) -> Option<Violation> {
        let asking = number(data, "utgangspris").filter(|price| *price > 0.0)?;
        let final_price = number(data, "slutpris")?;
        let ratio = final_price / asking;
        (!self.bounds.contains(ratio)).then(|| {
            violation("slutpris", self.kind())
                .with_param("min", number_param(self.bounds.min))
                .with_param("max", number_param(self.bounds.max))
        })
    }
}

/// Accepted price must be within a relative tolerance of the final price.
#[derive(Debug, Clone)]
pub struct AcceptedPriceTolerance {
    tolerance: f64,
}

impl AcceptedPriceTolerance {
    /// Creates the rule; `tolerance` is a fraction (`0.05` for 5 %).
    #[must_use]
    pub const fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Refinement for AcceptedPriceTolerance {
    fn kind(&self) -> RuleKind {
        RuleKind::AcceptedPriceTolerance
    }

    fn check(&self, data: &Draft) -> Option<Violation> {
        let final_price = number(data, "slutpris")?;
        let accepted = number(data, "accepterat_pris")?;
        ((accepted - final_price).abs() > final_price * self.tolerance).then(|| {
            violation("accepterat_pris", self.kind())
                .with_param("tolerance", number_param((self.tolerance * 100.0).round()))
        })
    }
}

/// Both coordinates, when given, must lie inside the bounding box.
#[derive(Debug, Clone)]
pub struct CoordinatesWithin {
    bounds: GeoBounds,
}

impl CoordinatesWithin {
    /// Creates the rule with the given box.
    #[must_use]
    pub const fn new(bounds: GeoBounds) -> Self {
        Self { bounds }
    }
}

impl Refinement for CoordinatesWithin {
    fn kind(&self) -> RuleKind {
        RuleKind::CoordinatesOutOfBounds
    }

    fn check(&self, data: &Draft) -> Option<Violation> {
        let lat = number(data, "latitude")?;
        let lng = number(data, "longitude")?;
        (!self.bounds.contains(lat, lng)).then(|| violation("latitude", self.kind()))
    }
}

/// Energy performance must fall inside the declared class band.
#[derive(Debug, Clone)]
pub struct EnergyClassBand {
    bands: EnergyBands,
}

impl EnergyClassBand {
    /// Creates the rule with the given bands.
    #[must_use]
    pub const fn new(bands: EnergyBands) -> Self {
        Self { bands }
    }
}

impl Refinement for EnergyClassBand {
    fn kind(&self) -> RuleKind {
        RuleKind::EnergyClassMismatch
    }

    fn check(&self, data: &Draft) -> Option<Violation> {
        let class = data
            .get("energiklass")
            .and_then(serde_json::Value::as_str)
            .and_then(EnergyClass::parse)?;
        let performance = number(data, "energiprestanda")?;
        if self.bands.matches(class, performance) {
            return None;
        }
        let (min, max) = self.bands.range(class)?;
        Some(
            violation("energiprestanda", self.kind())
                .with_param("class", class.as_str())
                .with_param("min", number_param(min))
                .with_param("max", number_param(max)),
        )
    }
}

/// A lower filter bound must not exceed its upper bound.
#[derive(Debug, Clone)]
pub struct RangeOrder {
    min_field: String,
    max_field: String,
}

impl RangeOrder {
    /// Creates the rule for a `min`/`max` field pair.
    #[must_use]
    pub fn new(min_field: impl Into<String>, max_field: impl Into<String>) -> Self {
        Self {
            min_field: min_field.into(),
            max_field: max_field.into(),
        }
    }
}

impl Refinement for RangeOrder {
    fn kind(&self) -> RuleKind {
        RuleKind::RangeOrder
    }

    fn check(&self, data: &Draft) -> Option<Violation> {
        let min = number(data, &self.min_field)?;
        let max = number(data, &self.max_field)?;
        (min > max).then(|| {
            violation(&self.min_field, self.kind())
                .with_param("min_field", self.min_field.as_str())
                .with_param("max_field", self.max_field.as_str())
        })
    }
}
