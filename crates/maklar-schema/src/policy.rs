//! Tunable constants behind the cross-field rules.
//!
//! The defaults mirror current product policy. They are plain configuration
//! and can be overridden per deployment.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Energy performance class, best (`A`) to worst (`G`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnergyClass {
    /// Class A.
    A,
    /// Class B.
    B,
    /// Class C.
    C,
    /// Class D.
    D,
    /// Class E.
    E,
    /// Class F.
    F,
    /// Class G.
    G,
}

impl EnergyClass {
    /// All classes in order.
    pub const ALL: [Self; 7] = [Self::A, Self::B, Self::C, Self::D, Self::E, Self::F, Self::G];

    /// Letter form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
        }
    }

    /// Parses the letter form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.as_str() == value)
    }
}

impl fmt::Display for EnergyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted range of `slutpris / utgangspris`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatioBounds {
    /// Lowest accepted ratio.
    pub min: f64,
    /// Highest accepted ratio.
    pub max: f64,
}

impl RatioBounds {
    /// Returns `true` if `ratio` is within bounds (inclusive).
    #[must_use]
    pub fn contains(&self, ratio: f64) -> bool {
        ratio >= self.min && ratio <= self.max
    }
}

/// Latitude/longitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoBounds {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl GeoBounds {
    /// Returns `true` if the point lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Upper energy-performance bound (kWh/m²/year) per class.
///
/// A class covers `(previous upper, own upper]`; class `A` starts at zero
/// inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnergyBands(BTreeMap<EnergyClass, f64>);

impl EnergyBands {
    /// Creates bands from per-class upper bounds.
    #[must_use]
    pub fn new(upper: BTreeMap<EnergyClass, f64>) -> Self {
        Self(upper)
    }

    /// Returns the `(lower, upper)` range for a class, lower exclusive except for `A`.
    #[must_use]
    pub fn range(&self, class: EnergyClass) -> Option<(f64, f64)> {
        let upper = *self.0.get(&class)?;
        let lower = self
            .0
            .range(..class)
            .next_back()
            .map_or(0.0, |(_, upper)| *upper);
        Some((lower, upper))
    }

    /// Returns `true` if `performance` falls within the class band.
    #[must_use]
    pub fn matches(&self, class: EnergyClass, performance: f64) -> bool {
        match self.range(class) {
            Some((lower, upper)) if class == EnergyClass::A => {
                performance >= lower && performance <= upper
            }
            Some((lower, upper)) => performance > lower && performance <= upper,
            None => true,
        }
    }
}

impl Default for EnergyBands {
    fn default() -> Self {
        let upper = [50.0, 75.0, 100.0, 150.0, 200.0, 300.0, 500.0];
        Self(EnergyClass::ALL.into_iter().zip(upper).collect())
    }
}

/// Constants used by the property cross-field rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefinementPolicy {
    /// Accepted `slutpris / utgangspris` range.
    pub price_ratio: RatioBounds,
    /// Maximum relative gap between accepted and final price.
    pub accepted_price_tolerance: f64,
    /// National bounding box for coordinates.
    pub coordinate_bounds: GeoBounds,
    /// Energy class bands.
    pub energy_bands: EnergyBands,
}

impl Default for RefinementPolicy {
    fn default() -> Self {
        Self {
            price_ratio: RatioBounds { min: 0.5, max: 1.5 },
            accepted_price_tolerance: 0.05,
            coordinate_bounds: GeoBounds {
                min_lat: 55.0,
                max_lat: 69.5,
                min_lng: 10.5,
                max_lng: 24.5,
            },
            energy_bands: EnergyBands::default(),
        }
    }
}

impl RefinementPolicy {
    /// Checks that the policy is internally consistent.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let ratio = &self.price_ratio;
        if !(ratio.min > 0.0 && ratio.min <= ratio.max) {
            return Err(SchemaError::invalid_policy(
                "price_ratio",
                format!("expected 0 < min <= max, got {}..{}", ratio.min, ratio.max),
            ));
        }

        if !(0.0..1.0).contains(&self.accepted_price_tolerance) {
            return Err(SchemaError::invalid_policy(
                "accepted_price_tolerance",
                "must be in [0, 1)",
            ));
        }

        let geo = &self.coordinate_bounds;
        if geo.min_lat > geo.max_lat || geo.min_lng > geo.max_lng {
            return Err(SchemaError::invalid_policy(
                "coordinate_bounds",
                "min must not exceed max",
            ));
        }

        let mut previous = 0.0;
        for class in EnergyClass::ALL {
            let Some(upper) = self.energy_bands.0.get(&class).copied() else {
                return Err(SchemaError::invalid_policy(
                    "energy_bands",
                    format!("missing class {class}"),
                ));
            };
            if upper <= previous {
                return Err(SchemaError::invalid_policy(
                    "energy_bands",
                    format!("class {class} upper bound {upper} must exceed {previous}"),
                ));
            }
            previous = upper;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(RefinementPolicy::default().validate().is_ok());
    }

    #[test]
    fn test_energy_bands_have_no_gaps() {
        let bands = EnergyBands::default();
        assert!(bands.matches(EnergyClass::A, 0.0));
        assert!(bands.matches(EnergyClass::A, 50.0));
        assert!(!bands.matches(EnergyClass::B, 50.0));
        assert!(bands.matches(EnergyClass::B, 50.5));
        assert!(bands.matches(EnergyClass::G, 500.0));
        assert!(!bands.matches(EnergyClass::G, 500.1));
        assert_eq!(bands.range(EnergyClass::D), Some((100.0, 150.0)));
    }

    #[test]
    fn test_rejects_inverted_ratio() {
        let policy = RefinementPolicy {
            price_ratio: RatioBounds { min: 1.5, max: 0.5 },
            ..RefinementPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(SchemaError::InvalidPolicy { field, .. }) if field == "price_ratio"
        ));
    }

    #[test]
    fn test_rejects_non_increasing_bands() {
        let mut upper: BTreeMap<EnergyClass, f64> = EnergyBands::default().0;
        upper.insert(EnergyClass::C, 60.0);
        let policy = RefinementPolicy {
            energy_bands: EnergyBands::new(upper),
            ..RefinementPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_partial_override_from_json() {
        let policy: RefinementPolicy =
            serde_json::from_str(r#"{"accepted_price_tolerance": 0.1}"#).unwrap();
        assert!((policy.accepted_price_tolerance - 0.1).abs() < f64::EPSILON);
        assert_eq!(policy.price_ratio, RatioBounds { min: 0.5, max: 1.5 });
    }

    #[test]
    fn test_energy_class_parse() {
        assert_eq!(EnergyClass::parse("C"), Some(EnergyClass::C));
        assert_eq!(EnergyClass::parse("c"), None);
    }
}
