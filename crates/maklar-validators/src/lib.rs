//! # Maklar Validators
//!
//! Format and checksum validators for Swedish national identifiers, each
//! paired with a formatter that renders the canonical display form.
//!
//! | Identifier | Validator | Canonical form |
//! |---|---|---|
//! | Personal ID (personnummer) | [`personal_id::is_valid`] | `YYMMDD-XXXX` / `YYYYMMDD-XXXX` |
//! | Organization number | [`organization_number::is_valid`] | `XXXXXX-XXXX` |
//! | Postal code | [`postal_code::is_valid`] | `XXX XX` |
//! | Phone number | [`phone_number::is_valid`] | `+46 XX XXX XX XX` / `0XX-XXX XX XX` |
//! | Property designation | [`property_designation::is_valid`] | whitespace-collapsed |
//!
//! Validators never panic. Formatters never re-validate: when an input cannot
//! be rendered canonically they return it unchanged.
//!
//! ```
//! use maklar_validators::Identifier;
//!
//! assert!(Identifier::PostalCode.is_valid("111 22"));
//! assert_eq!(Identifier::PostalCode.format("11122"), "111 22");
//! assert_eq!(Identifier::PostalCode.format("abc"), "abc");
//! ```

#![doc(html_root_url = "https://docs.rs/maklar-validators/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod checksum;
pub mod organization_number;
pub mod personal_id;
pub mod phone_number;
pub mod postal_code;
pub mod property_designation;

use serde::{Deserialize, Serialize};

/// The identifier kinds with a validator/formatter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identifier {
    /// Swedish personal identity number.
    PersonalId,
    /// Swedish organization number.
    OrganizationNumber,
    /// Swedish postal code.
    PostalCode,
    /// Swedish phone number.
    PhoneNumber,
    /// Swedish property designation.
    PropertyDesignation,
}

impl Identifier {
    /// All identifier kinds.
    pub const ALL: [Self; 5] = [
        Self::PersonalId,
        Self::OrganizationNumber,
        Self::PostalCode,
        Self::PhoneNumber,
        Self::PropertyDesignation,
    ];

    /// Returns `true` if `input` is a well-formed identifier of this kind.
    #[must_use]
    pub fn is_valid(&self, input: &str) -> bool {
        match self {
            Self::PersonalId => personal_id::is_valid(input),
            Self::OrganizationNumber => organization_number::is_valid(input),
            Self::PostalCode => postal_code::is_valid(input),
            Self::PhoneNumber => phone_number::is_valid(input),
            Self::PropertyDesignation => property_designation::is_valid(input),
        }
    }

    /// Renders `input` in canonical display form, or returns it unchanged.
    #[must_use]
    pub fn format(&self, input: &str) -> String {
        match self {
            Self::PersonalId => personal_id::format(input),
            Self::OrganizationNumber => organization_number::format(input),
            Self::PostalCode => postal_code::format(input),
            Self::PhoneNumber => phone_number::format(input),
            Self::PropertyDesignation => property_designation::format(input),
        }
    }

    /// Stable violation code reported when validation fails.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PersonalId => "invalid_personal_id",
            Self::OrganizationNumber => "invalid_organization_number",
            Self::PostalCode => "invalid_postal_code",
            Self::PhoneNumber => "invalid_phone_number",
            Self::PropertyDesignation => "invalid_property_designation",
        }
    }

    /// Catalog key of the failure message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::PersonalId => "swedish.personnummer.invalid",
            Self::OrganizationNumber => "swedish.organisationsnummer.invalid",
            Self::PostalCode => "swedish.postnummer.invalid",
            Self::PhoneNumber => "swedish.telefonnummer.invalid",
            Self::PropertyDesignation => "swedish.fastighetsbeteckning.invalid",
        }
    }
}

/// Removes every character matched by `is_separator`.
pub(crate) fn strip(input: &str, is_separator: impl Fn(char) -> bool) -> String {
    input.chars().filter(|c| !is_separator(*c)).collect()
}

pub(crate) fn is_ascii_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let mut codes: Vec<_> = Identifier::ALL.iter().map(Identifier::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Identifier::ALL.len());
    }

    #[test]
    fn test_empty_input_is_invalid_and_formats_to_itself() {
        for identifier in Identifier::ALL {
            assert!(!identifier.is_valid(""), "{identifier:?}");
            assert_eq!(identifier.format(""), "", "{identifier:?}");
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Identifier::OrganizationNumber).unwrap();
        assert_eq!(json, "\"organization_number\"");
    }
}
