//! Field paths.
//!
//! A [`FieldPath`] addresses one value inside an entity draft using dot and
//! bracket notation (`pricing.monthlyFee`, `rooms[2]`). The empty path
//! addresses the entity as a whole and is used for top-level errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dot/bracket path to a field inside an entity draft.
///
/// Paths order lexicographically by their rendered form, which is the order
/// error reports are presented in.
///
/// # Example
///
/// ```
/// use maklar_core::FieldPath;
///
/// let path = FieldPath::field("pricing").child("monthlyFee");
/// assert_eq!(path.as_str(), "pricing.monthlyFee");
/// assert_eq!(path.last_segment(), "monthlyFee");
///
/// let indexed = FieldPath::field("rooms").index(2);
/// assert_eq!(indexed.as_str(), "rooms[2]");
/// assert!(FieldPath::root().is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// The whole-entity path (`""`).
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// A single top-level field.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Appends a named segment.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{name}", self.0))
        }
    }

    /// Appends an array index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Returns `true` for the whole-entity path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the rendered path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates the named segments, ignoring array indices.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0
            .split('.')
            .map(|segment| segment.split('[').next().unwrap_or(segment))
            .filter(|segment| !segment.is_empty())
    }

    /// Returns the last named segment (`monthlyFee` for `pricing.monthlyFee`).
    ///
    /// Used to look up human-readable field labels.
    #[must_use]
    pub fn last_segment(&self) -> &str {
        self.segments().last().unwrap_or("")
    }

    /// Returns `true` if any named segment equals `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.segments().any(|segment| segment == name)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_of_root_has_no_leading_dot() {
        assert_eq!(FieldPath::root().child("email").as_str(), "email");
    }

    #[test]
    fn test_nested_index() {
        let path = FieldPath::field("rooms").index(2).child("area");
        assert_eq!(path.as_str(), "rooms[2].area");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["rooms", "area"]);
        assert!(path.contains("rooms"));
        assert!(!path.contains("room"));
    }

    #[test]
    fn test_last_segment_of_root_is_empty() {
        assert_eq!(FieldPath::root().last_segment(), "");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut paths = vec![
            FieldPath::from("slutpris"),
            FieldPath::root(),
            FieldPath::from("biarea"),
        ];
        paths.sort();
        assert_eq!(paths[0], FieldPath::root());
        assert_eq!(paths[1].as_str(), "biarea");
        assert_eq!(paths[2].as_str(), "slutpris");
    }
}
