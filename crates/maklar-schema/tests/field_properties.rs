//! Property-based checks of field kinds.

use maklar_core::FieldPath;
use maklar_schema::FieldKind;
use proptest::prelude::*;
use serde_json::{json, Value};

fn path() -> FieldPath {
    FieldPath::field("f")
}

proptest! {
    #[test]
    fn integer_in_range_is_accepted_from_string(n in 1i64..=1000) {
        let kind = FieldKind::integer(1.0, 1000.0);
        let value = kind.check(&path(), &Value::String(n.to_string()), true).unwrap();
        prop_assert_eq!(value, json!(n));
    }

    #[test]
    fn integer_above_range_reports_max(n in 1001i64..1_000_000) {
        let kind = FieldKind::integer(1.0, 1000.0);
        let err = kind.check(&path(), &json!(n), false).unwrap_err();
        prop_assert_eq!(err.code(), "too_big");
        prop_assert_eq!(err.params["max"].to_string(), "1000");
    }

    #[test]
    fn numeric_strings_need_coercion(n in 1i64..=1000) {
        let kind = FieldKind::integer(1.0, 1000.0);
        let err = kind.check(&path(), &Value::String(n.to_string()), false).unwrap_err();
        prop_assert_eq!(err.code(), "invalid_type");
    }

    #[test]
    fn text_is_trimmed_within_limit(text in "[a-zåäö]{1,20}", pad in " {0,3}") {
        let kind = FieldKind::text_max(20);
        let value = kind.check(&path(), &json!(format!("{pad}{text}{pad}")), false).unwrap();
        prop_assert_eq!(value, json!(text));
    }

    #[test]
    fn text_over_limit_is_rejected(text in "[a-z]{21,60}") {
        let kind = FieldKind::text_max(20);
        let err = kind.check(&path(), &json!(text), false).unwrap_err();
        prop_assert_eq!(err.code(), "too_big");
    }
}
