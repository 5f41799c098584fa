//! Property tests for field path construction.

use maklar_core::{FieldPath, ValidationError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn child_segments_round_trip(names in prop::collection::vec("[a-z_]{1,12}", 1..5)) {
        let mut path = FieldPath::root();
        for name in &names {
            path = path.child(name);
        }

        let segments: Vec<&str> = path.segments().collect();
        prop_assert_eq!(segments, names.iter().map(String::as_str).collect::<Vec<_>>());
        prop_assert_eq!(path.last_segment(), names.last().unwrap().as_str());
    }

    #[test]
    fn indices_do_not_change_segments(name in "[a-z]{1,8}", index in 0usize..100) {
        let path = FieldPath::field(name.clone()).index(index);
        prop_assert_eq!(path.last_segment(), name.as_str());
        prop_assert!(path.contains(&name));
    }
}

#[test]
fn sorting_errors_by_field_is_stable() {
    let mut errors = vec![
        ValidationError::new("slutpris", "first", "a"),
        ValidationError::new("biarea", "second", "b"),
        ValidationError::new("slutpris", "third", "c"),
    ];
    errors.sort_by(|a, b| a.field.cmp(&b.field));

    let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["b", "a", "c"]);
}
