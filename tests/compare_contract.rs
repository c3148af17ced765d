//! Purpose: Lock the observable contract of the lock-step comparator.
//! Exports: Integration tests only (no runtime exports).
//! Role: Pin directionality, fail-fast, depth, and leaf-classification behavior.
//! Invariants: Every property here holds for any tree the decoders can produce.

use lockstep::core::compare::{Outcome, compare, format_path};
use lockstep::core::value::{LeafValue, Node};
use serde_json::json;

fn node(value: serde_json::Value) -> Node {
    Node::from_json(value)
}

fn expect_divergence(outcome: Outcome) -> lockstep::core::compare::Divergence {
    match outcome {
        Outcome::Divergence(divergence) => divergence,
        Outcome::Match { leaves } => panic!("expected divergence, matched {leaves} leaves"),
    }
}

#[test]
fn comparison_is_reflexive() {
    let trees = [
        json!(null),
        json!(42),
        json!("text"),
        json!([1, [2, [3]], {"k": false}]),
        json!({"a": {"b": {"c": [null, "", 0]}}}),
        json!({}),
        json!([]),
    ];
    for tree in trees {
        let tree = node(tree);
        assert!(
            compare(&tree, &tree).divergence().is_none(),
            "self-comparison diverged for {tree:?}"
        );
    }
}

#[test]
fn scalar_inequality_diverges_at_depth_one() {
    let divergence = expect_divergence(compare(&node(json!(1)), &node(json!(2))));
    assert_eq!(divergence.depth, 1);
    assert!(divergence.path.is_empty());
    assert_eq!(divergence.left, LeafValue::Number(1.into()));
    assert_eq!(divergence.right, LeafValue::Number(2.into()));
}

#[test]
fn strict_equality_rejects_cross_type_coercion() {
    // "1" and 1 would be loosely equal; the walk must not coerce.
    let divergence = expect_divergence(compare(&node(json!("1")), &node(json!(1))));
    assert_eq!(divergence.left, LeafValue::Text("1".to_string()));
    assert_eq!(divergence.right, LeafValue::Number(1.into()));

    // Likewise for integer vs float spellings of the same quantity.
    assert!(
        compare(&node(json!(1)), &node(json!(1.0)))
            .divergence()
            .is_some()
    );
}

#[test]
fn comparison_is_directional() {
    let wide = node(json!({"a": 1, "b": 2}));
    let narrow = node(json!({"a": 1}));

    let divergence = expect_divergence(compare(&wide, &narrow));
    assert_eq!(format_path(&divergence.path), "b");
    assert_eq!(divergence.left, LeafValue::Number(2.into()));
    assert_eq!(divergence.right, LeafValue::Absent);

    // The narrow side has no slot "b" to enumerate, so the reverse matches.
    assert_eq!(compare(&narrow, &wide), Outcome::Match { leaves: 1 });
}

#[test]
fn sequence_matches_numeric_string_mapping() {
    let seq = node(json!([10, 20]));
    let map = node(json!({"0": 10, "1": 20}));
    assert_eq!(compare(&seq, &map), Outcome::Match { leaves: 2 });
    assert_eq!(compare(&map, &seq), Outcome::Match { leaves: 2 });
}

#[test]
fn sequence_against_non_numeric_mapping_diverges_on_first_slot() {
    let seq = node(json!([10, 20]));
    let map = node(json!({"a": 10, "b": 20}));
    let divergence = expect_divergence(compare(&seq, &map));
    assert_eq!(format_path(&divergence.path), "[0]");
    assert_eq!(divergence.right, LeafValue::Absent);
}

#[test]
fn first_divergence_stops_the_walk() {
    // Mapping iteration is deterministic (sorted keys), so "a" is visited
    // before "b"; the divergence at "a" must report zero matched leaves.
    let left = node(json!({"a": 1, "b": 2}));
    let right = node(json!({"a": 9, "b": 2}));
    let divergence = expect_divergence(compare(&left, &right));
    assert_eq!(format_path(&divergence.path), "a");
    assert_eq!(divergence.leaves_matched, 0);

    // When the divergence comes later, only the leaves strictly before it
    // are counted.
    let left = node(json!({"a": 1, "z": 2}));
    let right = node(json!({"a": 1, "z": 3}));
    let divergence = expect_divergence(compare(&left, &right));
    assert_eq!(format_path(&divergence.path), "z");
    assert_eq!(divergence.leaves_matched, 1);
}

#[test]
fn divergence_depth_is_the_nesting_level_of_the_leaf() {
    let left = node(json!({"x": {"y": {"z": 5}}}));
    let right = node(json!({"x": {"y": {"z": 6}}}));
    let divergence = expect_divergence(compare(&left, &right));
    assert_eq!(divergence.depth, 3);
    assert_eq!(format_path(&divergence.path), "x.y.z");
}

#[test]
fn empty_composites_are_leaves() {
    assert_eq!(
        compare(&node(json!({})), &node(json!({}))),
        Outcome::Match { leaves: 1 }
    );
    assert_eq!(
        compare(&node(json!([])), &node(json!([]))),
        Outcome::Match { leaves: 1 }
    );

    // Nested empty composites count as one leaf each.
    let left = node(json!({"a": {}, "b": []}));
    assert_eq!(compare(&left, &left.clone()), Outcome::Match { leaves: 2 });

    // An empty mapping is not an empty sequence.
    let divergence = expect_divergence(compare(&node(json!({})), &node(json!([]))));
    assert_eq!(divergence.left, LeafValue::EmptyMapping);
    assert_eq!(divergence.right, LeafValue::EmptySequence);
}

#[test]
fn absence_marker_unifies_null_and_missing() {
    let with_null = node(json!({"a": null}));
    let without = node(json!({}));
    // {} is a leaf on the left, so only the null-bearing direction
    // exercises the missing-key lookup.
    assert_eq!(compare(&with_null, &without), Outcome::Match { leaves: 1 });

    let with_value = node(json!({"a": 1}));
    let divergence = expect_divergence(compare(&with_null, &with_value));
    assert_eq!(divergence.left, LeafValue::Absent);
    assert_eq!(divergence.right, LeafValue::Number(1.into()));
}

#[test]
fn composite_where_leaf_expected_diverges() {
    let left = node(json!({"a": 5}));
    let right = node(json!({"a": [5]}));
    let divergence = expect_divergence(compare(&left, &right));
    assert_eq!(divergence.left, LeafValue::Number(5.into()));
    assert_eq!(divergence.right, LeafValue::Composite);
}

#[test]
fn bidirectional_check_catches_right_only_slots() {
    let reference = node(json!({"shared": true}));
    let candidate = node(json!({"shared": true, "extra": 1}));

    assert!(compare(&reference, &candidate).divergence().is_none());
    let divergence = expect_divergence(compare(&candidate, &reference));
    assert_eq!(format_path(&divergence.path), "extra");
}
