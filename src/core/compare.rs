//! Purpose: Lock-step structural comparison of decoded document trees.
//! Exports: `Outcome`, `Divergence`, `compare`, `collect_leaves`, `LeafRecord`, `format_path`.
//! Role: Pure diff engine behind `check` and `diff`; policy-free and reentrant.
//! Invariants: Traversal is directional; only the left tree's slots are enumerated.
//! Invariants: The first divergence aborts the walk; no sibling slots are visited after it.
//! Invariants: No I/O, no logging, no process control inside the comparator.

use crate::core::value::{LeafValue, Node, Scalar, Shape, Step};

static ABSENT: Node = Node::Scalar(Scalar::Absent);

/// Result of one directional comparison.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Match { leaves: u64 },
    Divergence(Divergence),
}

/// First point where the two trees disagree.
#[derive(Clone, Debug, PartialEq)]
pub struct Divergence {
    pub path: Vec<Step>,
    pub left: LeafValue,
    pub right: LeafValue,
    pub depth: usize,
    /// Leaves matched strictly before the divergence was found.
    pub leaves_matched: u64,
}

impl Outcome {
    pub fn divergence(&self) -> Option<&Divergence> {
        match self {
            Outcome::Match { .. } => None,
            Outcome::Divergence(divergence) => Some(divergence),
        }
    }

    pub fn leaves(&self) -> u64 {
        match self {
            Outcome::Match { leaves } => *leaves,
            Outcome::Divergence(divergence) => divergence.leaves_matched,
        }
    }
}

/// Walk `left` and `right` in lock-step and report the first divergence, or
/// the number of leaf slots that matched.
///
/// The walk is directional: slots present only in `right` are never visited.
/// Full equivalence takes a second call with the arguments swapped.
pub fn compare(left: &Node, right: &Node) -> Outcome {
    let mut leaves = 0u64;
    let mut path = Vec::new();
    match walk(left, right, 1, &mut path, &mut leaves) {
        Ok(()) => Outcome::Match { leaves },
        Err(divergence) => Outcome::Divergence(divergence),
    }
}

fn walk(
    left: &Node,
    right: &Node,
    depth: usize,
    path: &mut Vec<Step>,
    leaves: &mut u64,
) -> Result<(), Divergence> {
    match left.shape() {
        Shape::Leaf(expected) => check_leaf(expected, right, depth, path, leaves),
        Shape::Items(items) => {
            for (idx, item) in items.iter().enumerate() {
                visit_slot(item, right, Step::Index(idx), depth, path, leaves)?;
            }
            Ok(())
        }
        Shape::Entries(entries) => {
            for (key, item) in entries {
                visit_slot(item, right, Step::Key(key.clone()), depth, path, leaves)?;
            }
            Ok(())
        }
    }
}

// A leaf slot is checked at the depth of its containing composite; only
// composite slots deepen the walk.
fn visit_slot(
    item: &Node,
    right: &Node,
    step: Step,
    depth: usize,
    path: &mut Vec<Step>,
    leaves: &mut u64,
) -> Result<(), Divergence> {
    let counterpart = right.lookup(&step).unwrap_or(&ABSENT);
    path.push(step);
    match item.shape() {
        Shape::Leaf(expected) => check_leaf(expected, counterpart, depth, path, leaves)?,
        _ => walk(item, counterpart, depth + 1, path, leaves)?,
    }
    path.pop();
    Ok(())
}

fn check_leaf(
    expected: LeafValue,
    right: &Node,
    depth: usize,
    path: &mut Vec<Step>,
    leaves: &mut u64,
) -> Result<(), Divergence> {
    let found = right.leaf_value();
    if expected == found {
        *leaves += 1;
        return Ok(());
    }
    Err(Divergence {
        path: path.clone(),
        left: expected,
        right: found,
        depth,
        leaves_matched: *leaves,
    })
}

/// One leaf of a tree, with the path that reaches it.
#[derive(Clone, Debug, PartialEq)]
pub struct LeafRecord {
    pub path: Vec<Step>,
    pub value: LeafValue,
    pub depth: usize,
}

/// Enumerate every leaf of a single tree in traversal order.
pub fn collect_leaves(node: &Node) -> Vec<LeafRecord> {
    let mut records = Vec::new();
    let mut path = Vec::new();
    gather(node, 1, &mut path, &mut records);
    records
}

fn gather(node: &Node, depth: usize, path: &mut Vec<Step>, out: &mut Vec<LeafRecord>) {
    match node.shape() {
        Shape::Leaf(value) => out.push(LeafRecord {
            path: path.clone(),
            value,
            depth,
        }),
        Shape::Items(items) => {
            for (idx, item) in items.iter().enumerate() {
                path.push(Step::Index(idx));
                gather_slot(item, depth, path, out);
                path.pop();
            }
        }
        Shape::Entries(entries) => {
            for (key, item) in entries {
                path.push(Step::Key(key.clone()));
                gather_slot(item, depth, path, out);
                path.pop();
            }
        }
    }
}

fn gather_slot(item: &Node, depth: usize, path: &mut Vec<Step>, out: &mut Vec<LeafRecord>) {
    match item.shape() {
        Shape::Leaf(value) => out.push(LeafRecord {
            path: path.clone(),
            value,
            depth,
        }),
        _ => gather(item, depth + 1, path, out),
    }
}

/// Render a path for diagnostics, e.g. `players[3].hp`.
pub fn format_path(path: &[Step]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    let mut out = String::new();
    for step in path {
        match step {
            Step::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Step::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Outcome, collect_leaves, compare, format_path};
    use crate::core::value::{LeafValue, Node, Step};
    use serde_json::json;

    fn node(value: serde_json::Value) -> Node {
        Node::from_json(value)
    }

    #[test]
    fn identical_trees_match_with_leaf_count() {
        let tree = node(json!({
            "name": "orb",
            "stats": {"weight": 3, "fragile": true},
            "tags": ["glass", "round"],
        }));
        let outcome = compare(&tree, &tree);
        assert_eq!(outcome, Outcome::Match { leaves: 5 });
    }

    #[test]
    fn first_divergence_carries_path_and_both_sides() {
        let left = node(json!({"stats": {"weight": 3}}));
        let right = node(json!({"stats": {"weight": 4}}));
        let divergence = match compare(&left, &right) {
            Outcome::Divergence(divergence) => divergence,
            Outcome::Match { .. } => panic!("expected divergence"),
        };
        assert_eq!(format_path(&divergence.path), "stats.weight");
        assert_eq!(divergence.left, LeafValue::Number(3.into()));
        assert_eq!(divergence.right, LeafValue::Number(4.into()));
    }

    #[test]
    fn scalar_against_composite_diverges() {
        let left = node(json!({"a": 1}));
        let right = node(json!({"a": {"b": 1}}));
        let divergence = compare(&left, &right);
        let divergence = divergence.divergence().expect("divergence");
        assert_eq!(divergence.left, LeafValue::Number(1.into()));
        assert_eq!(divergence.right, LeafValue::Composite);
    }

    #[test]
    fn leaf_enumeration_visits_in_order() {
        let tree = node(json!({"a": [1, 2], "b": null}));
        let records = collect_leaves(&tree);
        let rendered = records
            .iter()
            .map(|record| format!("{}={}", format_path(&record.path), record.value))
            .collect::<Vec<_>>();
        assert_eq!(rendered, vec!["a[0]=1", "a[1]=2", "b=absent"]);
    }

    #[test]
    fn path_rendering_handles_root_and_nesting() {
        assert_eq!(format_path(&[]), "(root)");
        assert_eq!(
            format_path(&[
                Step::Key("a".to_string()),
                Step::Index(2),
                Step::Key("b".to_string()),
            ]),
            "a[2].b"
        );
    }
}
