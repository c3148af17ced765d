//! Purpose: Closed tagged tree model for decoded JSON documents.
//! Exports: `Node`, `Scalar`, `Step`, `LeafValue`, `Shape`.
//! Role: Shared value shape consumed by the comparator; decided at decode time.
//! Invariants: `Absent` covers both JSON null and missing-key lookups.
//! Invariants: Mapping entries keep decode order so diagnostics stay deterministic.

use std::fmt;

use serde_json::{Number, Value};

/// A single non-composite value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Absent,
    Bool(bool),
    Number(Number),
    Text(String),
}

/// A decoded document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Vec<(String, Node)>),
}

/// One step of a path into a tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// What a comparison sees at a slot: either a leaf or the parts to recurse into.
///
/// An empty sequence or mapping classifies as a leaf, matching the
/// truthiness branch of the behavior this tool reproduces.
pub enum Shape<'a> {
    Leaf(LeafValue),
    Items(&'a [Node]),
    Entries(&'a [(String, Node)]),
}

/// Leaf-level value carried in diagnostics. `Composite` marks a slot that held
/// a non-empty sequence or mapping where a leaf was expected on the other side.
#[derive(Clone, Debug, PartialEq)]
pub enum LeafValue {
    Absent,
    Bool(bool),
    Number(Number),
    Text(String),
    EmptySequence,
    EmptyMapping,
    Composite,
}

impl Node {
    pub fn from_json(value: Value) -> Node {
        match value {
            Value::Null => Node::Scalar(Scalar::Absent),
            Value::Bool(val) => Node::Scalar(Scalar::Bool(val)),
            Value::Number(num) => Node::Scalar(Scalar::Number(num)),
            Value::String(text) => Node::Scalar(Scalar::Text(text)),
            Value::Array(items) => {
                Node::Sequence(items.into_iter().map(Node::from_json).collect())
            }
            Value::Object(map) => Node::Mapping(
                map.into_iter()
                    .map(|(key, val)| (key, Node::from_json(val)))
                    .collect(),
            ),
        }
    }

    pub fn shape(&self) -> Shape<'_> {
        match self {
            Node::Scalar(Scalar::Absent) => Shape::Leaf(LeafValue::Absent),
            Node::Scalar(Scalar::Bool(val)) => Shape::Leaf(LeafValue::Bool(*val)),
            Node::Scalar(Scalar::Number(num)) => Shape::Leaf(LeafValue::Number(num.clone())),
            Node::Scalar(Scalar::Text(text)) => Shape::Leaf(LeafValue::Text(text.clone())),
            Node::Sequence(items) if items.is_empty() => Shape::Leaf(LeafValue::EmptySequence),
            Node::Mapping(entries) if entries.is_empty() => Shape::Leaf(LeafValue::EmptyMapping),
            Node::Sequence(items) => Shape::Items(items),
            Node::Mapping(entries) => Shape::Entries(entries),
        }
    }

    /// Leaf view of this node; composites render as `Composite`.
    pub fn leaf_value(&self) -> LeafValue {
        match self.shape() {
            Shape::Leaf(value) => value,
            _ => LeafValue::Composite,
        }
    }

    /// Look up a step, coercing between numeric indices and numeric-string
    /// keys so a sequence can be checked against a mapping keyed "0", "1", …
    /// and vice versa.
    pub fn lookup(&self, step: &Step) -> Option<&Node> {
        match (self, step) {
            (Node::Sequence(items), Step::Index(idx)) => items.get(*idx),
            (Node::Mapping(entries), Step::Index(idx)) => {
                let key = idx.to_string();
                entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
            }
            (Node::Mapping(entries), Step::Key(key)) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            (Node::Sequence(items), Step::Key(key)) => {
                key.parse::<usize>().ok().and_then(|idx| items.get(idx))
            }
            (Node::Scalar(_), _) => None,
        }
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafValue::Absent => write!(f, "absent"),
            LeafValue::Bool(val) => write!(f, "{val}"),
            LeafValue::Number(num) => write!(f, "{num}"),
            LeafValue::Text(text) => {
                let encoded =
                    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
                write!(f, "{encoded}")
            }
            LeafValue::EmptySequence => write!(f, "[]"),
            LeafValue::EmptyMapping => write!(f, "{{}}"),
            LeafValue::Composite => write!(f, "<composite>"),
        }
    }
}

impl LeafValue {
    /// JSON rendering used by machine-readable output paths.
    pub fn to_json(&self) -> Value {
        match self {
            LeafValue::Absent => Value::Null,
            LeafValue::Bool(val) => Value::Bool(*val),
            LeafValue::Number(num) => Value::Number(num.clone()),
            LeafValue::Text(text) => Value::String(text.clone()),
            LeafValue::EmptySequence => Value::Array(Vec::new()),
            LeafValue::EmptyMapping => Value::Object(serde_json::Map::new()),
            LeafValue::Composite => Value::String("<composite>".to_string()),
        }
    }
}
