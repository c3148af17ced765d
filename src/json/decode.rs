//! Purpose: Provide the reference and candidate JSON decode entrypoints.
//! Exports: `reference_from_str`, `candidate_from_str`, `reference_tree`, `candidate_tree`.
//! Role: Parser boundary that centralizes serde_json/simd-json usage details.
//! Invariants: Candidate input buffers are copied once to satisfy simd-json's mutable-slice API.
//! Invariants: Tree-level failures map to `ErrorKind::Decode` with a category hint.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::Node;
use crate::json::failure::hint_for_message;

/// Decode with the trusted baseline decoder.
pub fn reference_from_str<T: DeserializeOwned>(input: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(input)
}

/// Decode with the candidate decoder under test.
pub fn candidate_from_str<T: DeserializeOwned>(input: &str) -> Result<T, simd_json::Error> {
    let mut bytes = input.as_bytes().to_vec();
    simd_json::serde::from_slice(&mut bytes)
}

pub fn reference_tree(input: &str, context: &str) -> Result<Node, Error> {
    let value: Value = reference_from_str(input)
        .map_err(|err| decode_error("reference", context, err))?;
    Ok(Node::from_json(value))
}

pub fn candidate_tree(input: &str, context: &str) -> Result<Node, Error> {
    let value: Value = candidate_from_str(input)
        .map_err(|err| decode_error("candidate", context, err))?;
    Ok(Node::from_json(value))
}

fn decode_error(
    backend: &str,
    context: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    let hint = hint_for_message(&source.to_string(), context);
    Error::new(ErrorKind::Decode)
        .with_message(format!("{backend} decoder rejected input"))
        .with_hint(hint)
        .with_source(source)
}
