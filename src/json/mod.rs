//! Purpose: Internal JSON decode boundary shared by the sweep and CLI.
//! Exports: `decode` (dual decoder entrypoints), `failure` (parse-failure taxonomy).
//! Role: Single seam for both decoder implementations so callsites avoid ad hoc decode logic.
//! Invariants: Reference decoding goes through serde_json, candidate decoding through simd-json.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub mod decode;
pub mod failure;
