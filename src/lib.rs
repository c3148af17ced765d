//! Purpose: Shared library crate used by the `lockstep` CLI and tests.
//! Exports: `core` (value model, comparator, sweep, errors) and `json` (decoder boundary).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;
pub mod json;
