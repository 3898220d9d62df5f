//! Story Lab — rule-based story outlining.
//!
//! Expands a one-line story idea into a scene outline, a screenplay-style
//! script and per-scene image prompts using keyword tables, and keeps the
//! resulting projects in a single JSON document.

pub mod core;
pub mod schema;
