//! Domain model for stored texts.
//!
//! # Invariants
//! - Every text is identified by a stable `TextId`.
//! - A stored value is always trimmed and non-empty.

pub mod text;
