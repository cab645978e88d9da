//! Pure text statistics.
//!
//! Splitting is deliberately literal: whitespace runs for words, `.?!` for
//! sentences and blank lines for paragraphs. Counts must stay stable for
//! existing consumers, so no smarter boundary detection is applied.

pub mod text_stats;
