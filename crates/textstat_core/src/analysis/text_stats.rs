//! Word, character, sentence and paragraph statistics.
//!
//! # Invariants
//! - Every function is a pure function of its input.
//! - Empty fragments are dropped; whitespace-only fragments are not.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph break regex"));

const SENTENCE_TERMINATORS: [char; 3] = ['.', '?', '!'];

/// All statistics for one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub number_of_words: usize,
    pub number_of_chars: usize,
    pub number_of_sentences: usize,
    pub number_of_paragraphs: usize,
    pub longest_word_in_paragraphs: Vec<Option<String>>,
}

/// Number of whitespace-separated tokens; 0 for blank input.
pub fn word_count(value: &str) -> usize {
    value.split_whitespace().count()
}

/// Unicode scalar values left after trimming outer whitespace.
pub fn char_count(value: &str) -> usize {
    value.trim().chars().count()
}

/// Non-empty fragments between `.`, `?` and `!`.
///
/// `"Hi. "` counts 2: the trailing space is a fragment of its own.
pub fn sentence_count(value: &str) -> usize {
    value
        .split(SENTENCE_TERMINATORS)
        .filter(|fragment| !fragment.is_empty())
        .count()
}

/// Non-empty fragments between blank lines.
pub fn paragraph_count(value: &str) -> usize {
    paragraphs(value).count()
}

/// Longest token of each paragraph, in paragraph order.
///
/// Ties keep the first token; a paragraph without tokens yields `None`.
pub fn longest_word_per_paragraph(value: &str) -> Vec<Option<String>> {
    paragraphs(value)
        .map(|paragraph| longest_word(paragraph).map(str::to_string))
        .collect()
}

/// Computes every statistic in one call.
pub fn analyze(value: &str) -> TextStats {
    TextStats {
        number_of_words: word_count(value),
        number_of_chars: char_count(value),
        number_of_sentences: sentence_count(value),
        number_of_paragraphs: paragraph_count(value),
        longest_word_in_paragraphs: longest_word_per_paragraph(value),
    }
}

fn paragraphs(value: &str) -> impl Iterator<Item = &str> {
    PARAGRAPH_BREAK_RE
        .split(value)
        .filter(|paragraph| !paragraph.is_empty())
}

fn longest_word(paragraph: &str) -> Option<&str> {
    paragraph
        .split_whitespace()
        .fold(None, |longest: Option<&str>, word| match longest {
            Some(current) if current.chars().count() >= word.chars().count() => Some(current),
            _ => Some(word),
        })
}

#[cfg(test)]
mod tests {
    use super::{
        analyze, char_count, longest_word_per_paragraph, paragraph_count, sentence_count,
        word_count,
    };

    #[test]
    fn word_count_handles_blank_input() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("\n\t"), 0);
    }

    #[test]
    fn word_count_splits_on_whitespace_runs() {
        assert_eq!(word_count("  the quick\tbrown \n\n fox "), 4);
        assert_eq!(word_count("single"), 1);
    }

    #[test]
    fn char_count_trims_outer_whitespace_only() {
        assert_eq!(char_count("  hello world  "), 11);
        assert_eq!(char_count(""), 0);
        assert_eq!(char_count("héllo"), 5);
    }

    #[test]
    fn char_count_counts_scalar_values_not_utf16_units() {
        // An astral emoji is one scalar value but two UTF-16 code units.
        assert_eq!(char_count("hi 😀"), 4);
        // A combining accent is its own scalar value.
        assert_eq!(char_count("e\u{301}"), 2);
    }

    #[test]
    fn sentence_count_uses_literal_terminators() {
        assert_eq!(sentence_count("A. B! C?"), 3);
        assert_eq!(sentence_count("No punctuation"), 1);
        assert_eq!(sentence_count("Hi. "), 2);
        assert_eq!(sentence_count("Pi is 3.14"), 2);
        assert_eq!(sentence_count("...?!"), 0);
    }

    #[test]
    fn paragraph_count_splits_on_blank_lines() {
        assert_eq!(paragraph_count("p1\n\np2\n\n\np3"), 3);
        assert_eq!(paragraph_count("one\nparagraph"), 1);
        assert_eq!(paragraph_count("p1\n  \t\np2"), 2);
        assert_eq!(paragraph_count("\n\np1"), 1);
    }

    #[test]
    fn longest_word_prefers_first_on_ties() {
        assert_eq!(
            longest_word_per_paragraph("a bb cc\n\nxyz"),
            vec![Some("bb".to_string()), Some("xyz".to_string())]
        );
    }

    #[test]
    fn longest_word_is_none_for_blank_paragraph() {
        assert_eq!(
            longest_word_per_paragraph("word\n\n   "),
            vec![Some("word".to_string()), None]
        );
    }

    #[test]
    fn analyze_combines_all_statistics() {
        let stats = analyze("The fox ran. It hid!\n\nThe end.");
        assert_eq!(stats.number_of_words, 7);
        assert_eq!(stats.number_of_chars, 30);
        assert_eq!(stats.number_of_sentences, 3);
        assert_eq!(stats.number_of_paragraphs, 2);
        assert_eq!(
            stats.longest_word_in_paragraphs,
            vec![Some("ran.".to_string()), Some("end.".to_string())]
        );
    }
}
