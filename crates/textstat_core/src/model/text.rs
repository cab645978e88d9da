//! Text domain model.
//!
//! # Responsibility
//! - Define the stored text record and its serialized shape.
//! - Own value validation, so unvalidated input never reaches storage.
//!
//! # Invariants
//! - `TextValue` is trimmed, non-empty and at most `MAX_TEXT_VALUE_CHARS`.
//! - `updated_at` is never earlier than `created_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a stored text.
pub type TextId = Uuid;

/// Upper bound on stored value length, in characters after trimming.
pub const MAX_TEXT_VALUE_CHARS: usize = 100_000;

/// Validation errors for text values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    /// Value is empty or whitespace-only.
    EmptyValue,
    /// Trimmed value exceeds `MAX_TEXT_VALUE_CHARS`.
    ValueTooLong { chars: usize, max: usize },
    /// Value carries leading or trailing whitespace.
    Untrimmed,
}

impl Display for TextValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue => write!(f, "value must not be empty"),
            Self::ValueTooLong { chars, max } => {
                write!(f, "value is {chars} characters long; maximum is {max}")
            }
            Self::Untrimmed => write!(f, "value has leading or trailing whitespace"),
        }
    }
}

impl Error for TextValidationError {}

/// A validated text body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TextValue(String);

impl TextValue {
    /// Trims `raw` and checks the length bounds.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, TextValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextValidationError::EmptyValue);
        }

        let chars = trimmed.chars().count();
        if chars > MAX_TEXT_VALUE_CHARS {
            return Err(TextValidationError::ValueTooLong {
                chars,
                max: MAX_TEXT_VALUE_CHARS,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for TextValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TextValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored text record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: TextId,
    pub value: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Text {
    /// Checks the record invariants; used on rows read back from storage.
    pub fn validate(&self) -> Result<(), TextValidationError> {
        let parsed = TextValue::parse(&self.value)?;
        if parsed.as_str() != self.value {
            return Err(TextValidationError::Untrimmed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Text, TextValidationError, TextValue, MAX_TEXT_VALUE_CHARS};
    use uuid::Uuid;

    #[test]
    fn parse_trims_outer_whitespace() {
        let value = TextValue::parse("  hello world \n").expect("valid value");
        assert_eq!(value.as_str(), "hello world");
    }

    #[test]
    fn parse_rejects_blank_input() {
        assert_eq!(TextValue::parse(""), Err(TextValidationError::EmptyValue));
        assert_eq!(
            TextValue::parse(" \t\n "),
            Err(TextValidationError::EmptyValue)
        );
    }

    #[test]
    fn parse_rejects_oversized_input() {
        let raw = "a".repeat(MAX_TEXT_VALUE_CHARS + 1);
        let err = TextValue::parse(raw).expect_err("oversized value must fail");
        assert!(matches!(err, TextValidationError::ValueTooLong { .. }));

        let at_limit = "a".repeat(MAX_TEXT_VALUE_CHARS);
        assert!(TextValue::parse(at_limit).is_ok());
    }

    #[test]
    fn text_serializes_with_camel_case_fields() {
        let text = Text {
            id: Uuid::nil(),
            value: "body".to_string(),
            created_at: 10,
            updated_at: 20,
        };
        let json = serde_json::to_value(&text).expect("serialize");
        assert_eq!(json["value"], "body");
        assert_eq!(json["createdAt"], 10);
        assert_eq!(json["updatedAt"], 20);
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn validate_rejects_untrimmed_value() {
        let text = Text {
            id: Uuid::new_v4(),
            value: " padded ".to_string(),
            created_at: 1,
            updated_at: 1,
        };
        assert_eq!(text.validate(), Err(TextValidationError::Untrimmed));
    }
}
