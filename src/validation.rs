//! Text validation - length bounds and profanity screening.
//!
//! Used identically for question content, answer content, and edits; callers
//! must re-validate on every edit, not just creation. The profanity check
//! lowercases the input, strips all whitespace, and does a plain substring
//! match against a fixed token list - no stemming or further normalization.

use thiserror::Error;

/// Fixed list of prohibited tokens (Korean profanity and common obfuscations).
const PROHIBITED_WORDS: &[&str] = &[
    "시발", "씨발", "ㅅㅂ", "ㅆㅂ", "병신", "ㅂㅅ", "지랄", "ㅈㄹ", "새끼", "ㅅㄲ", "개새", "썅",
    "니미", "엠창", "좆", "ㅈ같", "존나", "ㅈㄴ",
];

/// Inclusive character-count bounds for a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    /// Minimum number of characters
    pub min: usize,
    /// Maximum number of characters
    pub max: usize,
}

/// Default bounds shared by answers and free-form text: 2 to 1000 characters.
pub const DEFAULT_BOUNDS: TextBounds = TextBounds { min: 2, max: 1000 };
/// Question titles: 2 to 100 characters.
pub const TITLE_BOUNDS: TextBounds = TextBounds { min: 2, max: 100 };
/// Question content: 10 to 2000 characters.
pub const QUESTION_BOUNDS: TextBounds = TextBounds { min: 10, max: 2000 };

/// Why a piece of text was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Fewer characters than the field's minimum.
    #[error("Text too short: {length} characters, minimum is {min}")]
    TooShort {
        /// Observed character count
        length: usize,
        /// Required minimum
        min: usize,
    },
    /// More characters than the field's maximum.
    #[error("Text too long: {length} characters, maximum is {max}")]
    TooLong {
        /// Observed character count
        length: usize,
        /// Allowed maximum
        max: usize,
    },
    /// Contains a prohibited token.
    #[error("Text contains prohibited words")]
    ProhibitedWords,
}

/// Returns true when the text contains any prohibited token, ignoring case
/// and whitespace.
#[must_use]
pub fn contains_prohibited_words(text: &str) -> bool {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    PROHIBITED_WORDS.iter().any(|w| normalized.contains(w))
}

/// Validates text against the given bounds and the profanity list.
pub fn validate_text(input: &str, bounds: TextBounds) -> Result<(), ValidationError> {
    let length = input.chars().count();
    if length < bounds.min {
        return Err(ValidationError::TooShort {
            length,
            min: bounds.min,
        });
    }
    if length > bounds.max {
        return Err(ValidationError::TooLong {
            length,
            max: bounds.max,
        });
    }
    if contains_prohibited_words(input) {
        return Err(ValidationError::ProhibitedWords);
    }
    Ok(())
}
