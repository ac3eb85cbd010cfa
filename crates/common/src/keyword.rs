//! Keyword normalization
//!
//! Every store is queried with the trimmed, lower-cased form of the user's
//! input, so `"  Blockchain "` and `"blockchain"` are the same keyword.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized, non-empty keyword
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword(String);

impl Keyword {
    /// Normalize raw user input, rejecting empty or whitespace-only text
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(AppError::validation("keyword", "Please enter a keyword."));
        }
        Ok(Self(normalized))
    }

    /// Same as [`Keyword::parse`] but for optional input
    pub fn parse_opt(raw: Option<&str>) -> Result<Self> {
        match raw {
            Some(raw) => Self::parse(raw),
            None => Err(AppError::MissingField {
                field: "keyword".to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Keyword {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let variants = ["blockchain", "  Blockchain", "BLOCKCHAIN \t", "\nbLoCkChAiN\n"];
        for raw in variants {
            assert_eq!(Keyword::parse(raw).unwrap().as_str(), "blockchain");
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = Keyword::parse("  Machine Learning ").unwrap();
        let twice = Keyword::parse(once.as_str()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.as_str(), "machine learning");
    }

    #[test]
    fn test_rejects_blank_input() {
        for raw in ["", "   ", "\t\n"] {
            let err = Keyword::parse(raw).unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[test]
    fn test_missing_input() {
        let err = Keyword::parse_opt(None).unwrap_err();
        assert!(matches!(err, AppError::MissingField { .. }));
        assert_eq!(Keyword::parse_opt(Some("AI")).unwrap().as_str(), "ai");
    }

    #[test]
    fn test_deserializes_normalized() {
        let keyword: Keyword = serde_json::from_str("\" Data Mining \"").unwrap();
        assert_eq!(keyword.as_str(), "data mining");
        assert!(serde_json::from_str::<Keyword>("\"  \"").is_err());
    }
}
