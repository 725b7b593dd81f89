//! Parsing of user-typed menu choices.
//!
//! This module provides [`IndexParser`] which turns an answer such as `"1 3 4"`
//! into validated 1-based ordinals. Two modes exist:
//!
//! - **Lenient** ([`IndexParser::parse_lenient`]): used for multi-choice menus.
//!   Malformed and out-of-range tokens are dropped and returned in
//!   [`ParsedIndices::ignored`] so the caller can report them.
//! - **Strict** ([`IndexParser::parse_single`]): used where exactly one choice is
//!   expected; any invalid input is an error.

use crate::core::error::{Result, StoryError};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedIndices {
    /// Valid ordinals in the order typed, without duplicates
    pub indices: Vec<usize>,
    /// Tokens that were not a number in `1..=max`
    pub ignored: Vec<String>,
}

pub struct IndexParser;

impl IndexParser {
    pub fn parse_lenient(input: &str, max_index: usize) -> ParsedIndices {
        let mut parsed = ParsedIndices::default();

        for token in input.split_whitespace() {
            match Self::parse_single(token, max_index) {
                Ok(index) if !parsed.indices.contains(&index) => parsed.indices.push(index),
                Ok(_) => log::debug!("Ignoring repeated choice {token}"),
                Err(e) => {
                    log::debug!("Ignoring choice '{token}': {e}");
                    parsed.ignored.push(token.to_string());
                }
            }
        }

        parsed
    }

    pub fn parse_single(input: &str, max_index: usize) -> Result<usize> {
        let token = input.trim();
        let index: usize = token
            .parse()
            .map_err(|_| StoryError::invalid_number(token))?;
        Self::validate(index, max_index)?;
        Ok(index)
    }

    pub fn validate(index: usize, max_index: usize) -> Result<()> {
        if index == 0 {
            return Err(StoryError::ZeroIndex);
        }
        if index > max_index {
            return Err(StoryError::index_out_of_range(index, max_index));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_numbers() {
        let parsed = IndexParser::parse_lenient("1 3 4", 5);
        assert_eq!(parsed.indices, vec![1, 3, 4]);
        assert!(parsed.ignored.is_empty());
    }

    #[test]
    fn test_parse_extra_whitespace() {
        let parsed = IndexParser::parse_lenient("  2   1\t", 3);
        assert_eq!(parsed.indices, vec![2, 1]);
    }

    #[test]
    fn test_parse_duplicates_removed() {
        let parsed = IndexParser::parse_lenient("2 2 2", 3);
        assert_eq!(parsed.indices, vec![2]);
        assert!(parsed.ignored.is_empty());
    }

    #[test]
    fn test_parse_empty_input() {
        let parsed = IndexParser::parse_lenient("", 3);
        assert_eq!(parsed, ParsedIndices::default());
    }

    #[test]
    fn test_invalid_tokens_are_ignored_not_fatal() {
        let parsed = IndexParser::parse_lenient("abc 0 2 9 1-3", 5);
        assert_eq!(parsed.indices, vec![2]);
        assert_eq!(parsed.ignored, vec!["abc", "0", "9", "1-3"]);
    }

    #[test]
    fn test_only_invalid_tokens() {
        let parsed = IndexParser::parse_lenient("x y 42", 3);
        assert!(parsed.indices.is_empty());
        assert_eq!(parsed.ignored.len(), 3);
    }

    #[test]
    fn test_parse_single_valid() -> Result<()> {
        assert_eq!(IndexParser::parse_single(" 2\n", 3)?, 2);
        Ok(())
    }

    #[test]
    fn test_parse_single_invalid_number() {
        let result = IndexParser::parse_single("abc", 3);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid number: 'abc'"));
    }

    #[test]
    fn test_validate_index_too_large() {
        let result = IndexParser::validate(6, 5);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Index 6 is out of range (1-5 available)"));
    }

    #[test]
    fn test_validate_zero_index() {
        let result = IndexParser::validate(0, 5);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Index must be positive (got 0)"));
    }
}
