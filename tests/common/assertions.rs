//! Common assertion helpers for test output validation
//!
//! Provides predicates for validating gitcli command output and error messages.

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for git repository error messages
pub fn not_in_git_repo() -> impl Predicate<str> {
    predicates::str::contains("Not in a git repository")
}

/// Creates a predicate for the error line printed before exiting with 1
pub fn story_error(message: &'static str) -> impl Predicate<str> {
    predicates::str::contains("✕ Error:").and(predicates::str::contains(message))
}

/// Creates a predicate for one numbered menu line
pub fn menu_item(ordinal: usize, label: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("[{ordinal}] {label}"))
}
