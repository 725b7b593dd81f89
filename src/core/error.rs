//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`StoryError`] which covers every failure mode of the story
//! workflows. It uses `thiserror` for ergonomic error definitions and includes
//! constructors for the common failure scenarios.
//!
//! # Public API
//! - [`StoryError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, StoryError>`
//!
//! # Error Categories
//! - **Configuration**: required git config keys missing from every scope
//! - **Lookups**: repository, branch, remote or stash not found
//! - **Network**: git transport, hosting API and database failures
//! - **Merging**: conflicts and unexpected merge analysis results
//! - **User input**: missing flags, invalid patterns, invalid choices
//! - **State file**: most-recent-branch persistence failures

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for gitcli
#[derive(Error, Debug)]
pub enum StoryError {
    // Repository errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    #[error("Unable to find branch `{name}`")]
    BranchNotFound { name: String },

    #[error("Stash {id} is no longer in the stash list")]
    StashNotFound { id: String },

    #[error("Unable to find remote `{name}`")]
    RemoteNotFound { name: String },

    #[error("Unable to push `{refspec}` to remote `{remote}`: {source}")]
    PushFailed {
        remote: String,
        refspec: String,
        source: git2::Error,
    },

    #[error("Unable to set upstream to `{upstream}`: {source}")]
    UpstreamFailed {
        upstream: String,
        source: git2::Error,
    },

    // Configuration errors
    #[error("No value found in git config for `{key}`")]
    ConfigMissing { key: String },

    #[error("Invalid value `{value}` for config key `{key}`")]
    ConfigInvalid { key: String, value: String },

    // Merge errors
    #[error("Conflicts encountered. Please resolve them.")]
    MergeConflicts,

    #[error("Unexpected merge analysis result {bits}")]
    UnexpectedMergeAnalysis { bits: u32 },

    // User input errors
    #[error("Missing required option `{name}`")]
    MissingArgument { name: String },

    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Invalid number: '{number}'")]
    InvalidNumber { number: String },

    #[error("Index must be positive (got 0)")]
    ZeroIndex,

    #[error("Index {index} is out of range (1-{max} available)")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("No recent branch recorded. Switch by pattern first.")]
    NoRecentBranch,

    // Pull request errors
    #[error("Unable to extract owner/repo from remote url `{url}`")]
    InvalidRemoteUrl { url: String },

    #[error("Not a valid branch to merge: `{branch}` does not match `{pattern}`")]
    IssueNotFound { branch: String, pattern: String },

    #[error("Pull request title is empty")]
    EmptyTitle,

    #[error("Editor `{editor}` exited with {status}")]
    EditorFailed { editor: String, status: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pull request was rejected ({status}): {message}")]
    PullRequestRejected { status: u16, message: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] mysql::Error),

    #[error("Deletion finished with {failed} failure(s)")]
    DeletionFailed { failed: usize },

    // State file errors
    #[error("Failed to create state directory '{path}': {source}")]
    StateDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write state file '{path}': {source}")]
    StateWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read state file '{path}': {source}")]
    StateReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse state file '{path}': {source}")]
    StateParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid UTF-8 in {what}")]
    InvalidUtf8 { what: String },
}

/// Convenience type alias for Results using StoryError
pub type Result<T> = std::result::Result<T, StoryError>;

impl StoryError {
    /// Create a configuration-missing error naming the key
    pub fn config_missing(key: impl Into<String>) -> Self {
        Self::ConfigMissing { key: key.into() }
    }

    pub fn config_invalid(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn branch_not_found(name: impl Into<String>) -> Self {
        Self::BranchNotFound { name: name.into() }
    }

    pub fn stash_not_found(id: impl ToString) -> Self {
        Self::StashNotFound { id: id.to_string() }
    }

    pub fn remote_not_found(name: impl Into<String>) -> Self {
        Self::RemoteNotFound { name: name.into() }
    }

    pub fn push_failed(
        remote: impl Into<String>,
        refspec: impl Into<String>,
        source: git2::Error,
    ) -> Self {
        Self::PushFailed {
            remote: remote.into(),
            refspec: refspec.into(),
            source,
        }
    }

    pub fn upstream_failed(upstream: impl Into<String>, source: git2::Error) -> Self {
        Self::UpstreamFailed {
            upstream: upstream.into(),
            source,
        }
    }

    /// Create a missing argument error for a command-line option
    pub fn missing_argument(name: impl Into<String>) -> Self {
        Self::MissingArgument { name: name.into() }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create an invalid number error
    pub fn invalid_number(number: impl Into<String>) -> Self {
        Self::InvalidNumber {
            number: number.into(),
        }
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, max: usize) -> Self {
        Self::IndexOutOfRange { index, max }
    }

    pub fn invalid_remote_url(url: impl Into<String>) -> Self {
        Self::InvalidRemoteUrl { url: url.into() }
    }

    pub fn issue_not_found(branch: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::IssueNotFound {
            branch: branch.into(),
            pattern: pattern.into(),
        }
    }

    pub fn editor_failed(editor: impl Into<String>, status: impl Into<String>) -> Self {
        Self::EditorFailed {
            editor: editor.into(),
            status: status.into(),
        }
    }

    pub fn pull_request_rejected(status: u16, message: impl Into<String>) -> Self {
        Self::PullRequestRejected {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_utf8(what: impl Into<String>) -> Self {
        Self::InvalidUtf8 { what: what.into() }
    }

    /// Create a state directory creation failed error
    pub fn state_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::StateDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    pub fn state_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StateWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn state_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StateReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn state_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::StateParseFailed {
            path: path.into(),
            source,
        }
    }
}
