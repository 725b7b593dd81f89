//! Core functionality for gitcli.
//!
//! This module provides the building blocks the story workflows are made of:
//! git and database gateways, config lookups, selection menus, deletion loops,
//! interactive I/O and error handling.

pub mod command_init;
pub mod config;
pub mod database;
pub mod deletion;
pub mod dirs;
pub mod editor;
pub mod error;
pub mod git;
pub mod index_parser;
pub mod output;
pub mod prompt;
pub mod pull_request;
pub mod selection;
pub mod source;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// === Error handling ===
pub use error::{Result, StoryError};

// === Repository access ===
pub use git::{BranchKind, MergeOutcome, RemoteAuth, StashEntry, StoryRepo};

// === Configuration ===
pub use config::{ConfigChain, ConfigStore, GitConfigStore, MemoryConfigStore};

// === Command initialization ===
pub use command_init::{StashRestore, StoryCommandInit, StoryContext};

// === Selection and deletion ===
pub use deletion::{DeletionPolicy, DeletionReport};
pub use index_parser::IndexParser;
pub use selection::{Selection, SelectionKind, SelectionMenu};

// === Interactive I/O ===
pub use prompt::{Prompt, ScriptedPrompt, StdinPrompt};

// === State management ===
pub use state::{RecentBranch, RecentBranchStore};

// === Output formatting ===
pub use output::{
    print_detail, print_error, print_info, print_section_header, print_success, print_warning,
};
