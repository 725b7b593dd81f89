//! gitcli - a git extension that automates the per-ticket story workflow.
//!
//! A story is a unit of work tracked by an issue number. gitcli creates the
//! story branch from a configured source, switches between stories while
//! keeping their uncommitted work stashed, pulls the source branch in, opens
//! the pull request and finally deletes the story's branches, stashes and
//! databases.
//!
//! # Public API
//! The workflows live in [`commands`]; the building blocks they share are
//! re-exported from [`core`].

pub mod commands;
pub mod core;

pub use core::{
    ConfigChain, Prompt, RecentBranchStore, Result, SelectionMenu, StoryCommandInit,
    StoryContext, StoryError, StoryRepo,
};
