//! Centralized initialization for the story commands.
//!
//! This module provides [`StoryCommandInit`] which handles the setup every story
//! workflow shares: locating the repository, layering its git config over the
//! global config and locating the most-recent-branch state file.
//!
//! # Public API
//! - [`StoryCommandInit`]: Initializer bound to the current directory
//! - [`StoryContext`]: Initialized context handed to the workflows
//! - [`StashRestore`]: What happened when restoring a branch's recorded stash

use crate::core::{
    config::{self, last_stash_key, ConfigChain},
    error::{Result, StoryError},
    git::{RemoteAuth, StoryRepo},
    state::RecentBranchStore,
};
use git2::{Oid, Signature};
use std::env;
use std::path::{Path, PathBuf};

/// Everything a story workflow needs, owned for one invocation
pub struct StoryContext {
    pub repo: StoryRepo,
    pub config: ConfigChain,
    pub recent: RecentBranchStore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StashRestore {
    /// No `laststash` marker for the branch
    NothingRecorded,
    /// The recorded stash is no longer in the stash list
    NotFound(String),
    Restored(Oid),
    /// Popping failed; the stash is kept and so is the marker
    Failed(String),
}

pub struct StoryCommandInit;

impl StoryCommandInit {
    /// Initialize from the current working directory
    pub fn initialize() -> Result<StoryContext> {
        let current_dir = env::current_dir()?;
        StoryContext::open(&current_dir)
    }
}

impl StoryContext {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = StoryRepo::open(path).map_err(|e| {
            log::debug!("Repository discovery from {} failed: {e}", path.display());
            StoryError::NotInGitRepo
        })?;
        let config = ConfigChain::for_repository(repo.get_repository())?;
        let recent = RecentBranchStore::for_repository(&repo.get_repo_path())?;
        log::debug!(
            "Story context for {} (recent branch file {})",
            repo.get_repo_path().display(),
            recent.path().display()
        );
        Ok(Self {
            repo,
            config,
            recent,
        })
    }

    /// Replace the most-recent-branch store, used to keep tests out of the
    /// user's cache directory
    pub fn with_recent_store(mut self, recent: RecentBranchStore) -> Self {
        self.recent = recent;
        self
    }

    /// Signature from `user.name`/`user.email`, falling back to libgit2's lookup
    pub fn signature(&self) -> Result<Signature<'static>> {
        match (
            self.config.lookup(config::USER_NAME),
            self.config.lookup(config::USER_EMAIL),
        ) {
            (Some(name), Some(email)) => Ok(Signature::now(&name, &email)?),
            _ => Ok(self.repo.get_repository().signature()?.to_owned()),
        }
    }

    pub fn remote_auth(&self) -> RemoteAuth {
        RemoteAuth {
            public_key: self.config.lookup(config::SSH_PUBLIC_KEY).map(|p| expand_home(&p)),
            private_key: self.config.lookup(config::SSH_PRIVATE_KEY).map(|p| expand_home(&p)),
        }
    }

    /// Stash the working tree of the current branch and remember the stash in
    /// `branch.<current>.laststash`. Clean trees are left alone, whatever HEAD is.
    pub fn stash_current_changes(&mut self) -> Result<Option<Oid>> {
        if self.repo.count_changes()? == 0 {
            log::debug!("Working tree is clean, nothing to stash");
            return Ok(None);
        }

        let branch = self.repo.get_current_branch()?;
        let signature = self.signature()?;

        let Some(oid) = self
            .repo
            .stash_changes(&signature, &format!("WIP on {branch}"))?
        else {
            return Ok(None);
        };

        self.config.set(&last_stash_key(&branch), &oid.to_string())?;
        log::debug!("Recorded stash {oid} for {branch}");
        Ok(Some(oid))
    }

    /// Pop the stash recorded for `branch`. The marker is cleared once the stash
    /// applied or when it no longer points at a stash; a failed pop keeps it.
    pub fn pop_recorded_stash(&mut self, branch: &str) -> Result<StashRestore> {
        let key = last_stash_key(branch);
        let Some(recorded) = self.config.lookup(&key) else {
            return Ok(StashRestore::NothingRecorded);
        };

        let index = match Oid::from_str(recorded.trim()) {
            Ok(oid) => self.repo.stash_index_of(oid)?.map(|index| (oid, index)),
            Err(e) => {
                log::warn!("Ignoring malformed {key} value `{recorded}`: {e}");
                None
            }
        };
        let Some((oid, index)) = index else {
            self.config.remove(&key)?;
            return Ok(StashRestore::NotFound(recorded));
        };

        if let Err(e) = self.repo.pop_stash(index) {
            log::warn!("Failed to pop stash@{{{index}}} ({oid}): {e}");
            return Ok(StashRestore::Failed(e.to_string()));
        }

        self.config.remove(&key)?;
        Ok(StashRestore::Restored(oid))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
