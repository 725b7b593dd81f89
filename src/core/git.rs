//! Git repository operations used by the story workflows.
//!
//! This module provides a high-level interface to git operations through the
//! [`StoryRepo`] struct. It wraps the `git2` library: branch, stash and remote
//! lookups, fetch and push with credential callbacks, checkout, stash save/pop/drop
//! and merging a remote-tracking branch into HEAD.
//!
//! # Public API
//! - [`StoryRepo`]: Main interface for repository operations
//! - [`StashEntry`]: A stash as seen in one snapshot of the stash list
//! - [`BranchKind`]: Local or remote-tracking branch namespace
//! - [`RemoteAuth`]: SSH key paths used when a remote asks for credentials
//! - [`MergeOutcome`]: Result of merging a remote-tracking branch
//!
//! Branch lookups are memoised in a [`LookupCache`] owned by the repository handle.
//! The cache lives for one invocation and is flushed on every operation that moves refs.

use crate::core::error::{Result, StoryError};
use git2::{
    build::CheckoutBuilder, BranchType, Cred, CredentialType, FetchOptions, Oid, PushOptions,
    RemoteCallbacks, Repository, Signature, StashFlags, StatusOptions,
};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Local,
    Remote,
}

impl BranchKind {
    fn as_git2(self) -> BranchType {
        match self {
            BranchKind::Local => BranchType::Local,
            BranchKind::Remote => BranchType::Remote,
        }
    }
}

/// A stash entry. `index` is only meaningful for the snapshot it was read from;
/// `id` identifies the stash across drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    pub index: usize,
    pub id: Oid,
    pub message: String,
}

#[derive(Debug, Default, Clone)]
pub struct RemoteAuth {
    pub public_key: Option<PathBuf>,
    pub private_key: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    UpToDate,
    Merged { commit: Oid, message: String },
}

#[derive(Debug, Default)]
struct LookupCache {
    branches: HashMap<(String, BranchKind), Oid>,
    remote_urls: HashMap<String, String>,
}

pub struct StoryRepo {
    repo: Repository,
    cache: LookupCache,
}

impl StoryRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(StoryRepo {
            repo,
            cache: LookupCache::default(),
        })
    }

    pub fn get_repository(&self) -> &Repository {
        &self.repo
    }

    /// The `.git` metadata directory
    pub fn get_repo_path(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    pub fn get_current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(StoryError::DetachedHead);
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| StoryError::invalid_utf8("HEAD branch name"))
    }

    /// Like [`StoryRepo::get_current_branch`], with `None` for a detached HEAD
    pub fn head_branch(&self) -> Result<Option<String>> {
        match self.get_current_branch() {
            Ok(name) => Ok(Some(name)),
            Err(StoryError::DetachedHead) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Names of branches of `kind` matching `pattern`, sorted
    pub fn find_branches(&self, pattern: &Regex, kind: BranchKind) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for item in self.repo.branches(Some(kind.as_git2()))? {
            let (branch, _) = item?;
            let Some(name) = branch.name()? else {
                log::warn!("Skipping branch with non UTF-8 name");
                continue;
            };
            if pattern.is_match(name) {
                names.push(name.to_string());
            }
        }
        names.sort();
        log::debug!("find_branches({pattern}, {kind:?}) -> {names:?}");
        Ok(names)
    }

    pub fn resolve_branch(&mut self, name: &str, kind: BranchKind) -> Result<Oid> {
        let key = (name.to_string(), kind);
        if let Some(oid) = self.cache.branches.get(&key) {
            return Ok(*oid);
        }

        let branch = self.repo.find_branch(name, kind.as_git2()).map_err(|e| {
            log::debug!("find_branch({name}, {kind:?}) failed: {e}");
            StoryError::branch_not_found(name)
        })?;
        let oid = branch.get().peel_to_commit()?.id();

        self.cache.branches.insert(key, oid);
        Ok(oid)
    }

    pub fn branch_exists(&mut self, name: &str, kind: BranchKind) -> bool {
        self.resolve_branch(name, kind).is_ok()
    }

    /// URL of a configured remote; fails when the remote does not exist
    pub fn remote_url(&mut self, name: &str) -> Result<String> {
        if let Some(url) = self.cache.remote_urls.get(name) {
            return Ok(url.clone());
        }

        let remote = self
            .repo
            .find_remote(name)
            .map_err(|_| StoryError::remote_not_found(name))?;
        let url = remote
            .url()
            .ok_or_else(|| StoryError::invalid_utf8(format!("url of remote `{name}`")))?
            .to_string();

        self.cache.remote_urls.insert(name.to_string(), url.clone());
        Ok(url)
    }

    /// Number of changed, staged and untracked entries in the working tree
    pub fn count_changes(&self) -> Result<usize> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.include_ignored(false);
        Ok(self.repo.statuses(Some(&mut opts))?.len())
    }

    /// Stash every change including untracked files. Returns `None` when the
    /// working tree is clean.
    pub fn stash_changes(&mut self, stasher: &Signature, message: &str) -> Result<Option<Oid>> {
        let changed = self.count_changes()?;
        if changed == 0 {
            log::debug!("Nothing to stash");
            return Ok(None);
        }

        log::debug!("Stashing {changed} changed entries as `{message}`");
        let oid = self
            .repo
            .stash_save(stasher, message, Some(StashFlags::INCLUDE_UNTRACKED))?;
        Ok(Some(oid))
    }

    pub fn stash_entries(&mut self) -> Result<Vec<StashEntry>> {
        let mut entries = Vec::new();
        self.repo.stash_foreach(|index, message, id| {
            entries.push(StashEntry {
                index,
                id: *id,
                message: message.to_string(),
            });
            true
        })?;
        Ok(entries)
    }

    /// Stashes whose message matches `pattern`, in index order
    pub fn find_stashes(&mut self, pattern: &Regex) -> Result<Vec<StashEntry>> {
        Ok(self
            .stash_entries()?
            .into_iter()
            .filter(|stash| pattern.is_match(&stash.message))
            .collect())
    }

    /// Current position of the stash with commit `id`
    pub fn stash_index_of(&mut self, id: Oid) -> Result<Option<usize>> {
        Ok(self
            .stash_entries()?
            .into_iter()
            .find(|stash| stash.id == id)
            .map(|stash| stash.index))
    }

    pub fn pop_stash(&mut self, index: usize) -> Result<()> {
        self.repo.stash_pop(index, None)?;
        Ok(())
    }

    pub fn drop_stash(&mut self, index: usize) -> Result<()> {
        self.repo.stash_drop(index)?;
        Ok(())
    }

    /// Point HEAD at `refs/heads/<name>` and force the working tree to match
    pub fn checkout_branch(&mut self, name: &str) -> Result<()> {
        let refname = format!("refs/heads/{name}");
        self.repo
            .find_reference(&refname)
            .map_err(|_| StoryError::branch_not_found(name))?;

        self.repo.set_head(&refname)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout))?;
        Ok(())
    }

    /// Create local branch `name` at the commit of remote-tracking branch
    /// `source`. An existing local branch is reused; returns whether one was created.
    pub fn create_branch_from(&mut self, name: &str, source: &str) -> Result<bool> {
        if self.repo.find_branch(name, BranchType::Local).is_ok() {
            log::info!("Local branch `{name}` already exists, reusing it");
            return Ok(false);
        }

        let source_branch = self
            .repo
            .find_branch(source, BranchType::Remote)
            .map_err(|_| StoryError::branch_not_found(source))?;
        let commit = source_branch.get().peel_to_commit()?;
        self.repo.branch(name, &commit, false)?;

        self.cache.branches.clear();
        Ok(true)
    }

    pub fn delete_local_branch(&mut self, name: &str) -> Result<()> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|_| StoryError::branch_not_found(name))?;
        branch.delete()?;

        self.cache.branches.clear();
        Ok(())
    }

    pub fn set_upstream(&mut self, branch_name: &str, remote: &str) -> Result<()> {
        let upstream = format!("{remote}/{branch_name}");
        let mut branch = self
            .repo
            .find_branch(branch_name, BranchType::Local)
            .map_err(|_| StoryError::branch_not_found(branch_name))?;
        branch
            .set_upstream(Some(&upstream))
            .map_err(|e| StoryError::upstream_failed(&upstream, e))?;
        Ok(())
    }

    pub fn fetch(&mut self, remote_name: &str, auth: &RemoteAuth) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| StoryError::remote_not_found(remote_name))?;

        let mut options = FetchOptions::new();
        options.remote_callbacks(remote_callbacks(auth));
        remote.fetch(&[] as &[&str], Some(&mut options), None)?;

        self.cache.branches.clear();
        Ok(())
    }

    /// Push a single refspec. Refs rejected by the remote are reported as failures.
    pub fn push(&mut self, remote_name: &str, refspec: &str, auth: &RemoteAuth) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| StoryError::remote_not_found(remote_name))?;

        let rejected: RefCell<Option<String>> = RefCell::new(None);
        let mut callbacks = remote_callbacks(auth);
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                *rejected.borrow_mut() = Some(format!("{refname}: {message}"));
            }
            Ok(())
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);
        remote
            .push(&[refspec], Some(&mut options))
            .map_err(|e| StoryError::push_failed(remote_name, refspec, e))?;
        drop(options);

        if let Some(message) = rejected.into_inner() {
            return Err(StoryError::push_failed(
                remote_name,
                refspec,
                git2::Error::from_str(&message),
            ));
        }

        self.cache.branches.clear();
        Ok(())
    }

    /// Merge `refs/remotes/<tracking>` into the checked out branch
    pub fn merge_remote_branch(
        &mut self,
        tracking: &str,
        signature: &Signature,
    ) -> Result<MergeOutcome> {
        let refname = format!("refs/remotes/{tracking}");
        let remote_ref = self
            .repo
            .find_reference(&refname)
            .map_err(|_| StoryError::branch_not_found(tracking))?;
        let annotated = self.repo.reference_to_annotated_commit(&remote_ref)?;

        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;
        log::debug!("merge analysis for {tracking}: {:?}", analysis);

        if analysis.is_up_to_date() {
            return Ok(MergeOutcome::UpToDate);
        }
        if !analysis.is_normal() {
            return Err(StoryError::UnexpectedMergeAnalysis {
                bits: analysis.bits(),
            });
        }

        self.repo.merge(&[&annotated], None, None)?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            return Err(StoryError::MergeConflicts);
        }

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let head = self.repo.head()?;
        let local_commit = head.peel_to_commit()?;
        let remote_commit = remote_ref.peel_to_commit()?;

        let local_name = head.shorthand().unwrap_or("HEAD");
        let message = format!("Merge branch '{tracking}' into '{local_name}'");
        let commit = self.repo.commit(
            Some("HEAD"),
            signature,
            signature,
            &message,
            &tree,
            &[&local_commit, &remote_commit],
        )?;

        self.repo.cleanup_state()?;
        self.cache.branches.clear();
        Ok(MergeOutcome::Merged { commit, message })
    }
}

fn remote_callbacks(auth: &RemoteAuth) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication failed for {url}"
            )));
        }

        let username = username_from_url.unwrap_or("git");
        if allowed.contains(CredentialType::SSH_KEY) {
            if let Some(private_key) = &auth.private_key {
                log::debug!("Using SSH key {} for {url}", private_key.display());
                return Cred::ssh_key(username, auth.public_key.as_deref(), private_key, None);
            }
            log::debug!("Using SSH agent for {url}");
            return Cred::ssh_key_from_agent(username);
        }
        if allowed.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }
        Err(git2::Error::from_str(&format!(
            "no supported credential type for {url}"
        )))
    });
    callbacks
}
