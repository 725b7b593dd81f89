//! Deletion loops for the resources chosen in the delete workflow.
//!
//! Each resource kind is deleted under an explicit [`DeletionPolicy`]. Branches
//! and stashes are deleted best-effort: a failure is recorded and the loop moves
//! on. Databases are dropped fail-fast: the first failure stops the loop and the
//! remaining names are recorded as skipped.

use crate::core::{
    config::DEFAULT_REMOTE,
    database::DatabaseGateway,
    error::{Result, StoryError},
    git::{BranchKind, RemoteAuth, StashEntry, StoryRepo},
    selection::SelectionKind,
};
use git2::Oid;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    BestEffort,
    FailFast,
}

/// Outcome of one deletion loop
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    /// Item label and the error message
    pub failed: Vec<(String, String)>,
    /// Items never attempted because an earlier one failed
    pub skipped: Vec<String>,
}

impl DeletionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run `delete` over `items` under `policy`
pub fn run_deletions<T, L, D>(
    items: impl IntoIterator<Item = T>,
    policy: DeletionPolicy,
    label: L,
    mut delete: D,
) -> DeletionReport
where
    L: Fn(&T) -> String,
    D: FnMut(&T) -> Result<()>,
{
    let mut report = DeletionReport::default();
    let mut items = items.into_iter();

    while let Some(item) = items.next() {
        let name = label(&item);
        match delete(&item) {
            Ok(()) => {
                log::debug!("Deleted {name}");
                report.deleted.push(name);
            }
            Err(e) => {
                log::warn!("Failed to delete {name}: {e}");
                report.failed.push((name, e.to_string()));
                if policy == DeletionPolicy::FailFast {
                    report.skipped.extend(items.by_ref().map(|rest| label(&rest)));
                    break;
                }
            }
        }
    }

    report
}

pub trait BranchRemover {
    /// Delete the local branch and, where one exists, its remote counterpart
    fn remove_branch(&mut self, name: &str) -> Result<()>;
}

/// Removes branches from a repository and from `origin`.
///
/// The remote is resolved once; without it only local branches are deleted.
pub struct RepoBranchRemover<'a> {
    repo: &'a mut StoryRepo,
    auth: &'a RemoteAuth,
    remote: Option<String>,
}

impl<'a> RepoBranchRemover<'a> {
    pub fn new(repo: &'a mut StoryRepo, auth: &'a RemoteAuth) -> Self {
        let remote = match repo.remote_url(DEFAULT_REMOTE) {
            Ok(url) => {
                log::debug!("Deleting remote branches from {DEFAULT_REMOTE} ({url})");
                Some(DEFAULT_REMOTE.to_string())
            }
            Err(e) => {
                log::warn!("{e}; only local branches will be deleted");
                None
            }
        };
        Self { repo, auth, remote }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }
}

impl BranchRemover for RepoBranchRemover<'_> {
    fn remove_branch(&mut self, name: &str) -> Result<()> {
        self.repo.delete_local_branch(name)?;

        if let Some(remote) = &self.remote {
            let tracking = format!("{remote}/{name}");
            if self.repo.branch_exists(&tracking, BranchKind::Remote) {
                self.repo
                    .push(remote, &format!(":refs/heads/{name}"), self.auth)?;
            }
        }
        Ok(())
    }
}

/// Stash list operations needed to drop stashes by identity
pub trait StashStore {
    fn stash_index_of(&mut self, id: Oid) -> Result<Option<usize>>;

    fn drop_stash(&mut self, index: usize) -> Result<()>;
}

impl StashStore for StoryRepo {
    fn stash_index_of(&mut self, id: Oid) -> Result<Option<usize>> {
        StoryRepo::stash_index_of(self, id)
    }

    fn drop_stash(&mut self, index: usize) -> Result<()> {
        StoryRepo::drop_stash(self, index)
    }
}

pub fn delete_branches(remover: &mut dyn BranchRemover, names: &BTreeSet<String>) -> DeletionReport {
    run_deletions(
        names,
        SelectionKind::Branch.deletion_policy(),
        |name| name.to_string(),
        |name| remover.remove_branch(name),
    )
}

/// Drop stashes from the highest recorded index down, locating each one by its
/// commit id right before it is dropped
pub fn delete_stashes(
    store: &mut dyn StashStore,
    stashes: &BTreeMap<usize, StashEntry>,
) -> DeletionReport {
    run_deletions(
        stashes.values().rev(),
        SelectionKind::Stash.deletion_policy(),
        |stash| stash.message.clone(),
        |stash| {
            let index = store
                .stash_index_of(stash.id)?
                .ok_or_else(|| StoryError::stash_not_found(stash.id))?;
            store.drop_stash(index)
        },
    )
}

pub fn drop_databases(
    gateway: &mut dyn DatabaseGateway,
    names: &BTreeSet<String>,
) -> DeletionReport {
    run_deletions(
        names,
        SelectionKind::Database.deletion_policy(),
        |name| name.to_string(),
        |name| gateway.drop_database(name),
    )
}
