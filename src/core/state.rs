//! Persisted most-recent-branch marker.
//!
//! `story switch --recent` returns to the branch that was left by the previous
//! switch. The marker is the only piece of state kept outside git config; it is
//! stored as JSON in the per-repository state directory so that it survives
//! between invocations without touching the repository.

use crate::core::{
    dirs::get_repo_state_directory,
    error::{Result, StoryError},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const RECENT_BRANCH_FILE: &str = "recent_branch.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentBranch {
    pub branch: String,
    pub repo_path: PathBuf,
    pub switched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RecentBranchStore {
    path: PathBuf,
}

impl RecentBranchStore {
    /// Store located in the user cache directory for `repo_path`
    pub fn for_repository(repo_path: &Path) -> Result<Self> {
        let dir = get_repo_state_directory(repo_path)?;
        Ok(Self::at(dir.join(RECENT_BRANCH_FILE)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<RecentBranch>> {
        if !self.path.exists() {
            log::debug!("No recent branch file at {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            log::error!("Failed to read '{}': {}", self.path.display(), e);
            StoryError::state_read_failed(&self.path, e)
        })?;

        let recent: RecentBranch = serde_json::from_str(&content).map_err(|e| {
            log::error!("Failed to parse '{}': {}", self.path.display(), e);
            StoryError::state_parse_failed(&self.path, e)
        })?;

        if recent.branch.is_empty() {
            return Ok(None);
        }
        Ok(Some(recent))
    }

    pub fn save(&self, branch: &str, repo_path: &Path) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| StoryError::state_directory_creation_failed(dir, e))?;
        }

        let recent = RecentBranch {
            branch: branch.to_string(),
            repo_path: repo_path.to_path_buf(),
            switched_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&recent)?;
        fs::write(&self.path, json).map_err(|e| StoryError::state_write_failed(&self.path, e))?;

        log::debug!("Recorded most recent branch `{branch}`");
        Ok(())
    }
}
