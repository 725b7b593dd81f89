//! Predefined repository scenarios
//!
//! Provides repositories in the states the story workflows are usually run in.

#![allow(dead_code)]

use super::repository::*;
use gitcli::core::error::Result;

/// Scenario: two branches for story 1234 and one for another story
pub fn create_story_branches_repo() -> Result<TestRepo> {
    let repo = setup_test_repo_with_initial_commit()?;
    create_branches(&repo.path, &["feature/1234-x", "feature/1234-y", "feature/999"])?;
    Ok(repo)
}

/// Scenario: repository with a bare `origin` and `story.source.default` pointing
/// at `origin/main`. Returns `(repository, remote)`.
pub fn create_story_repo_with_remote() -> Result<(TestRepo, TestRepo)> {
    let (repo, remote) = setup_repo_with_remote()?;
    git(&repo.path, &["config", "story.source.default", "origin/main"])?;
    Ok((repo, remote))
}
