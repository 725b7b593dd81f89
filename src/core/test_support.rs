//! Repository fixtures shared by the unit tests.

use crate::core::{
    command_init::StoryContext,
    error::{Result, StoryError},
    state::RecentBranchStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Keeps the temporary directory alive for the duration of a test
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn git(repo_path: &Path, args: &[&str]) -> Result<()> {
    git_output(repo_path, args).map(|_| ())
}

pub fn git_output(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;
    if !output.status.success() {
        return Err(StoryError::Io(std::io::Error::other(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ))));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn configure_identity(repo_path: &Path) -> Result<()> {
    git(repo_path, &["config", "user.name", "Test User"])?;
    git(repo_path, &["config", "user.email", "test@example.com"])?;
    git(repo_path, &["config", "commit.gpgsign", "false"])
}

pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().to_path_buf();
    git(&path, &["init", "--initial-branch=main"])?;
    configure_identity(&path)?;
    Ok(TestRepo { temp_dir, path })
}

pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    create_file(repo.path(), "initial.txt", "initial content\n")?;
    git(repo.path(), &["add", "initial.txt"])?;
    git(repo.path(), &["commit", "-m", "Initial commit"])?;
    Ok(repo)
}

/// A working repository whose `origin` is a bare repository holding `main`
pub fn setup_repo_with_remote() -> Result<(TestRepo, TestRepo)> {
    let remote_dir = TempDir::new()?;
    let remote_path = remote_dir.path().to_path_buf();
    git(&remote_path, &["init", "--bare", "--initial-branch=main"])?;
    let remote = TestRepo {
        temp_dir: remote_dir,
        path: remote_path,
    };

    let repo = setup_test_repo_with_initial_commit()?;
    let remote_url = remote.path().to_string_lossy().into_owned();
    git(repo.path(), &["remote", "add", "origin", &remote_url])?;
    git(repo.path(), &["push", "-u", "origin", "main"])?;
    Ok((repo, remote))
}

/// Commit `filename` on `main` of the bare repository at `remote_path` from a
/// throwaway clone
pub fn push_upstream_commit(remote_path: &Path, filename: &str, content: &str) -> Result<()> {
    let clone_dir = TempDir::new()?;
    let remote_url = remote_path.to_string_lossy().into_owned();
    git(clone_dir.path(), &["clone", &remote_url, "clone"])?;
    let clone_path = clone_dir.path().join("clone");
    configure_identity(&clone_path)?;
    create_file(&clone_path, filename, content)?;
    git(&clone_path, &["add", filename])?;
    git(&clone_path, &["commit", "-m", "Upstream change"])?;
    git(&clone_path, &["push", "origin", "main"])
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn read_file(repo_path: &Path, filename: &str) -> Result<String> {
    Ok(fs::read_to_string(repo_path.join(filename))?)
}

/// Story context for `repo` whose recent-branch file lives in the returned
/// directory instead of the user's cache
pub fn open_context(repo: &TestRepo) -> Result<(StoryContext, TempDir)> {
    let state_dir = TempDir::new()?;
    let ctx = StoryContext::open(repo.path())?
        .with_recent_store(RecentBranchStore::at(state_dir.path().join("recent_branch.json")));
    Ok((ctx, state_dir))
}
