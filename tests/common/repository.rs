//! Git repository management and setup utilities
//!
//! Provides functions for creating test repositories, bare remotes and an
//! isolated environment to run the `gitcli` binary in.

#![allow(dead_code)]

use gitcli::core::error::{Result, StoryError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test repository setup result containing both the temporary directory
/// and the repository path. The TempDir must be kept alive for the duration
/// of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    /// Get the repository path as a reference
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Runs git in `repo_path`, failing when git exits unsuccessfully
pub fn git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(StoryError::Io)?;
    if !output.status.success() {
        return Err(StoryError::Io(std::io::Error::other(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ))));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Sets up a fresh git repository on `main` with a test identity
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new().map_err(StoryError::Io)?;
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "--initial-branch=main"])?;
    configure_identity(&repo_path)?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

fn configure_identity(repo_path: &Path) -> Result<()> {
    git(repo_path, &["config", "user.name", "Test User"])?;
    git(repo_path, &["config", "user.email", "test@example.com"])?;
    git(repo_path, &["config", "commit.gpgsign", "false"])?;
    Ok(())
}

/// Sets up a git repository with an initial commit containing "initial.txt"
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git(&repo.path, &["add", "initial.txt"])?;
    git(&repo.path, &["commit", "-m", "Initial commit"])?;

    Ok(repo)
}

/// A working repository whose `origin` is a bare repository holding `main`.
/// Returns `(repository, remote)`.
pub fn setup_repo_with_remote() -> Result<(TestRepo, TestRepo)> {
    let remote_dir = TempDir::new().map_err(StoryError::Io)?;
    let remote_path = remote_dir.path().to_path_buf();
    git(&remote_path, &["init", "--bare", "--initial-branch=main"])?;

    let repo = setup_test_repo_with_initial_commit()?;
    git(&repo.path, &["remote", "add", "origin", &remote_path.to_string_lossy()])?;
    git(&repo.path, &["push", "-u", "origin", "main"])?;

    Ok((
        repo,
        TestRepo {
            temp_dir: remote_dir,
            path: remote_path,
        },
    ))
}

/// Commits `filename` to `main` of the bare repository through a throwaway clone
pub fn push_upstream_commit(remote_path: &Path, filename: &str, content: &str) -> Result<()> {
    let clone_dir = TempDir::new().map_err(StoryError::Io)?;
    git(clone_dir.path(), &["clone", &remote_path.to_string_lossy(), "clone"])?;
    let clone_path = clone_dir.path().join("clone");

    configure_identity(&clone_path)?;
    create_file(&clone_path, filename, content)?;
    git(&clone_path, &["add", filename])?;
    git(&clone_path, &["commit", "-m", "Upstream change"])?;
    git(&clone_path, &["push", "origin", "main"])?;
    Ok(())
}

/// Creates a file with specified content in the repository
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    fs::write(repo_path.join(filename), content).map_err(StoryError::Io)?;
    Ok(())
}

/// Creates local branches at HEAD
pub fn create_branches(repo_path: &Path, names: &[&str]) -> Result<()> {
    for name in names {
        git(repo_path, &["branch", name])?;
    }
    Ok(())
}

pub fn current_branch(repo_path: &Path) -> Result<String> {
    Ok(git(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])?
        .trim()
        .to_string())
}

/// Isolated home directory so neither the user's global git config nor their
/// cache directory leak into a test
pub struct Sandbox {
    pub home: TempDir,
}

impl Sandbox {
    pub fn new() -> Result<Self> {
        Ok(Self {
            home: TempDir::new().map_err(StoryError::Io)?,
        })
    }

    /// `gitcli` invocation running in `repo_path`; answers are fed with `write_stdin`
    pub fn gitcli(&self, repo_path: &Path) -> anyhow::Result<assert_cmd::Command> {
        let mut cmd = assert_cmd::Command::cargo_bin("gitcli")?;
        cmd.current_dir(repo_path)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("XDG_CACHE_HOME", self.home.path().join(".cache"))
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env("NO_COLOR", "1")
            .env_remove("EDITOR")
            .env_remove("RUST_LOG");
        Ok(cmd)
    }
}
