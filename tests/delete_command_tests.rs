use predicates::prelude::*;
use std::time::Duration;

mod common;
use common::{assertions, fixtures::*, repository::*};

#[cfg(test)]
mod delete_command_tests {
    use super::*;

    #[test]
    fn test_nothing_to_delete() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete", "-p", "nomatch"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to delete"));

        Ok(())
    }

    #[test]
    fn test_pattern_is_required() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete"])
            .assert()
            .code(1)
            .stdout(assertions::story_error("--pattern"));

        Ok(())
    }

    #[test]
    fn test_pattern_is_checked_before_database_connect() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        // non-routable address: a connection attempt would hang until the timeout
        git(&repo.path, &["config", "story.hosteddb.host", "10.255.255.1"])?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete"])
            .timeout(Duration::from_secs(3))
            .assert()
            .code(1)
            .stdout(assertions::story_error("--pattern"));

        Ok(())
    }

    #[test]
    fn test_invalid_pattern_is_reported() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete", "-p", "("])
            .assert()
            .code(1)
            .stdout(assertions::story_error("Invalid pattern `(`"));

        Ok(())
    }

    #[test]
    fn test_delete_story_1234_first_branch() -> anyhow::Result<()> {
        let repo = create_story_branches_repo()?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "d", "-p", "1234"])
            .write_stdin("1\n")
            .assert()
            .success()
            .stdout(assertions::menu_item(1, "feature/1234-x"))
            .stdout(assertions::menu_item(2, "feature/1234-y"))
            .stdout(predicate::str::contains("[3]").not())
            .stdout(predicate::str::contains("feature/999").not());

        let remaining = git(&repo.path, &["branch", "--list", "feature/*"])?;
        assert!(!remaining.contains("feature/1234-x"));
        assert!(remaining.contains("feature/1234-y"));
        assert!(remaining.contains("feature/999"));

        Ok(())
    }

    #[test]
    fn test_unreachable_database_offers_no_databases() -> anyhow::Result<()> {
        let repo = create_story_branches_repo()?;
        git(&repo.path, &["config", "story.hosteddb.host", "127.0.0.1"])?;
        git(&repo.path, &["config", "story.hosteddb.port", "9"])?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete", "-p", "1234"])
            .write_stdin("\n")
            .assert()
            .success()
            .stdout(assertions::menu_item(2, "feature/1234-y"))
            .stdout(predicate::str::contains("Databases").not());

        Ok(())
    }

    #[test]
    fn test_invalid_choices_are_reported() -> anyhow::Result<()> {
        let repo = create_story_branches_repo()?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete", "-p", "1234"])
            .write_stdin("2 abc 7\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Ignored invalid choices: abc 7"));

        let remaining = git(&repo.path, &["branch", "--list", "feature/1234*"])?;
        assert!(remaining.contains("feature/1234-x"));
        assert!(!remaining.contains("feature/1234-y"));

        Ok(())
    }

    #[test]
    fn test_stashes_are_offered_after_branches() -> anyhow::Result<()> {
        let repo = create_story_branches_repo()?;
        create_file(&repo.path, "spike.txt", "spike\n")?;
        git(&repo.path, &["stash", "push", "-u", "-m", "spike for 1234"])?;
        let sandbox = Sandbox::new()?;

        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete", "-p", "1234"])
            .write_stdin("3\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Stashes"))
            .stdout(assertions::menu_item(3, "On main: spike for 1234"));

        assert!(git(&repo.path, &["stash", "list"])?.trim().is_empty());
        assert_eq!(
            git(&repo.path, &["branch", "--list", "feature/1234*"])?
                .lines()
                .count(),
            2
        );

        Ok(())
    }

    #[test]
    fn test_failed_branch_deletion_exits_non_zero() -> anyhow::Result<()> {
        let repo = create_story_branches_repo()?;
        git(&repo.path, &["checkout", "feature/1234-x"])?;
        let sandbox = Sandbox::new()?;

        // the checked out branch cannot be deleted, the other one still is
        sandbox
            .gitcli(&repo.path)?
            .args(["story", "delete", "-p", "1234"])
            .write_stdin("1 2\n")
            .assert()
            .code(1)
            .stdout(assertions::story_error("Deletion finished with 1 failure(s)"));

        let remaining = git(&repo.path, &["branch", "--list", "feature/1234*"])?;
        assert!(remaining.contains("feature/1234-x"));
        assert!(!remaining.contains("feature/1234-y"));

        Ok(())
    }
}
