//! Source branch resolution and the small parsers shared by the workflows.

use crate::core::{
    config::{self, ConfigChain, DEFAULT_REMOTE},
    error::{Result, StoryError},
};
use regex::Regex;

pub const DEFAULT_ISSUE_PATTERN: &str = r"(?:feature|bugfix)/(?P<issue>[0-9]+)(?:-.*)?";

/// A `[remote/]branch` reference to a remote-tracking branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub remote: String,
    pub branch: String,
}

impl SourceRef {
    /// Split at the first `/`; without one the remote is `origin`
    pub fn parse(value: &str) -> Self {
        match value.split_once('/') {
            Some((remote, branch)) if !remote.is_empty() && !branch.is_empty() => Self {
                remote: remote.to_string(),
                branch: branch.to_string(),
            },
            _ => Self {
                remote: DEFAULT_REMOTE.to_string(),
                branch: value.trim_matches('/').to_string(),
            },
        }
    }

    /// `<remote>/<branch>`, the remote-tracking branch name
    pub fn tracking_name(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

/// Resolve a source alias through `story.source.<name>`, falling back to
/// `story.source.default`
pub fn lookup_branch_source(config: &ConfigChain, name: Option<&str>) -> Result<String> {
    let named_key = name
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("{}.{}", config::SOURCE_PREFIX, n.trim()));

    if let Some(key) = &named_key {
        if let Some(value) = config.lookup(key) {
            return Ok(value);
        }
        log::debug!("{key} is not set, trying {}", config::SOURCE_DEFAULT);
    }

    config.lookup(config::SOURCE_DEFAULT).ok_or_else(|| match named_key {
        Some(key) => StoryError::config_missing(format!("{key}` or `{}", config::SOURCE_DEFAULT)),
        None => StoryError::config_missing(config::SOURCE_DEFAULT),
    })
}

/// Owner and repository name of a hosted remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Accepts `git@host:owner/repo.git` and `https://host/owner/repo(.git)`
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let slug = Regex::new(r"^(?:[^@/]+@[^:/]+:|[a-z+]+://[^/]+/)(?:[^/]+/)*?([^/:]+)/([^/]+?)(?:\.git)?/?$")
            .map_err(|e| StoryError::invalid_pattern("remote url", e))?;

        let captures = slug
            .captures(url.trim())
            .ok_or_else(|| StoryError::invalid_remote_url(url))?;
        Ok(Self {
            owner: captures[1].to_string(),
            name: captures[2].to_string(),
        })
    }
}

/// Issue number of `branch` according to `pattern`: the `issue` group when
/// the pattern names one, else the first capture group made of digits only
pub fn extract_issue(branch: &str, pattern: &str) -> Result<String> {
    let regex = Regex::new(pattern).map_err(|e| StoryError::invalid_pattern(pattern, e))?;
    let captures = regex
        .captures(branch)
        .ok_or_else(|| StoryError::issue_not_found(branch, pattern))?;

    if let Some(issue) = captures.name("issue") {
        return Ok(issue.as_str().to_string());
    }

    captures
        .iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .find(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .ok_or_else(|| StoryError::issue_not_found(branch, pattern))
}

/// Compile a user pattern so that it matches anywhere in a name
pub fn wrap_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^.*{pattern}.*$")).map_err(|e| StoryError::invalid_pattern(pattern, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MemoryConfigStore;

    #[test]
    fn test_source_ref_with_remote() {
        let source = SourceRef::parse("upstream/develop");
        assert_eq!(source.remote, "upstream");
        assert_eq!(source.branch, "develop");
        assert_eq!(source.tracking_name(), "upstream/develop");
    }

    #[test]
    fn test_source_ref_defaults_to_origin() {
        let source = SourceRef::parse("develop");
        assert_eq!(source.remote, "origin");
        assert_eq!(source.tracking_name(), "origin/develop");
    }

    #[test]
    fn test_source_ref_keeps_nested_branch() {
        let source = SourceRef::parse("origin/release/2.0");
        assert_eq!(source.remote, "origin");
        assert_eq!(source.branch, "release/2.0");
    }

    #[test]
    fn test_lookup_named_source_then_default() -> Result<()> {
        let config = ConfigChain::new(vec![Box::new(
            MemoryConfigStore::new()
                .with("story.source.hotfix", "origin/master")
                .with(config::SOURCE_DEFAULT, "origin/develop"),
        )]);
        assert_eq!(lookup_branch_source(&config, Some("hotfix"))?, "origin/master");
        assert_eq!(lookup_branch_source(&config, Some("other"))?, "origin/develop");
        assert_eq!(lookup_branch_source(&config, None)?, "origin/develop");
        Ok(())
    }

    #[test]
    fn test_lookup_source_missing_names_both_keys() {
        let config = ConfigChain::new(vec![Box::new(MemoryConfigStore::new())]);
        let err = lookup_branch_source(&config, Some("hotfix")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("story.source.hotfix"));
        assert!(message.contains("story.source.default"));
    }

    #[test]
    fn test_repo_slug_from_ssh_url() -> Result<()> {
        let slug = RepoSlug::from_remote_url("git@github.com:kidonchu/gitcli.git")?;
        assert_eq!(slug.owner, "kidonchu");
        assert_eq!(slug.name, "gitcli");
        Ok(())
    }

    #[test]
    fn test_repo_slug_from_https_url() -> Result<()> {
        let slug = RepoSlug::from_remote_url("https://github.com/acme/widgets")?;
        assert_eq!(slug, RepoSlug { owner: "acme".into(), name: "widgets".into() });

        let slug = RepoSlug::from_remote_url("ssh://git@github.com/acme/widgets.git")?;
        assert_eq!(slug.owner, "acme");
        assert_eq!(slug.name, "widgets");
        Ok(())
    }

    #[test]
    fn test_repo_slug_rejects_local_path() {
        let err = RepoSlug::from_remote_url("/tmp/remote").unwrap_err();
        assert!(matches!(err, StoryError::InvalidRemoteUrl { .. }));
    }

    #[test]
    fn test_extract_issue_default_pattern() -> Result<()> {
        assert_eq!(extract_issue("feature/1234-login", DEFAULT_ISSUE_PATTERN)?, "1234");
        assert_eq!(extract_issue("bugfix/77", DEFAULT_ISSUE_PATTERN)?, "77");
        Ok(())
    }

    #[test]
    fn test_extract_issue_first_numeric_group() -> Result<()> {
        assert_eq!(extract_issue("story-ABC-991", r"(story)-(ABC)-([0-9]+)")?, "991");
        Ok(())
    }

    #[test]
    fn test_extract_issue_no_match() {
        let err = extract_issue("main", DEFAULT_ISSUE_PATTERN).unwrap_err();
        assert!(err.to_string().contains("Not a valid branch to merge"));
    }

    #[test]
    fn test_wrap_pattern() -> Result<()> {
        let regex = wrap_pattern("1234")?;
        assert!(regex.is_match("feature/1234-x"));
        assert!(!regex.is_match("feature/999"));

        let err = wrap_pattern("(").unwrap_err();
        assert!(matches!(err, StoryError::InvalidPattern { ref pattern, .. } if pattern == "("));
        Ok(())
    }
}
