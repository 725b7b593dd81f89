use crate::core::{
    config::{self, branch_remote_key, DEFAULT_REMOTE},
    editor::{edit_in_editor, open_in_browser, resolve_editor},
    error::{Result, StoryError},
    print_detail, print_info, print_section_header, print_success, print_warning,
    pull_request::{PullRequestClient, PullRequestRequest, DEFAULT_API_URL},
    source::{extract_issue, lookup_branch_source, RepoSlug, SourceRef, DEFAULT_ISSUE_PATTERN},
    StoryCommandInit, StoryContext,
};
use std::fs;
use std::io;
use std::path::Path;

const TITLE_FILE: &str = "PR_TITLE_MESSAGE";
const BODY_FILE: &str = "PR_BODY_MESSAGE";

/// Where the pull request goes and what it is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestPlan {
    /// Repository receiving the pull request
    pub base: RepoSlug,
    pub base_branch: String,
    pub compare_branch: String,
    /// `<owner>:<branch>` of the compare branch
    pub head: String,
    pub issue: String,
}

pub fn execute_pull_request_story(source: Option<String>) -> Result<()> {
    let mut ctx = StoryCommandInit::initialize()?;
    run_pull_request_story(&mut ctx, source.as_deref())?;
    Ok(())
}

/// Resolve both ends of the pull request and the issue number
pub fn plan_pull_request(ctx: &mut StoryContext, source: Option<&str>) -> Result<PullRequestPlan> {
    let source = SourceRef::parse(&lookup_branch_source(&ctx.config, source)?);
    let base = RepoSlug::from_remote_url(&ctx.repo.remote_url(&source.remote)?)?;

    let compare_branch = ctx.repo.get_current_branch()?;
    let compare_remote = ctx
        .config
        .lookup_or(&branch_remote_key(&compare_branch), DEFAULT_REMOTE);
    let compare = RepoSlug::from_remote_url(&ctx.repo.remote_url(&compare_remote)?)?;

    let pattern = ctx
        .config
        .lookup_or(config::ISSUE_BRANCH_PATTERN, DEFAULT_ISSUE_PATTERN);
    let issue = extract_issue(&compare_branch, &pattern)?;

    Ok(PullRequestPlan {
        base,
        base_branch: source.branch,
        head: format!("{}:{}", compare.owner, compare_branch),
        compare_branch,
        issue,
    })
}

pub fn compose_title(title: &str, issue_prefix: &str, issue: &str) -> String {
    format!("{title} [{issue_prefix}{issue}]")
}

/// Write the title and body in the editor, open the pull request and show it
pub fn run_pull_request_story(ctx: &mut StoryContext, source: Option<&str>) -> Result<String> {
    let plan = plan_pull_request(ctx, source)?;
    let token = ctx.config.require(config::OAUTH_TOKEN)?;

    print_section_header("Pull request");
    print_detail("Into", &format!("{}/{}:{}", plan.base.owner, plan.base.name, plan.base_branch));
    print_detail("From", &plan.head);
    print_detail("Issue", &plan.issue);

    let editor = resolve_editor(&ctx.config);
    let git_dir = ctx.repo.get_repo_path();
    let title_path = git_dir.join(TITLE_FILE);
    let body_path = git_dir.join(BODY_FILE);

    let title = edit_in_editor(&editor, &title_path)?;
    if title.is_empty() {
        return Err(StoryError::EmptyTitle);
    }
    let body = edit_in_editor(&editor, &body_path)?;

    let prefix = ctx.config.lookup(config::ISSUE_PREFIX).unwrap_or_default();
    let request = PullRequestRequest {
        title: compose_title(&title, &prefix, &plan.issue),
        body,
        head: plan.head.clone(),
        base: plan.base_branch.clone(),
    };

    print_info("Be patient...");
    let api_url = ctx.config.lookup_or(config::API_URL, DEFAULT_API_URL);
    let client = PullRequestClient::new(&api_url, &token)?;
    let url = client.create(&plan.base.owner, &plan.base.name, &request)?;
    print_success(&format!("Created pull request {url}"));

    if let Err(e) = open_in_browser(&url) {
        print_warning(&format!("Unable to open a browser: {e}"));
    }

    for path in [&title_path, &body_path] {
        if let Err(e) = remove_scratch_file(path) {
            log::warn!("Unable to remove {}: {e}", path.display());
        }
    }

    Ok(url)
}

fn remove_scratch_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
