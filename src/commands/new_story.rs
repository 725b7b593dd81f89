use crate::core::{
    config::{self, DEFAULT_REMOTE},
    error::{Result, StoryError},
    print_detail, print_info, print_section_header, print_success, print_warning,
    prompt::{Prompt, StdinPrompt},
    source::{lookup_branch_source, SourceRef},
    StoryCommandInit, StoryContext,
};
use git2::Oid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewStoryOutcome {
    Aborted,
    Created {
        branch: String,
        source: SourceRef,
        target: String,
        stashed: Option<Oid>,
    },
}

pub fn execute_new_story(branch: Option<String>, source: Option<String>) -> Result<()> {
    let mut ctx = StoryCommandInit::initialize()?;
    run_new_story(
        &mut ctx,
        &mut StdinPrompt,
        branch.as_deref(),
        source.as_deref(),
    )?;
    Ok(())
}

/// Create `branch` from the configured source, publish it to the target remote
/// and leave it checked out
pub fn run_new_story(
    ctx: &mut StoryContext,
    prompt: &mut dyn Prompt,
    branch: Option<&str>,
    source: Option<&str>,
) -> Result<NewStoryOutcome> {
    let branch = branch
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .ok_or_else(|| StoryError::missing_argument("--branch"))?;
    let source = SourceRef::parse(&lookup_branch_source(&ctx.config, source)?);
    let target = ctx.config.lookup_or(config::REMOTE_TARGET, DEFAULT_REMOTE);

    print_section_header("New story");
    print_detail("Source", &source.tracking_name());
    print_detail("Branch", branch);
    print_detail("Publish", &format!("{target}/{branch}"));

    if !prompt.confirm("Create this story branch? [y/N]")? {
        print_info("Aborted.");
        return Ok(NewStoryOutcome::Aborted);
    }

    let stashed = ctx.stash_current_changes()?;
    if let Some(oid) = stashed {
        print_info(&format!("Stashed local changes as {oid}"));
    }

    let auth = ctx.remote_auth();
    if let Err(e) = ctx.repo.fetch(&source.remote, &auth) {
        print_warning(&format!("Unable to fetch {}: {e}", source.remote));
    }

    if !ctx.repo.create_branch_from(branch, &source.tracking_name())? {
        print_warning(&format!("Branch {branch} already exists, reusing it"));
    }

    if let Err(e) = ctx.repo.checkout_branch(branch) {
        print_warning(&format!("Unable to check out {branch}: {e}"));
    }

    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    ctx.repo.push(&target, &refspec, &auth)?;
    ctx.repo.set_upstream(branch, &target)?;

    print_success(&format!(
        "Created {branch} from {} and published it to {target}",
        source.tracking_name()
    ));

    Ok(NewStoryOutcome::Created {
        branch: branch.to_string(),
        source,
        target,
        stashed,
    })
}
