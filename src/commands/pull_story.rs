use crate::core::{
    error::Result,
    git::MergeOutcome,
    print_info, print_success, print_warning,
    source::{lookup_branch_source, SourceRef},
    StoryCommandInit, StoryContext,
};

pub fn execute_pull_story(source: Option<String>) -> Result<()> {
    let mut ctx = StoryCommandInit::initialize()?;
    run_pull_story(&mut ctx, source.as_deref())?;
    Ok(())
}

/// Fetch the story's source branch and merge it into the checked out branch
pub fn run_pull_story(ctx: &mut StoryContext, source: Option<&str>) -> Result<MergeOutcome> {
    let source = SourceRef::parse(&lookup_branch_source(&ctx.config, source)?);
    let auth = ctx.remote_auth();

    if let Err(e) = ctx.repo.fetch(&source.remote, &auth) {
        print_warning(&format!("Unable to fetch {}: {e}", source.remote));
    }

    let signature = ctx.signature()?;
    let outcome = ctx
        .repo
        .merge_remote_branch(&source.tracking_name(), &signature)?;

    match &outcome {
        MergeOutcome::UpToDate => {
            print_info(&format!("Already up to date with {}", source.tracking_name()));
        }
        MergeOutcome::Merged { commit, message } => {
            print_success(&format!("{message} ({commit})"));
        }
    }
    Ok(outcome)
}
