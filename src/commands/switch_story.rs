use crate::core::{
    error::{Result, StoryError},
    git::BranchKind,
    index_parser::IndexParser,
    print_info, print_section_header, print_success, print_warning,
    prompt::{Prompt, StdinPrompt},
    source::wrap_pattern,
    StashRestore, StoryCommandInit, StoryContext,
};
use colored::*;
use git2::Oid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    AlreadyOnBranch(String),
    NoCandidates,
    Switched {
        /// `None` when leaving a detached HEAD
        from: Option<String>,
        to: String,
        stashed: Option<Oid>,
        restored: StashRestore,
    },
}

pub fn execute_switch_story(pattern: Option<String>, recent: bool) -> Result<()> {
    let mut ctx = StoryCommandInit::initialize()?;
    run_switch_story(&mut ctx, &mut StdinPrompt, pattern.as_deref(), recent)?;
    Ok(())
}

/// Pick the target branch, either the most recent one or by pattern, and switch
pub fn run_switch_story(
    ctx: &mut StoryContext,
    prompt: &mut dyn Prompt,
    pattern: Option<&str>,
    recent: bool,
) -> Result<SwitchOutcome> {
    if recent {
        let target = ctx
            .recent
            .load()?
            .ok_or(StoryError::NoRecentBranch)?
            .branch;
        return switch_to(ctx, &target);
    }

    let pattern = pattern
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| StoryError::missing_argument("--pattern"))?;
    let regex = wrap_pattern(pattern)?;

    let current = ctx.repo.head_branch()?;
    let candidates: Vec<String> = ctx
        .repo
        .find_branches(&regex, BranchKind::Local)?
        .into_iter()
        .filter(|name| Some(name) != current.as_ref())
        .collect();

    if candidates.is_empty() {
        print_info(&format!("No other branch matches `{pattern}`"));
        return Ok(SwitchOutcome::NoCandidates);
    }

    print_section_header("Branches");
    for (i, name) in candidates.iter().enumerate() {
        println!(
            "{}{}{} {}",
            "[".bright_black(),
            (i + 1).to_string().white(),
            "]".bright_black(),
            name.blue()
        );
    }

    let answer = prompt.ask(&format!("Switch to (1-{}):", candidates.len()))?;
    let choice = IndexParser::parse_single(&answer, candidates.len())?;
    switch_to(ctx, &candidates[choice - 1])
}

/// Leave the current branch for `target`, parking uncommitted work in a stash
/// and bringing back whatever was parked on `target`
pub fn switch_to(ctx: &mut StoryContext, target: &str) -> Result<SwitchOutcome> {
    let current = ctx.repo.head_branch()?;
    if current.as_deref() == Some(target) {
        print_info(&format!("Already on {target}"));
        return Ok(SwitchOutcome::AlreadyOnBranch(target.to_string()));
    }
    if !ctx.repo.branch_exists(target, BranchKind::Local) {
        return Err(StoryError::branch_not_found(target));
    }

    let leaving = current.as_deref().unwrap_or("detached HEAD").to_string();
    match &current {
        Some(branch) => ctx.recent.save(branch, &ctx.repo.get_repo_path())?,
        None => log::debug!("Leaving a detached HEAD, recent branch left as is"),
    }

    let stashed = ctx.stash_current_changes()?;
    if let Some(oid) = stashed {
        log::info!("Stashed changes on {leaving} as {oid}");
    }

    ctx.repo.checkout_branch(target)?;

    let restored = ctx.pop_recorded_stash(target)?;
    match &restored {
        StashRestore::NothingRecorded => {}
        StashRestore::Restored(oid) => log::info!("Restored stash {oid} on {target}"),
        StashRestore::NotFound(recorded) => {
            log::debug!("Recorded stash {recorded} for {target} no longer exists");
        }
        StashRestore::Failed(e) => {
            print_warning(&format!("Unable to restore stashed changes on {target}: {e}"));
        }
    }

    print_success(&format!("Switched from {leaving} to {target}"));
    Ok(SwitchOutcome::Switched {
        from: current,
        to: target.to_string(),
        stashed,
        restored,
    })
}
