use crate::core::{
    config::ConfigChain,
    database::{find_databases, DatabaseGateway, HostedDbSettings, MysqlGateway},
    deletion::{delete_branches, delete_stashes, drop_databases, DeletionReport, RepoBranchRemover},
    error::{Result, StoryError},
    git::BranchKind,
    print_info, print_section_header, print_warning,
    prompt::{Prompt, StdinPrompt},
    selection::{Selection, SelectionKind, SelectionMenu},
    source::wrap_pattern,
    StoryCommandInit, StoryContext,
};
use colored::*;
use regex::Regex;

/// What was offered, what was chosen and how each deletion loop went
#[derive(Debug, Default)]
pub struct DeleteStoryReport {
    pub offered: usize,
    pub selection: Selection,
    pub branches: DeletionReport,
    pub stashes: DeletionReport,
    pub databases: DeletionReport,
}

impl DeleteStoryReport {
    pub fn failure_count(&self) -> usize {
        self.branches.failed.len() + self.stashes.failed.len() + self.databases.failed.len()
    }
}

pub fn execute_delete_story(pattern: Option<String>) -> Result<()> {
    let mut ctx = StoryCommandInit::initialize()?;
    deletion_pattern(pattern.as_deref())?;
    let mut database = connect_database(&ctx.config);

    let report = run_delete_story(
        &mut ctx,
        &mut StdinPrompt,
        pattern.as_deref(),
        database.as_mut().map(|g| g as &mut dyn DatabaseGateway),
    )?;

    match report.failure_count() {
        0 => Ok(()),
        failed => Err(StoryError::DeletionFailed { failed }),
    }
}

/// The pattern every candidate is matched against; required and non-empty
fn deletion_pattern(pattern: Option<&str>) -> Result<Regex> {
    let pattern = pattern
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| StoryError::missing_argument("--pattern"))?;
    wrap_pattern(pattern)
}

/// Open the hosted database connection; any problem means no databases are offered
fn connect_database(config: &ConfigChain) -> Option<MysqlGateway> {
    let settings = match HostedDbSettings::from_config(config) {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            log::debug!("No hosted database configured");
            return None;
        }
        Err(e) => {
            log::warn!("Ignoring hosted database settings: {e}");
            return None;
        }
    };

    match MysqlGateway::connect(&settings) {
        Ok(gateway) => Some(gateway),
        Err(e) => {
            log::warn!("Unable to connect to {}: {e}", settings.host);
            None
        }
    }
}

/// List everything matching `pattern`, let the user choose and delete the choice
pub fn run_delete_story(
    ctx: &mut StoryContext,
    prompt: &mut dyn Prompt,
    pattern: Option<&str>,
    mut database: Option<&mut dyn DatabaseGateway>,
) -> Result<DeleteStoryReport> {
    let regex = deletion_pattern(pattern)?;

    let branches = ctx.repo.find_branches(&regex, BranchKind::Local)?;
    let stashes = ctx.repo.find_stashes(&regex)?;
    let databases = match database.as_deref_mut() {
        Some(gateway) => find_databases(gateway, &regex).unwrap_or_else(|e| {
            log::warn!("Unable to list databases: {e}");
            Vec::new()
        }),
        None => Vec::new(),
    };

    let menu = SelectionMenu::new(branches, stashes, databases);
    let mut report = DeleteStoryReport {
        offered: menu.len(),
        ..DeleteStoryReport::default()
    };
    if menu.is_empty() {
        print_info("Nothing to delete");
        return Ok(report);
    }

    menu.print();
    let answer = prompt.ask("Choose items to delete (e.g. 1 3 4):")?;
    let selection = menu.parse_answer(&answer);
    if !selection.ignored.is_empty() {
        print_warning(&format!(
            "Ignored invalid choices: {}",
            selection.ignored.join(" ")
        ));
    }
    if selection.is_empty() {
        print_info("Nothing selected");
        report.selection = selection;
        return Ok(report);
    }

    if !selection.branches.is_empty() {
        let auth = ctx.remote_auth();
        let mut remover = RepoBranchRemover::new(&mut ctx.repo, &auth);
        if !remover.has_remote() {
            print_warning("Remote origin not found, deleting local branches only");
        }
        report.branches = delete_branches(&mut remover, &selection.branches);
        print_report(SelectionKind::Branch, &report.branches);
    }

    if !selection.stashes.is_empty() {
        report.stashes = delete_stashes(&mut ctx.repo, &selection.stashes);
        print_report(SelectionKind::Stash, &report.stashes);
    }

    if !selection.databases.is_empty() {
        if let Some(gateway) = database.as_deref_mut() {
            report.databases = drop_databases(gateway, &selection.databases);
            print_report(SelectionKind::Database, &report.databases);
        }
    }

    report.selection = selection;
    Ok(report)
}

fn print_report(kind: SelectionKind, report: &DeletionReport) {
    print_section_header(&format!("Deleted {}", kind.heading().to_lowercase()));
    for name in &report.deleted {
        println!("  {} {}", "✓".green(), name.white());
    }
    for (name, error) in &report.failed {
        println!("  {} {} {}", "✕".red(), name.white(), error.bright_black());
    }
    if !report.skipped.is_empty() {
        print_warning(&format!("Skipped: {}", report.skipped.join(", ")));
    }
}
