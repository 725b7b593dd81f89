use clap::{Parser, Subcommand};
use gitcli::commands::*;
use gitcli::core::{
    error::{Result, StoryError},
    print_error,
};
use std::env;

#[derive(Parser)]
#[command(name = "gitcli")]
#[command(about = "Git extension for the per-ticket story workflow")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Story workflow commands
    #[command(visible_alias = "s")]
    Story {
        #[command(subcommand)]
        command: StoryCommands,
    },
}

#[derive(Subcommand)]
enum StoryCommands {
    /// Create a story branch from a source branch and publish it
    #[command(visible_alias = "n")]
    New {
        /// Name of the branch to create (e.g. "feature/1234-login")
        #[arg(short, long)]
        branch: Option<String>,
        /// Source alias looked up as story.source.<name>
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Delete branches, stashes and databases matching a pattern
    #[command(visible_alias = "d")]
    Delete {
        /// Regular expression matched anywhere in the names
        #[arg(short, long)]
        pattern: Option<String>,
    },
    /// Open a pull request from the current branch into the source branch
    #[command(name = "pullrequest", visible_alias = "pr")]
    PullRequest {
        /// Source alias looked up as story.source.<name>
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Fetch the source branch and merge it into the current branch
    #[command(visible_alias = "p")]
    Pull {
        /// Source alias looked up as story.source.<name>
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Switch to another story branch, carrying uncommitted work along
    #[command(visible_alias = "s")]
    Switch {
        /// Regular expression matched anywhere in local branch names
        #[arg(short, long)]
        pattern: Option<String>,
        /// Switch back to the most recently left branch
        #[arg(short, long, conflicts_with = "pattern")]
        recent: bool,
    },
}

fn run(command: StoryCommands) -> Result<()> {
    match command {
        StoryCommands::New { branch, source } => execute_new_story(branch, source),
        StoryCommands::Delete { pattern } => execute_delete_story(pattern),
        StoryCommands::PullRequest { source } => execute_pull_request_story(source),
        StoryCommands::Pull { source } => execute_pull_story(source),
        StoryCommands::Switch { pattern, recent } => execute_switch_story(pattern, recent),
    }
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag unless RUST_LOG is already set
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let Commands::Story { command } = cli.command;
    if let Err(e) = run(command) {
        log::debug!("{e:?}");
        match e {
            StoryError::NotInGitRepo => print_error("Not in a git repository"),
            other => print_error(&other.to_string()),
        }
        std::process::exit(1);
    }
}
