//! External programs: the user's text editor and web browser.

use crate::core::{
    config::{self, ConfigChain},
    error::{Result, StoryError},
};
use std::fs;
use std::path::Path;
use std::process::Command;

const FALLBACK_EDITOR: &str = "vi";

/// `story.editor`, then `$EDITOR`, then `vi`
pub fn resolve_editor(config: &ConfigChain) -> String {
    config
        .lookup(config::EDITOR)
        .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Open `path` in `editor`, wait for it to exit and return the trimmed file
/// contents. The file is created when missing so a previous draft is kept.
pub fn edit_in_editor(editor: &str, path: &Path) -> Result<String> {
    if !path.exists() {
        fs::write(path, "")?;
    }

    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(FALLBACK_EDITOR);
    log::debug!("Opening {} with {editor}", path.display());

    let status = Command::new(program).args(parts).arg(path).status()?;
    if !status.success() {
        return Err(StoryError::editor_failed(editor, status.to_string()));
    }

    Ok(fs::read_to_string(path)?.trim().to_string())
}

/// Launch the platform's URL opener without waiting for it
pub fn open_in_browser(url: &str) -> Result<()> {
    let mut command = browser_command(url);
    command.spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn browser_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
