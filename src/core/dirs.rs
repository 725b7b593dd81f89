use crate::core::error::Result;
use std::path::{Path, PathBuf};

pub fn get_cache_directory() -> Result<PathBuf> {
    // XDG_CACHE_HOME wins on every platform so tests and users can relocate state
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        if !xdg.is_empty() {
            return Ok(PathBuf::from(xdg).join("gitcli"));
        }
    }

    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => {
            dirs::home_dir().unwrap_or_default().join(".cache")
        }
        "macos" => dirs::home_dir().unwrap_or_default().join("Library/Caches"),
        _ => dirs::cache_dir().unwrap_or_else(|| std::env::temp_dir()),
    };

    Ok(base.join("gitcli"))
}

/// Per-repository state directory, keyed by a hash of the repository path
pub fn get_repo_state_directory(repo_path: &Path) -> Result<PathBuf> {
    let repo_hash = format!("{:x}", md5::compute(repo_path.to_string_lossy().as_bytes()));
    log::debug!("get_repo_state_directory: repo_path = {repo_path:?}, hash = {repo_hash}");
    Ok(get_cache_directory()?.join(repo_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_state_directory_is_stable_per_repo() -> Result<()> {
        let a = get_repo_state_directory(Path::new("/work/project/.git"))?;
        let b = get_repo_state_directory(Path::new("/work/project/.git"))?;
        let c = get_repo_state_directory(Path::new("/work/other/.git"))?;
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.to_string_lossy().contains("gitcli"));
        Ok(())
    }
}
