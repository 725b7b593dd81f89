//! Scoped git configuration lookups.
//!
//! Story settings live in git config. A [`ConfigChain`] holds the backing stores in
//! priority order (repository-local first, then global) and answers every lookup
//! from the first store that has a non-empty value. Writes always go to the
//! first store.

use crate::core::error::{Result, StoryError};
use git2::{ConfigLevel, Repository};
use std::collections::HashMap;

pub const SOURCE_PREFIX: &str = "story.source";
pub const SOURCE_DEFAULT: &str = "story.source.default";
pub const REMOTE_TARGET: &str = "story.remote.target";
pub const ISSUE_PREFIX: &str = "story.issuePrefix";
pub const ISSUE_BRANCH_PATTERN: &str = "story.issueBranchPattern";
pub const OAUTH_TOKEN: &str = "story.oauthtoken";
pub const EDITOR: &str = "story.editor";
pub const API_URL: &str = "story.apiurl";
pub const SSH_PUBLIC_KEY: &str = "story.ssh.publickey";
pub const SSH_PRIVATE_KEY: &str = "story.ssh.privatekey";
pub const HOSTED_DB_HOST: &str = "story.hosteddb.host";
pub const HOSTED_DB_PORT: &str = "story.hosteddb.port";
pub const HOSTED_DB_USER: &str = "story.hosteddb.user";
pub const HOSTED_DB_PASS: &str = "story.hosteddb.pass";
pub const HOSTED_DB_NAME: &str = "story.hosteddb.name";
pub const USER_NAME: &str = "user.name";
pub const USER_EMAIL: &str = "user.email";

pub const DEFAULT_REMOTE: &str = "origin";

pub fn remote_url_key(remote: &str) -> String {
    format!("remote.{remote}.url")
}

pub fn branch_remote_key(branch: &str) -> String {
    format!("branch.{branch}.remote")
}

pub fn last_stash_key(branch: &str) -> String {
    format!("branch.{branch}.laststash")
}

/// A single scope of key/value configuration.
pub trait ConfigStore {
    fn get_string(&self, key: &str) -> Option<String>;

    fn set_string(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that is not set is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_string(key).and_then(|v| v.trim().parse().ok())
    }
}

/// A git config file at one level (local, global, ...).
pub struct GitConfigStore {
    config: git2::Config,
}

impl GitConfigStore {
    pub fn new(config: git2::Config) -> Self {
        Self { config }
    }

    /// The repository's own `.git/config`
    pub fn local(repo: &Repository) -> Result<Self> {
        let config = repo.config()?.open_level(ConfigLevel::Local)?;
        Ok(Self::new(config))
    }

    /// The user's global config; `None` when no global file exists
    pub fn global() -> Option<Self> {
        match git2::Config::open_default().and_then(|c| c.open_level(ConfigLevel::Global)) {
            Ok(config) => Some(Self::new(config)),
            Err(e) => {
                log::debug!("No global git config available: {e}");
                None
            }
        }
    }
}

impl ConfigStore for GitConfigStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.config.get_string(key).ok()
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.config.set_str(key, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match self.config.remove(key) {
            Ok(()) => Ok(()),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.config.get_i64(key).ok()
    }
}

/// In-memory store, used for tests and for layering overrides.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigStore {
    values: HashMap<String, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Ordered list of config stores; the first non-empty hit wins.
pub struct ConfigChain {
    stores: Vec<Box<dyn ConfigStore>>,
}

impl ConfigChain {
    pub fn new(stores: Vec<Box<dyn ConfigStore>>) -> Self {
        Self { stores }
    }

    /// Local repository config, falling back to the global config
    pub fn for_repository(repo: &Repository) -> Result<Self> {
        let mut stores: Vec<Box<dyn ConfigStore>> = vec![Box::new(GitConfigStore::local(repo)?)];
        if let Some(global) = GitConfigStore::global() {
            stores.push(Box::new(global));
        }
        Ok(Self::new(stores))
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        let found = self
            .stores
            .iter()
            .filter_map(|store| store.get_string(key))
            .find(|value| !value.is_empty());
        log::debug!("config {key} = {found:?}");
        found
    }

    /// Like [`lookup`](Self::lookup) but fails with [`StoryError::ConfigMissing`]
    pub fn require(&self, key: &str) -> Result<String> {
        self.lookup(key).ok_or_else(|| StoryError::config_missing(key))
    }

    pub fn lookup_or(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_string())
    }

    pub fn lookup_i64(&self, key: &str) -> Option<i64> {
        self.stores.iter().find_map(|store| store.get_i64(key))
    }

    /// Write to the highest-priority store
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let store = self
            .stores
            .first_mut()
            .ok_or_else(|| StoryError::config_missing(key))?;
        log::debug!("config set {key} = {value}");
        store.set_string(key, value)
    }

    /// Remove from the highest-priority store
    pub fn remove(&mut self, key: &str) -> Result<()> {
        match self.stores.first_mut() {
            Some(store) => store.remove(key),
            None => Ok(()),
        }
    }
}
