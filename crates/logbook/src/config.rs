//! Namespace prefix resolution.
//!
//! Every writer owns one namespace, named by a short prefix such as `dp`.
//! The prefix is taken from the first source that is set:
//!
//! 1. the `LOGBOOK_PREFIX` environment variable
//! 2. `prefix:` in the project's `.logbook.yaml`
//! 3. `git config logbook.prefix`
//! 4. the initials of `git config user.name` (first and last word)
//! 5. the fallback `xx`
//!
//! Explicit prefixes (1-3) are validated and rejected when malformed. Derived
//! and fallback prefixes are flagged so the CLI can suggest configuring one.

use crate::error::{ConfigError, Result};
use crate::id_generation::{MAX_PREFIX_LEN, MIN_PREFIX_LEN};
use crate::storage::LogKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tokio::fs;
use tracing::debug;

/// Environment variable holding an explicit prefix.
pub const PREFIX_ENV_VAR: &str = "LOGBOOK_PREFIX";

/// Project config file, at the project root.
pub const CONFIG_FILE_NAME: &str = ".logbook.yaml";

/// Git config key holding an explicit prefix.
pub const GIT_PREFIX_KEY: &str = "logbook.prefix";

/// Prefix used when nothing else resolves.
pub const FALLBACK_PREFIX: &str = "xx";

/// Maximum directory depth to traverse when searching for the project root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `.logbook.yaml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LogbookConfig {
    /// Namespace prefix for this checkout
    #[serde(default)]
    pub prefix: Option<String>,
}

impl LogbookConfig {
    /// Load configuration from a file. A missing file yields the default.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }
}

/// A resolved namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrefix {
    /// The prefix, lowercased
    pub prefix: String,

    /// `true` when derived from the git user name or the fallback
    pub derived: bool,
}

impl ResolvedPrefix {
    fn explicit(prefix: String) -> Self {
        Self {
            prefix,
            derived: false,
        }
    }

    fn derived(prefix: String) -> Self {
        Self {
            prefix,
            derived: true,
        }
    }
}

/// Where prefix settings outside the config file come from.
pub trait PrefixSources {
    /// Value of [`PREFIX_ENV_VAR`], if set.
    fn env_prefix(&self) -> Option<String>;

    /// Value of a git config key, if set.
    fn git_config(&self, key: &str) -> Option<String>;
}

/// Reads the process environment and runs `git config` in a directory.
#[derive(Debug, Clone)]
pub struct SystemSources {
    dir: PathBuf,
}

impl SystemSources {
    /// Sources for a project rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PrefixSources for SystemSources {
    fn env_prefix(&self) -> Option<String> {
        std::env::var(PREFIX_ENV_VAR).ok()
    }

    fn git_config(&self, key: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["config", "--get", key])
            .current_dir(&self.dir)
            .output()
            .inspect_err(|e| debug!("git config {key} unavailable: {e}"))
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}

/// Validate and normalize an explicitly configured prefix.
///
/// Returns the trimmed, lowercased prefix.
pub fn validate_prefix(prefix: &str) -> Result<String> {
    let normalized = prefix.trim().to_lowercase();
    let reason = if normalized.is_empty() {
        Some("prefix cannot be empty")
    } else if normalized.chars().count() < MIN_PREFIX_LEN {
        Some("must be at least 2 characters")
    } else if normalized.chars().count() > MAX_PREFIX_LEN {
        Some("must be at most 4 characters")
    } else if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some("must contain only alphanumeric characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason,
        }
        .into()),
        None => Ok(normalized),
    }
}

/// Initials of the first and last word of `name`, lowercased.
///
/// Returns `None` for single-word names and for initials that are not
/// ASCII alphanumeric.
pub fn derive_prefix_from_name(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    let [first, .., last] = words.as_slice() else {
        return None;
    };
    let prefix: String = [first, last]
        .iter()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_lowercase)
        .collect();
    (prefix.len() == 2 && prefix.chars().all(|c| c.is_ascii_alphanumeric())).then_some(prefix)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve the prefix from `config` and `sources`.
///
/// # Errors
///
/// Fails with [`ConfigError::InvalidPrefix`] when an explicit source is set
/// to a malformed prefix.
pub fn resolve_prefix(config: &LogbookConfig, sources: &impl PrefixSources) -> Result<ResolvedPrefix> {
    if let Some(prefix) = non_blank(sources.env_prefix()) {
        debug!(source = PREFIX_ENV_VAR, "Using configured prefix");
        return validate_prefix(&prefix).map(ResolvedPrefix::explicit);
    }
    if let Some(prefix) = non_blank(config.prefix.clone()) {
        debug!(source = CONFIG_FILE_NAME, "Using configured prefix");
        return validate_prefix(&prefix).map(ResolvedPrefix::explicit);
    }
    if let Some(prefix) = non_blank(sources.git_config(GIT_PREFIX_KEY)) {
        debug!(source = GIT_PREFIX_KEY, "Using configured prefix");
        return validate_prefix(&prefix).map(ResolvedPrefix::explicit);
    }
    if let Some(prefix) = sources
        .git_config("user.name")
        .as_deref()
        .and_then(derive_prefix_from_name)
    {
        debug!(prefix = %prefix, "Derived prefix from git user.name");
        return Ok(ResolvedPrefix::derived(prefix));
    }
    Ok(ResolvedPrefix::derived(FALLBACK_PREFIX.to_string()))
}

/// Load `.logbook.yaml` under `root` and resolve the prefix from the
/// environment and git.
pub async fn resolve(root: &Path) -> Result<ResolvedPrefix> {
    let config = LogbookConfig::load(&root.join(CONFIG_FILE_NAME)).await?;
    resolve_prefix(&config, &SystemSources::new(root))
}

fn is_project_root(dir: &Path) -> bool {
    dir.join(CONFIG_FILE_NAME).exists()
        || LogKind::Issues.dir(dir).is_dir()
        || LogKind::Sessions.dir(dir).is_dir()
}

/// Find the project root by searching up the directory tree.
///
/// The root is the nearest directory holding `.issues/`, `.memory/` or
/// `.logbook.yaml`. Returns `None` if no ancestor within the depth limit
/// qualifies.
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if is_project_root(&current) {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
