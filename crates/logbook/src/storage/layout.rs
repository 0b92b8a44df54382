//! Log file naming and discovery.

use crate::error::Result;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Directory holding issue logs.
pub const ISSUES_DIR: &str = ".issues";

/// Directory holding session logs.
pub const SESSIONS_DIR: &str = ".memory";

/// The two kinds of log the store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Issue event logs (`.issues/events*.jsonl`)
    Issues,

    /// Session record logs (`.memory/sessions*.jsonl`)
    Sessions,
}

impl LogKind {
    /// Directory, relative to the project root.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Issues => ISSUES_DIR,
            Self::Sessions => SESSIONS_DIR,
        }
    }

    /// File name stem shared by every log of this kind.
    #[must_use]
    pub fn stem(self) -> &'static str {
        match self {
            Self::Issues => "events",
            Self::Sessions => "sessions",
        }
    }

    /// Directory holding logs of this kind under `root`.
    #[must_use]
    pub fn dir(self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }

    /// The shared pre-namespace log.
    #[must_use]
    pub fn legacy_file(self, root: &Path) -> PathBuf {
        self.dir(root).join(format!("{}.jsonl", self.stem()))
    }

    /// The log owned by `namespace`.
    #[must_use]
    pub fn namespace_file(self, root: &Path, namespace: &str) -> PathBuf {
        self.dir(root)
            .join(format!("{}-{namespace}.jsonl", self.stem()))
    }

    /// Whether `file_name` is a per-namespace log of this kind.
    fn is_namespace_file(self, file_name: &str) -> bool {
        file_name
            .strip_prefix(self.stem())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|rest| rest.strip_suffix(".jsonl"))
            .is_some_and(|namespace| !namespace.is_empty())
    }
}

/// Every existing log of `kind` under `root`, in merge order.
///
/// Namespace files come first, sorted by file name, followed by the legacy
/// file if it exists. A missing directory yields no files.
pub async fn discover(root: &Path, kind: LogKind) -> Result<Vec<PathBuf>> {
    let dir = kind.dir(root);
    let mut entries = match fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No {} directory at {}", kind.dir_name(), dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str()
            && kind.is_namespace_file(name)
            && entry.file_type().await?.is_file()
        {
            names.push(name.to_string());
        }
    }
    names.sort();

    let mut files: Vec<PathBuf> = names.into_iter().map(|name| dir.join(name)).collect();
    let legacy = kind.legacy_file(root);
    if fs::try_exists(&legacy).await? {
        files.push(legacy);
    }
    Ok(files)
}
