//! Backup directory naming

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{BackupError, Result};

/// Format of auto-assigned names, e.g. `20250101_093000`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of a backup directory, always a single path component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName(String);

impl BackupName {
    /// Trim the requested name, or stamp the current local time when it is
    /// absent or blank.
    pub fn resolve(requested: Option<&str>) -> Result<Self> {
        Self::resolve_at(requested, Local::now())
    }

    pub fn resolve_at(requested: Option<&str>, now: DateTime<Local>) -> Result<Self> {
        match requested.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => Self::validate(name).map(|()| Self(name.to_string())),
            None => Ok(Self(now.format(TIMESTAMP_FORMAT).to_string())),
        }
    }

    fn validate(name: &str) -> Result<()> {
        let reason = if name == "." || name == ".." {
            "reserved name"
        } else if name.contains(['/', '\\']) {
            "must not contain path separators"
        } else if name.contains('\0') {
            "must not contain NUL"
        } else {
            return Ok(());
        };
        Err(BackupError::InvalidName {
            name: name.to_string(),
            reason,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// `root/name`
    pub fn path_under(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(&self.0)
    }
}

impl fmt::Display for BackupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
