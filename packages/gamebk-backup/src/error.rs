//! Error types for gamebk-backup

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use gamebk_storage::{ErrorKind, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackupError>;

/// Named steps of a restore, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStage {
    /// Backup directory checked; game directory untouched
    Verify,
    /// Game directory created if missing; existing contents untouched
    Prepare,
    /// Game directory being emptied; may be partially cleared
    Clear,
    /// Backup contents being copied in; game directory partially restored
    Copy,
}

impl RestoreStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreStage::Verify => "verify",
            RestoreStage::Prepare => "prepare",
            RestoreStage::Clear => "clear",
            RestoreStage::Copy => "copy",
        }
    }

    /// True when a failure at this stage left the game directory as it was
    pub fn game_dir_untouched(&self) -> bool {
        matches!(self, RestoreStage::Verify | RestoreStage::Prepare)
    }
}

impl fmt::Display for RestoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filesystem failures of the copy/clear/restore primitives
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("symlink not supported: {}", .0.display())]
    SymlinkUnsupported(PathBuf),

    #[error("source and destination overlap: {} -> {}", source_dir.display(), destination.display())]
    OverlappingPaths {
        source_dir: PathBuf,
        destination: PathBuf,
    },

    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid backup name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("restore failed at {stage} stage: {source}")]
    Restore {
        stage: RestoreStage,
        #[source]
        source: Box<BackupError>,
    },
}

impl BackupError {
    /// Adapter for `map_err` on `std::io` results
    pub fn io(op: &'static str, path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| BackupError::Io { op, path, source }
    }

    /// Stage at which a restore failed, if this is a restore failure
    pub fn restore_stage(&self) -> Option<RestoreStage> {
        match self {
            BackupError::Restore { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost engine error, looking through restore wrapping
    pub fn root(&self) -> &BackupError {
        match self {
            BackupError::Restore { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Errors surfaced by `BackupService`
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("game_path not found: {}", .0.display())]
    GamePathMissing(PathBuf),
}

impl ServiceError {
    pub fn validation<E: fmt::Display>(e: E) -> Self {
        Self::Validation(e.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Storage(err) if err.is_not_found())
    }

    /// Caller-side mistakes: bad input rather than a failing store or disk
    pub fn is_validation(&self) -> bool {
        match self {
            ServiceError::Validation(_) | ServiceError::GamePathMissing(_) => true,
            ServiceError::Storage(err) => err.kind == ErrorKind::Validation,
            ServiceError::Backup(err) => matches!(err.root(), BackupError::InvalidName { .. }),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_messages_name_the_path() {
        let err = BackupError::DestinationExists(PathBuf::from("/backups/foo/b1"));
        assert_eq!(err.to_string(), "destination already exists: /backups/foo/b1");

        let err = BackupError::SymlinkUnsupported(PathBuf::from("/save/foo/link"));
        assert_eq!(err.to_string(), "symlink not supported: /save/foo/link");
    }

    #[test]
    fn test_io_adapter() {
        let err = BackupError::io("open", "/save/foo/a.sav")(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "denied",
        ));

        assert!(err.to_string().starts_with("failed to open /save/foo/a.sav"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_restore_wrapping() {
        let err = BackupError::Restore {
            stage: RestoreStage::Clear,
            source: Box::new(BackupError::SourceNotDirectory(PathBuf::from("/x"))),
        };

        assert_eq!(err.restore_stage(), Some(RestoreStage::Clear));
        assert!(matches!(err.root(), BackupError::SourceNotDirectory(_)));
        assert_eq!(
            err.to_string(),
            "restore failed at clear stage: source is not a directory: /x"
        );
    }

    #[test]
    fn test_stage_order_and_untouched() {
        assert!(RestoreStage::Verify.game_dir_untouched());
        assert!(RestoreStage::Prepare.game_dir_untouched());
        assert!(!RestoreStage::Clear.game_dir_untouched());
        assert!(!RestoreStage::Copy.game_dir_untouched());
    }

    #[test]
    fn test_service_error_classification() {
        let not_found: ServiceError = StorageError::not_found("game", 1).into();
        assert!(not_found.is_not_found());
        assert!(!not_found.is_validation());

        let invalid: ServiceError = BackupError::InvalidName {
            name: "..".to_string(),
            reason: "reserved name",
        }
        .into();
        assert!(invalid.is_validation());

        assert!(ServiceError::validation("backup does not belong to game").is_validation());
    }
}
