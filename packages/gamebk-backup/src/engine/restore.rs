//! Restore workflow: verify, prepare, clear, copy

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::fs_ops::{clear_directory_contents, copy_tree_into, ensure_disjoint};
use crate::error::{BackupError, RestoreStage, Result};

/// Replace the contents of `game_path` with the contents of `backup_path`.
///
/// Returns the number of bytes restored. A failure is reported as
/// `BackupError::Restore` carrying the stage it happened in.
pub fn restore_backup_into_game(backup_path: &Path, game_path: &Path) -> Result<u64> {
    run_stage(RestoreStage::Verify, || verify(backup_path, game_path))?;
    run_stage(RestoreStage::Prepare, || {
        fs::create_dir_all(game_path).map_err(BackupError::io("create directory", game_path))?;
        // game_path now exists, so this compares fully canonical paths
        ensure_disjoint(backup_path, game_path)
    })?;
    run_stage(RestoreStage::Clear, || clear_directory_contents(game_path))?;
    let bytes = run_stage(RestoreStage::Copy, || copy_tree_into(backup_path, game_path))?;

    info!(
        backup = %backup_path.display(),
        game = %game_path.display(),
        bytes,
        "restored backup"
    );
    Ok(bytes)
}

fn verify(backup_path: &Path, game_path: &Path) -> Result<()> {
    let metadata = fs::metadata(backup_path).map_err(BackupError::io("stat", backup_path))?;
    if !metadata.is_dir() {
        return Err(BackupError::SourceNotDirectory(backup_path.to_path_buf()));
    }
    ensure_disjoint(backup_path, game_path)
}

fn run_stage<T>(stage: RestoreStage, step: impl FnOnce() -> Result<T>) -> Result<T> {
    step().map_err(|source| {
        if !stage.game_dir_untouched() {
            warn!(%stage, error = %source, "restore interrupted; game directory modified");
        }
        BackupError::Restore {
            stage,
            source: Box::new(source),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_backup_fails_at_verify() {
        let dir = TempDir::new().unwrap();
        let game = dir.path().join("save");
        fs::create_dir(&game).unwrap();
        fs::write(game.join("keep.sav"), b"live").unwrap();

        let err = restore_backup_into_game(&dir.path().join("gone"), &game).unwrap_err();

        assert_eq!(err.restore_stage(), Some(RestoreStage::Verify));
        assert_eq!(fs::read(game.join("keep.sav")).unwrap(), b"live");
    }

    #[test]
    fn test_backup_that_is_a_file_fails_at_verify() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("b1");
        fs::write(&backup, b"not a dir").unwrap();

        let err = restore_backup_into_game(&backup, &dir.path().join("save")).unwrap_err();

        assert_eq!(err.restore_stage(), Some(RestoreStage::Verify));
        assert!(matches!(err.root(), BackupError::SourceNotDirectory(_)));
        assert!(!dir.path().join("save").exists());
    }

    #[test]
    fn test_game_inside_backup_fails_at_verify() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("b1");
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("a.sav"), b"a").unwrap();

        let err = restore_backup_into_game(&backup, &backup.join("nested")).unwrap_err();

        assert_eq!(err.restore_stage(), Some(RestoreStage::Verify));
        assert_eq!(fs::read(backup.join("a.sav")).unwrap(), b"a");
    }

    #[test]
    fn test_parent_components_cannot_reach_backup() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("backups").join("b1");
        fs::create_dir_all(&backup).unwrap();
        fs::write(backup.join("slot1.sav"), b"keep me").unwrap();
        fs::create_dir(dir.path().join("save")).unwrap();
        let game = dir
            .path()
            .join("save")
            .join("missing")
            .join("..")
            .join("..")
            .join("backups")
            .join("b1");

        let err = restore_backup_into_game(&backup, &game).unwrap_err();

        assert_eq!(err.restore_stage(), Some(RestoreStage::Verify));
        assert!(matches!(err.root(), BackupError::OverlappingPaths { .. }));
        assert_eq!(fs::read(backup.join("slot1.sav")).unwrap(), b"keep me");
    }

    #[test]
    fn test_creates_missing_game_dir() {
        let dir = TempDir::new().unwrap();
        let backup = dir.path().join("b1");
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("a.sav"), b"abc").unwrap();
        let game = dir.path().join("fresh").join("save");

        assert_eq!(restore_backup_into_game(&backup, &game).unwrap(), 3);
        assert_eq!(fs::read(game.join("a.sav")).unwrap(), b"abc");
    }
}
