//! Backup service
//!
//! Composes the repository facade with the engine. Every call runs to
//! completion on the calling thread; nothing is rolled back when a later step
//! fails (a copied backup directory stays on disk if recording it fails).

use std::fs;
use std::io;
use std::path::Path;

use gamebk_storage::{Backup, BackupId, Game, GameId, GameUpdate, NewBackup, NewGame, Repository};
use tracing::{info, warn};

use crate::engine::{copy_tree, restore_backup_into_game, BackupName};
use crate::error::{BackupError, ServiceError, ServiceResult};

/// Use cases over one repository handle
#[derive(Debug, Clone)]
pub struct BackupService {
    repo: Repository,
}

impl BackupService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn create_game(&self, new_game: NewGame) -> ServiceResult<Game> {
        let game = self.repo.create_game(new_game)?;
        info!(game_id = game.id, name = %game.name, "registered game");
        Ok(game)
    }

    pub fn get_game(&self, game_id: GameId) -> ServiceResult<Game> {
        Ok(self.repo.get_game(game_id)?)
    }

    /// Load, patch, store; returns the stored record
    pub fn update_game(&self, game_id: GameId, update: GameUpdate) -> ServiceResult<Game> {
        let mut game = self.repo.get_game(game_id)?;
        update.apply_to(&mut game)?;
        Ok(self.repo.update_game(&game)?)
    }

    pub fn list_games(&self) -> ServiceResult<Vec<Game>> {
        Ok(self.repo.list_games()?)
    }

    /// Removes the game and its backup records; backup directories are kept
    pub fn delete_game(&self, game_id: GameId) -> ServiceResult<()> {
        self.repo.delete_game(game_id)?;
        info!(game_id, "deleted game");
        Ok(())
    }

    pub fn list_backups(&self, game_id: GameId) -> ServiceResult<Vec<Backup>> {
        self.repo.get_game(game_id)?;
        Ok(self.repo.list_backups_by_game(game_id)?)
    }

    /// Copy the game's save directory to `backup_root/name` and record it.
    pub fn backup_game(&self, game_id: GameId, name: Option<&str>) -> ServiceResult<Backup> {
        let game = self.repo.get_game(game_id)?;
        let game_path = Path::new(&game.game_path);
        match fs::metadata(game_path) {
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ServiceError::GamePathMissing(game_path.to_path_buf()));
            }
            Err(err) => return Err(BackupError::io("stat", game_path)(err).into()),
        }
        let name = BackupName::resolve(name)?;

        let backup_root = Path::new(&game.backup_root);
        fs::create_dir_all(backup_root).map_err(BackupError::io("create directory", backup_root))?;
        let backup_path = name.path_under(backup_root);
        let size = copy_tree(game_path, &backup_path)?;

        let backup = self
            .repo
            .create_backup(NewBackup {
                game_id: game.id,
                name: name.into_string(),
                backup_path: backup_path.to_string_lossy().into_owned(),
                size_bytes: i64::try_from(size).unwrap_or(i64::MAX),
            })
            .map_err(|err| {
                warn!(path = %backup_path.display(), error = %err, "backup copied but not recorded");
                err
            })?;
        self.repo
            .update_game_last_backup_at(game.id, backup.created_at)?;

        info!(
            game_id = game.id,
            backup_id = backup.id,
            name = %backup.name,
            bytes = size,
            "backup created"
        );
        Ok(backup)
    }

    /// Restore the most recent backup of the game
    pub fn restore_latest(&self, game_id: GameId) -> ServiceResult<Backup> {
        let game = self.repo.get_game(game_id)?;
        let backup = self.repo.get_latest_backup_by_game(game.id)?;
        self.restore(&game, backup)
    }

    pub fn restore_backup(&self, game_id: GameId, backup_id: BackupId) -> ServiceResult<Backup> {
        let (game, backup) = self.owned_backup(game_id, backup_id)?;
        self.restore(&game, backup)
    }

    /// Delete a backup record; with `purge_files` also remove its directory
    pub fn delete_backup(
        &self,
        game_id: GameId,
        backup_id: BackupId,
        purge_files: bool,
    ) -> ServiceResult<()> {
        let (_game, backup) = self.owned_backup(game_id, backup_id)?;
        self.repo.delete_backup(backup.id)?;

        if purge_files {
            let path = Path::new(&backup.backup_path);
            match fs::remove_dir_all(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "backup directory already gone");
                }
                Err(err) => return Err(BackupError::io("remove directory", path)(err).into()),
            }
        }
        info!(game_id, backup_id, purge_files, "deleted backup");
        Ok(())
    }

    fn owned_backup(&self, game_id: GameId, backup_id: BackupId) -> ServiceResult<(Game, Backup)> {
        let game = self.repo.get_game(game_id)?;
        let backup = self.repo.get_backup(backup_id)?;
        if backup.game_id != game.id {
            return Err(ServiceError::validation("backup does not belong to game"));
        }
        Ok((game, backup))
    }

    fn restore(&self, game: &Game, backup: Backup) -> ServiceResult<Backup> {
        let bytes = restore_backup_into_game(
            Path::new(&backup.backup_path),
            Path::new(&game.game_path),
        )?;
        info!(game_id = game.id, backup_id = backup.id, bytes, "restore complete");
        Ok(backup)
    }
}
