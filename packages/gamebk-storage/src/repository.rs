//! Repository facade
//!
//! One handle over both ports. Callers pick a backend once, at construction,
//! and everything downstream talks to `Repository` only.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::{BackendKind, StorageConfig};
use crate::domain::{
    Backup, BackupId, BackupRepository, Game, GameId, GameRepository, NewBackup, NewGame,
};
use crate::error::{Result, StorageError};

/// Backend-agnostic storage handle
#[derive(Clone)]
pub struct Repository {
    games: Arc<dyn GameRepository>,
    backups: Arc<dyn BackupRepository>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    pub fn new(games: Arc<dyn GameRepository>, backups: Arc<dyn BackupRepository>) -> Self {
        Self { games, backups }
    }

    /// Share a single backend value for both ports
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: GameRepository + BackupRepository + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            games: backend.clone(),
            backups: backend,
        }
    }

    /// Key-value repository over an opened redb database
    #[cfg(feature = "kv")]
    pub fn from_redb(db: Arc<redb::Database>) -> Result<Self> {
        Ok(Self::from_backend(crate::infrastructure::RedbRepository::new(db)?))
    }

    /// Relational repository over an opened SQLite connection
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite(conn: rusqlite::Connection) -> Result<Self> {
        let repo = crate::infrastructure::SqliteRepository::from_connection(conn)?;
        repo.init_schema()?;
        Ok(Self::from_backend(repo))
    }

    pub fn games(&self) -> &dyn GameRepository {
        self.games.as_ref()
    }

    pub fn backups(&self) -> &dyn BackupRepository {
        self.backups.as_ref()
    }

    pub fn create_game(&self, new_game: NewGame) -> Result<Game> {
        self.games.create_game(new_game)
    }

    pub fn get_game(&self, id: GameId) -> Result<Game> {
        self.games.get_game(id)
    }

    pub fn list_games(&self) -> Result<Vec<Game>> {
        self.games.list_games()
    }

    pub fn update_game(&self, game: &Game) -> Result<Game> {
        self.games.update_game(game)
    }

    pub fn update_game_last_backup_at(&self, id: GameId, at: DateTime<Utc>) -> Result<()> {
        self.games.update_game_last_backup_at(id, at)
    }

    /// Removes the game and its backup records; backup directories stay on disk
    pub fn delete_game(&self, id: GameId) -> Result<()> {
        self.games.delete_game(id)
    }

    pub fn create_backup(&self, new_backup: NewBackup) -> Result<Backup> {
        self.backups.create_backup(new_backup)
    }

    pub fn get_backup(&self, id: BackupId) -> Result<Backup> {
        self.backups.get_backup(id)
    }

    pub fn list_backups_by_game(&self, game_id: GameId) -> Result<Vec<Backup>> {
        self.backups.list_backups_by_game(game_id)
    }

    pub fn get_latest_backup_by_game(&self, game_id: GameId) -> Result<Backup> {
        self.backups.get_latest_backup_by_game(game_id)
    }

    pub fn delete_backup(&self, id: BackupId) -> Result<()> {
        self.backups.delete_backup(id)
    }
}

/// Open the backend named by `config`, creating the database's parent
/// directory when missing.
pub fn open_repository(config: &StorageConfig) -> Result<Repository> {
    ensure_parent_dir(&config.db_path)?;
    let repo = match config.backend {
        #[cfg(feature = "kv")]
        BackendKind::Kv => {
            Repository::from_backend(crate::infrastructure::RedbRepository::open(&config.db_path)?)
        }
        #[cfg(feature = "sqlite")]
        BackendKind::Sqlite => Repository::from_backend(
            crate::infrastructure::SqliteRepository::open(&config.db_path)?,
        ),
        #[allow(unreachable_patterns)]
        other => {
            return Err(StorageError::config(format!(
                "backend '{}' is not compiled into this build",
                other
            )))
        }
    };
    info!(backend = %config.backend, db_path = %config.db_path.display(), "opened repository");
    Ok(repo)
}

fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|err| {
                StorageError::io(format!(
                    "cannot create database directory {}: {}",
                    parent.display(),
                    err
                ))
                .with_source(err)
            })
        }
        _ => Ok(()),
    }
}
