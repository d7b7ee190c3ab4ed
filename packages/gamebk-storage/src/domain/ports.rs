//! Repository Ports (Trait Interfaces)
//!
//! Port/Adapter pattern for backend flexibility:
//! - Key-value: redb (single file, no server)
//! - Relational: SQLite (engine-assigned ids, native ordering)
//!
//! Both backends must produce identical results at this boundary: same id
//! sequence per entity kind, same orderings, same error kinds.

use chrono::{DateTime, Utc};

use super::models::{Backup, BackupId, Game, GameId, NewBackup, NewGame};
use crate::error::Result;

/// Game sub-repository
pub trait GameRepository: Send + Sync {
    /// Persist a new game; assigns `id`, `created_at` and `updated_at`.
    fn create_game(&self, game: NewGame) -> Result<Game>;

    /// Get game by id
    ///
    /// Fails with `NotFound` if absent.
    fn get_game(&self, id: GameId) -> Result<Game>;

    /// All games, highest id first
    fn list_games(&self) -> Result<Vec<Game>>;

    /// Replace name/game_path/backup_root of the stored game with the same id
    /// and refresh `updated_at`. Returns the stored record.
    fn update_game(&self, game: &Game) -> Result<Game>;

    /// Set `last_backup_at` (and refresh `updated_at`)
    fn update_game_last_backup_at(&self, id: GameId, at: DateTime<Utc>) -> Result<()>;

    /// Delete the game and every backup record that references it
    ///
    /// Files on disk are not touched.
    fn delete_game(&self, id: GameId) -> Result<()>;
}

/// Backup sub-repository
pub trait BackupRepository: Send + Sync {
    /// Persist a new backup record; assigns `id` and `created_at`.
    fn create_backup(&self, backup: NewBackup) -> Result<Backup>;

    /// Get backup by id
    ///
    /// Fails with `NotFound` if absent.
    fn get_backup(&self, id: BackupId) -> Result<Backup>;

    /// Backups of one game, newest first
    fn list_backups_by_game(&self, game_id: GameId) -> Result<Vec<Backup>>;

    /// First element of [`list_backups_by_game`](Self::list_backups_by_game)
    ///
    /// Fails with `NotFound` if the game has no backups.
    fn get_latest_backup_by_game(&self, game_id: GameId) -> Result<Backup>;

    /// Fails with `NotFound` if absent.
    fn delete_backup(&self, id: BackupId) -> Result<()>;
}
