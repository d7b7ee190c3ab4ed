//! SQLite Repository
//!
//! Relational backend: engine-assigned ids, ordering pushed into `ORDER BY`,
//! and a foreign key from `backups.game_id` to `games.id`.
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::domain::models::{now, Backup, BackupId, Game, GameId, NewBackup, NewGame};
use crate::domain::ports::{BackupRepository, GameRepository};
use crate::error::{ErrorKind, Result, StorageError};

const GAME_COLUMNS: &str =
    "id, name, game_path, backup_root, last_backup_at, created_at, updated_at";
const BACKUP_COLUMNS: &str = "id, game_id, name, backup_path, created_at, size_bytes";

/// SQLite-based implementation of both repository ports
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open a database file and create the schema if missing
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let repo = Self::from_connection(conn)?;
        repo.init_schema()?;
        Ok(repo)
    }

    /// Create an in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self::from_connection(conn)?;
        repo.init_schema()?;
        Ok(repo)
    }

    /// Wrap a connection whose schema was prepared elsewhere
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initialize database schema
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                game_path TEXT NOT NULL,
                backup_root TEXT NOT NULL,
                last_backup_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS backups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                backup_path TEXT NOT NULL,
                created_at TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                FOREIGN KEY (game_id) REFERENCES games(id)
            );

            CREATE INDEX IF NOT EXISTS idx_backups_game_created
             ON backups(game_id, created_at);",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    fn select_game(conn: &Connection, id: GameId) -> Result<Game> {
        conn.query_row(
            &format!("SELECT {} FROM games WHERE id = ?1", GAME_COLUMNS),
            params![id],
            game_from_row,
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found("game", id))
    }
}

impl GameRepository for SqliteRepository {
    fn create_game(&self, new_game: NewGame) -> Result<Game> {
        let mut game = new_game.into_game()?;
        let conn = self.conn();
        conn.execute(
            "INSERT INTO games (name, game_path, backup_root, last_backup_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &game.name,
                &game.game_path,
                &game.backup_root,
                game.last_backup_at,
                game.created_at,
                game.updated_at,
            ],
        )?;
        game.id = conn.last_insert_rowid();
        debug!(game_id = game.id, name = %game.name, "created game");
        Ok(game)
    }

    fn get_game(&self, id: GameId) -> Result<Game> {
        let conn = self.conn();
        Self::select_game(&conn, id)
    }

    fn list_games(&self) -> Result<Vec<Game>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM games ORDER BY id DESC",
            GAME_COLUMNS
        ))?;
        let games = stmt
            .query_map([], game_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(games)
    }

    fn update_game(&self, game: &Game) -> Result<Game> {
        game.validate()?;
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE games SET name = ?1, game_path = ?2, backup_root = ?3, updated_at = ?4
             WHERE id = ?5",
            params![&game.name, &game.game_path, &game.backup_root, now(), game.id],
        )?;
        if changed == 0 {
            return Err(StorageError::not_found("game", game.id));
        }
        debug!(game_id = game.id, "updated game");
        Self::select_game(&conn, game.id)
    }

    fn update_game_last_backup_at(&self, id: GameId, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn();
        let changed = conn.execute(
            "UPDATE games SET last_backup_at = ?1, updated_at = ?2 WHERE id = ?3",
            params![at, now(), id],
        )?;
        if changed == 0 {
            return Err(StorageError::not_found("game", id));
        }
        debug!(game_id = id, %at, "updated last backup time");
        Ok(())
    }

    fn delete_game(&self, id: GameId) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let removed_backups = tx.execute("DELETE FROM backups WHERE game_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM games WHERE id = ?1", params![id])?;
        if removed == 0 {
            // dropping `tx` rolls back
            return Err(StorageError::not_found("game", id));
        }
        tx.commit()?;
        debug!(game_id = id, removed_backups, "deleted game");
        Ok(())
    }
}

impl BackupRepository for SqliteRepository {
    fn create_backup(&self, new_backup: NewBackup) -> Result<Backup> {
        let mut backup = new_backup.into_backup();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO backups (game_id, name, backup_path, created_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                backup.game_id,
                &backup.name,
                &backup.backup_path,
                backup.created_at,
                backup.size_bytes,
            ],
        )?;
        backup.id = conn.last_insert_rowid();
        debug!(backup_id = backup.id, game_id = backup.game_id, "created backup record");
        Ok(backup)
    }

    fn get_backup(&self, id: BackupId) -> Result<Backup> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {} FROM backups WHERE id = ?1", BACKUP_COLUMNS),
            params![id],
            backup_from_row,
        )
        .optional()?
        .ok_or_else(|| StorageError::not_found("backup", id))
    }

    fn list_backups_by_game(&self, game_id: GameId) -> Result<Vec<Backup>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM backups WHERE game_id = ?1 ORDER BY created_at DESC, id DESC",
            BACKUP_COLUMNS
        ))?;
        let backups = stmt
            .query_map(params![game_id], backup_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(backups)
    }

    fn get_latest_backup_by_game(&self, game_id: GameId) -> Result<Backup> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {} FROM backups WHERE game_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                BACKUP_COLUMNS
            ),
            params![game_id],
            backup_from_row,
        )
        .optional()?
        .ok_or_else(|| {
            StorageError::new(
                ErrorKind::NotFound,
                format!("no backup found for game: {}", game_id),
            )
        })
    }

    fn delete_backup(&self, id: BackupId) -> Result<()> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM backups WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StorageError::not_found("backup", id));
        }
        debug!(backup_id = id, "deleted backup record");
        Ok(())
    }
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: row.get(0)?,
        name: row.get(1)?,
        game_path: row.get(2)?,
        backup_root: row.get(3)?,
        last_backup_at: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn backup_from_row(row: &Row<'_>) -> rusqlite::Result<Backup> {
    Ok(Backup {
        id: row.get(0)?,
        game_id: row.get(1)?,
        name: row.get(2)?,
        backup_path: row.get(3)?,
        created_at: row.get(4)?,
        size_bytes: row.get(5)?,
    })
}
