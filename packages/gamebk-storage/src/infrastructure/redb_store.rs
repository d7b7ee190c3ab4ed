//! redb Repository
//!
//! Embedded ordered key-value backend. Three tables:
//!
//! - `meta`: id counters (`next_game_id`, `next_backup_id`), 8-byte big-endian
//! - `games`: 8-byte big-endian id -> JSON blob
//! - `backups`: 8-byte big-endian id -> JSON blob
//!
//! Every id allocation happens in the same write transaction as the insert it
//! numbers. redb admits one writer at a time, so concurrent creators never see
//! the same counter value.
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::domain::models::{
    now, sort_backups_newest_first, Backup, BackupId, Game, GameId, NewBackup, NewGame,
};
use crate::domain::ports::{BackupRepository, GameRepository};
use crate::error::{ErrorKind, Result, StorageError};

const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");
const GAMES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("games");
const BACKUPS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("backups");

const KEY_NEXT_GAME_ID: &str = "next_game_id";
const KEY_NEXT_BACKUP_ID: &str = "next_backup_id";

/// redb-backed implementation of both repository ports
#[derive(Clone)]
pub struct RedbRepository {
    db: Arc<Database>,
}

impl RedbRepository {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path.as_ref())?;
        Self::new(Arc::new(db))
    }

    /// In-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::new(Arc::new(db))
    }

    /// Wrap an already opened database, creating missing tables
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let repo = Self { db };
        repo.init_tables()?;
        Ok(repo)
    }

    fn init_tables(&self) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            txn.open_table(META)?;
            txn.open_table(GAMES)?;
            txn.open_table(BACKUPS)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Read-modify-write of one game inside a single write transaction
    fn modify_game(&self, id: GameId, apply: impl FnOnce(&mut Game)) -> Result<Game> {
        let txn = self.db.begin_write()?;
        let game = {
            let mut games = txn.open_table(GAMES)?;
            let key = id_key(id);
            let mut game: Game = match games.get(key.as_slice())? {
                Some(value) => decode(value.value())?,
                None => return Err(StorageError::not_found("game", id)),
            };
            apply(&mut game);
            game.updated_at = now();
            let data = encode(&game)?;
            games.insert(key.as_slice(), data.as_slice())?;
            game
        };
        txn.commit()?;
        Ok(game)
    }
}

impl GameRepository for RedbRepository {
    fn create_game(&self, new_game: NewGame) -> Result<Game> {
        let mut game = new_game.into_game()?;
        let txn = self.db.begin_write()?;
        {
            game.id = allocate_id(&txn, KEY_NEXT_GAME_ID)?;
            let mut games = txn.open_table(GAMES)?;
            let data = encode(&game)?;
            games.insert(id_key(game.id).as_slice(), data.as_slice())?;
        }
        txn.commit()?;
        debug!(game_id = game.id, name = %game.name, "created game");
        Ok(game)
    }

    fn get_game(&self, id: GameId) -> Result<Game> {
        let txn = self.db.begin_read()?;
        let games = txn.open_table(GAMES)?;
        let value = games
            .get(id_key(id).as_slice())?
            .ok_or_else(|| StorageError::not_found("game", id))?;
        let game = decode(value.value())?;
        Ok(game)
    }

    fn list_games(&self) -> Result<Vec<Game>> {
        let txn = self.db.begin_read()?;
        let games = txn.open_table(GAMES)?;
        let mut out: Vec<Game> = Vec::new();
        for entry in games.iter()? {
            let (_key, value) = entry?;
            out.push(decode(value.value())?);
        }
        // keys are big-endian ids, so the scan is ascending by id
        out.reverse();
        Ok(out)
    }

    fn update_game(&self, game: &Game) -> Result<Game> {
        game.validate()?;
        let updated = self.modify_game(game.id, |existing| {
            existing.name = game.name.clone();
            existing.game_path = game.game_path.clone();
            existing.backup_root = game.backup_root.clone();
        })?;
        debug!(game_id = updated.id, "updated game");
        Ok(updated)
    }

    fn update_game_last_backup_at(&self, id: GameId, at: DateTime<Utc>) -> Result<()> {
        self.modify_game(id, |existing| existing.last_backup_at = Some(at))?;
        debug!(game_id = id, %at, "updated last backup time");
        Ok(())
    }

    fn delete_game(&self, id: GameId) -> Result<()> {
        let txn = self.db.begin_write()?;
        let removed_backups = {
            let mut games = txn.open_table(GAMES)?;
            if games.remove(id_key(id).as_slice())?.is_none() {
                return Err(StorageError::not_found("game", id));
            }

            let mut backups = txn.open_table(BACKUPS)?;
            let mut doomed: Vec<Vec<u8>> = Vec::new();
            for entry in backups.iter()? {
                let (key, value) = entry?;
                let backup: Backup = decode(value.value())?;
                if backup.game_id == id {
                    doomed.push(key.value().to_vec());
                }
            }
            for key in &doomed {
                backups.remove(key.as_slice())?;
            }
            doomed.len()
        };
        txn.commit()?;
        debug!(game_id = id, removed_backups, "deleted game");
        Ok(())
    }
}

impl BackupRepository for RedbRepository {
    fn create_backup(&self, new_backup: NewBackup) -> Result<Backup> {
        let mut backup = new_backup.into_backup();
        let txn = self.db.begin_write()?;
        {
            backup.id = allocate_id(&txn, KEY_NEXT_BACKUP_ID)?;
            let mut backups = txn.open_table(BACKUPS)?;
            let data = encode(&backup)?;
            backups.insert(id_key(backup.id).as_slice(), data.as_slice())?;
        }
        txn.commit()?;
        debug!(backup_id = backup.id, game_id = backup.game_id, "created backup record");
        Ok(backup)
    }

    fn get_backup(&self, id: BackupId) -> Result<Backup> {
        let txn = self.db.begin_read()?;
        let backups = txn.open_table(BACKUPS)?;
        let value = backups
            .get(id_key(id).as_slice())?
            .ok_or_else(|| StorageError::not_found("backup", id))?;
        let backup = decode(value.value())?;
        Ok(backup)
    }

    fn list_backups_by_game(&self, game_id: GameId) -> Result<Vec<Backup>> {
        let txn = self.db.begin_read()?;
        let backups = txn.open_table(BACKUPS)?;
        let mut out = Vec::new();
        for entry in backups.iter()? {
            let (_key, value) = entry?;
            let backup: Backup = decode(value.value())?;
            if backup.game_id == game_id {
                out.push(backup);
            }
        }
        sort_backups_newest_first(&mut out);
        Ok(out)
    }

    fn get_latest_backup_by_game(&self, game_id: GameId) -> Result<Backup> {
        // O(total backups); acceptable at the volumes this store sees
        self.list_backups_by_game(game_id)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StorageError::new(
                    ErrorKind::NotFound,
                    format!("no backup found for game: {}", game_id),
                )
            })
    }

    fn delete_backup(&self, id: BackupId) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut backups = txn.open_table(BACKUPS)?;
            if backups.remove(id_key(id).as_slice())?.is_none() {
                return Err(StorageError::not_found("backup", id));
            }
        }
        txn.commit()?;
        debug!(backup_id = id, "deleted backup record");
        Ok(())
    }
}

/// Bump the named counter and return the new value (first id is 1)
fn allocate_id(txn: &WriteTransaction, counter: &str) -> Result<i64> {
    let mut meta = txn.open_table(META)?;
    let current = match meta.get(counter)? {
        Some(value) => decode_id(value.value())?,
        None => 0,
    };
    let next = current + 1;
    meta.insert(counter, next.to_be_bytes().as_slice())?;
    Ok(next)
}

fn id_key(id: i64) -> [u8; 8] {
    id.to_be_bytes()
}

fn decode_id(raw: &[u8]) -> Result<i64> {
    <[u8; 8]>::try_from(raw)
        .map(i64::from_be_bytes)
        .map_err(|_| {
            StorageError::serialization(format!("counter must be 8 bytes, found {}", raw.len()))
        })
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(raw)?)
}
