//! Domain models: `Game`, `Backup` and their input records

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

pub type GameId = i64;
pub type BackupId = i64;

/// Current UTC time at microsecond precision.
///
/// Both backends store timestamps losslessly at this precision, so a record
/// read back compares equal to the one returned at creation.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A tracked save-data location with an associated backup root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    /// Live save directory
    pub game_path: String,
    /// Directory under which backups are created
    pub backup_root: String,
    /// Absent until the first backup
    #[serde(default)]
    pub last_backup_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// Reject records whose mutable fields have been blanked out.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("game_path", &self.game_path)?;
        require_non_empty("backup_root", &self.backup_root)
    }
}

/// Input for creating a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGame {
    pub name: String,
    pub game_path: String,
    pub backup_root: String,
}

impl NewGame {
    pub fn new(
        name: impl Into<String>,
        game_path: impl Into<String>,
        backup_root: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            game_path: game_path.into(),
            backup_root: backup_root.into(),
        }
    }

    /// Trim every field and build the record to persist.
    ///
    /// `id` is left at 0 for the backend to assign.
    pub fn into_game(self) -> Result<Game> {
        let created_at = now();
        let game = Game {
            id: 0,
            name: self.name.trim().to_string(),
            game_path: self.game_path.trim().to_string(),
            backup_root: self.backup_root.trim().to_string(),
            last_backup_at: None,
            created_at,
            updated_at: created_at,
        };
        game.validate()?;
        Ok(game)
    }
}

/// Partial update of a game's mutable fields
///
/// `None` leaves a field untouched. At least one field must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub game_path: Option<String>,
    #[serde(default)]
    pub backup_root: Option<String>,
}

impl GameUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.game_path.is_none() && self.backup_root.is_none()
    }

    /// Apply the present fields to `game`, trimmed.
    ///
    /// Nothing is written to `game` unless every present field is valid.
    pub fn apply_to(&self, game: &mut Game) -> Result<()> {
        if self.is_empty() {
            return Err(StorageError::validation("no fields to update"));
        }
        let name = trimmed("name", self.name.as_deref())?;
        let game_path = trimmed("game_path", self.game_path.as_deref())?;
        let backup_root = trimmed("backup_root", self.backup_root.as_deref())?;

        if let Some(name) = name {
            game.name = name;
        }
        if let Some(game_path) = game_path {
            game.game_path = game_path;
        }
        if let Some(backup_root) = backup_root {
            game.backup_root = backup_root;
        }
        Ok(())
    }
}

/// One point-in-time copy of a game's save directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    pub id: BackupId,
    pub game_id: GameId,
    pub name: String,
    /// Directory holding the copied files, conventionally `backup_root/name`
    pub backup_path: String,
    pub created_at: DateTime<Utc>,
    /// Total bytes copied
    pub size_bytes: i64,
}

/// Input for recording a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBackup {
    pub game_id: GameId,
    pub name: String,
    pub backup_path: String,
    pub size_bytes: i64,
}

impl NewBackup {
    pub fn into_backup(self) -> Backup {
        Backup {
            id: 0,
            game_id: self.game_id,
            name: self.name,
            backup_path: self.backup_path,
            created_at: now(),
            size_bytes: self.size_bytes,
        }
    }
}

/// Newest first; equal timestamps fall back to the higher id.
pub fn sort_backups_newest_first(backups: &mut [Backup]) {
    backups.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StorageError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn trimmed(field: &str, value: Option<&str>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(raw) => {
            require_non_empty(field, raw)?;
            Ok(Some(raw.trim().to_string()))
        }
    }
}
