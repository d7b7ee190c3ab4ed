//! gamebk-storage: persistence for games and their backups
//!
//! Two interchangeable backends implement the same pair of ports:
//!
//! - **kv** (`RedbRepository`): embedded redb database, JSON blobs keyed by
//!   big-endian ids, counters kept in a `meta` table
//! - **sqlite** (`SqliteRepository`): relational schema with a foreign key from
//!   backups to games
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gamebk_storage::{open_repository, NewGame, StorageConfig};
//!
//! let repo = open_repository(&StorageConfig::from_env()?)?;
//! let game = repo.create_game(NewGame::new("Foo", "/save/foo", "/backups/foo"))?;
//! let latest = repo.get_latest_backup_by_game(game.id);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod repository;

pub use config::{BackendKind, StorageConfig};
pub use error::{ErrorKind, Result, StorageError};
pub use repository::{open_repository, Repository};

pub use domain::{
    now, Backup, BackupId, BackupRepository, Game, GameId, GameRepository, GameUpdate, NewBackup,
    NewGame,
};

#[cfg(feature = "kv")]
pub use infrastructure::RedbRepository;
#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteRepository;
