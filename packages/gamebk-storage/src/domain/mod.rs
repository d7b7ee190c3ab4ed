//! Domain layer: entities and repository ports
//!
//! # Domain Models
//!
//! - `Game`: a save directory plus the root its backups go under
//! - `Backup`: one copy of a game's save directory
//!
//! # Port Traits
//!
//! - `GameRepository`, `BackupRepository`: implemented by every backend
//!
//! # Examples
//!
//! ```rust,ignore
//! use gamebk_storage::domain::{GameRepository, NewGame};
//!
//! fn example(games: &dyn GameRepository) -> gamebk_storage::Result<()> {
//!     let game = games.create_game(NewGame::new("Foo", "/save/foo", "/backups/foo"))?;
//!     assert_eq!(games.get_game(game.id)?, game);
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod ports;

pub use models::{
    now, sort_backups_newest_first, Backup, BackupId, Game, GameId, GameUpdate, NewBackup,
    NewGame,
};
pub use ports::{BackupRepository, GameRepository};
