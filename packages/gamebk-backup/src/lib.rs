//! gamebk-backup: back up and restore game save directories
//!
//! - [`engine`]: filesystem primitives (`copy_tree`, `copy_tree_into`,
//!   `clear_directory_contents`, `restore_backup_into_game`) and backup naming
//! - [`service`]: `BackupService`, the use cases combining storage and engine
//! - [`telemetry`]: tracing subscriber setup for the binary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gamebk_backup::BackupService;
//! use gamebk_storage::{open_repository, NewGame, StorageConfig};
//!
//! let service = BackupService::new(open_repository(&StorageConfig::from_env()?)?);
//! let game = service.create_game(NewGame::new("Foo", "/save/foo", "/backups/foo"))?;
//! let backup = service.backup_game(game.id, None)?;
//! service.restore_latest(game.id)?;
//! ```

pub mod engine;
pub mod error;
pub mod service;
pub mod telemetry;

pub use engine::{
    clear_directory_contents, copy_tree, copy_tree_into, restore_backup_into_game, BackupName,
};
pub use error::{BackupError, RestoreStage, Result, ServiceError, ServiceResult};
pub use service::BackupService;
pub use telemetry::init_tracing;
