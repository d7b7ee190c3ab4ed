//! Backup/restore engine
//!
//! Filesystem primitives only; no storage access. `service` composes these
//! with the repository.

pub mod fs_ops;
pub mod naming;
pub mod restore;

pub use fs_ops::{clear_directory_contents, copy_tree, copy_tree_into};
pub use naming::{BackupName, TIMESTAMP_FORMAT};
pub use restore::restore_backup_into_game;
