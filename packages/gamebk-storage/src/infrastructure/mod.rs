//! Storage Infrastructure Layer
//!
//! Interchangeable backends for the repository ports

#[cfg(feature = "kv")]
pub mod redb_store;
#[cfg(feature = "kv")]
pub use redb_store::RedbRepository;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteRepository;
