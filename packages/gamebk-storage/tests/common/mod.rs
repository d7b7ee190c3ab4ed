//! Shared fixtures for gamebk-storage integration tests
//!
//! Every contract test runs once per backend; `backends()` hands out a fresh
//! handle for each.

#![allow(dead_code)]

use gamebk_storage::{
    BackendKind, Backup, Game, GameId, NewBackup, NewGame, RedbRepository, Repository,
    SqliteRepository,
};

pub fn kv_repository() -> Repository {
    Repository::from_backend(RedbRepository::in_memory().expect("in-memory redb"))
}

pub fn sqlite_repository() -> Repository {
    Repository::from_backend(SqliteRepository::in_memory().expect("in-memory sqlite"))
}

/// One fresh repository per backend, labelled for assertion messages
pub fn backends() -> Vec<(BackendKind, Repository)> {
    vec![
        (BackendKind::Kv, kv_repository()),
        (BackendKind::Sqlite, sqlite_repository()),
    ]
}

pub fn new_game(name: &str) -> NewGame {
    let slug = name.to_lowercase();
    NewGame::new(name, format!("/save/{slug}"), format!("/backups/{slug}"))
}

pub fn seed_game(repo: &Repository, name: &str) -> Game {
    repo.create_game(new_game(name)).expect("create game")
}

pub fn new_backup(game_id: GameId, name: &str) -> NewBackup {
    NewBackup {
        game_id,
        name: name.to_string(),
        backup_path: format!("/backups/{game_id}/{name}"),
        size_bytes: 1024,
    }
}

pub fn seed_backup(repo: &Repository, game_id: GameId, name: &str) -> Backup {
    repo.create_backup(new_backup(game_id, name))
        .expect("create backup")
}

pub fn ids<T, F: Fn(&T) -> i64>(items: &[T], id: F) -> Vec<i64> {
    items.iter().map(id).collect()
}
