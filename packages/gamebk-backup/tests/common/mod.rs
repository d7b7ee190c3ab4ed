//! Shared fixtures for gamebk-backup integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gamebk_backup::BackupService;
use gamebk_storage::{Game, NewGame, RedbRepository, Repository, SqliteRepository};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Write `files` (relative path, contents) under `root`, creating parents
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// Every regular file under `root`, keyed by `/`-joined relative path
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap();
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (key, fs::read(entry.path()).unwrap())
        })
        .collect()
}

pub fn sample_save() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("slot1.sav", b"level=3;hp=40".as_slice()),
        ("profiles/main/settings.ini", b"volume=7".as_slice()),
        ("profiles/main/achievements.dat", b"\x00\x01\x02\x03\x04\x05\x06\x07".as_slice()),
    ]
}

pub fn total_size(files: &[(&str, &[u8])]) -> u64 {
    files.iter().map(|(_, contents)| contents.len() as u64).sum()
}

/// Scratch layout: `<tmp>/save` (populated) and `<tmp>/backups` (absent)
pub struct Workspace {
    pub dir: TempDir,
    pub save: PathBuf,
    pub backups: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let save = dir.path().join("save");
        let backups = dir.path().join("backups");
        fs::create_dir(&save).unwrap();
        write_tree(&save, &sample_save());
        Self { dir, save, backups }
    }

    pub fn new_game(&self, name: &str) -> NewGame {
        NewGame::new(
            name,
            self.save.to_string_lossy(),
            self.backups.to_string_lossy(),
        )
    }
}

pub fn services() -> Vec<(&'static str, BackupService)> {
    vec![
        (
            "kv",
            BackupService::new(Repository::from_backend(RedbRepository::in_memory().unwrap())),
        ),
        (
            "sqlite",
            BackupService::new(Repository::from_backend(
                SqliteRepository::in_memory().unwrap(),
            )),
        ),
    ]
}

pub fn register(service: &BackupService, ws: &Workspace) -> Game {
    service.create_game(ws.new_game("Foo")).unwrap()
}
