//! Facade contract, exercised against every backend

mod common;

use common::*;
use gamebk_storage::{ErrorKind, GameUpdate};
use pretty_assertions::assert_eq;

#[test]
fn test_create_and_get_game() {
    for (backend, repo) in backends() {
        let game = seed_game(&repo, "Foo");

        assert_eq!(game.id, 1, "{backend}");
        assert_eq!(game.last_backup_at, None, "{backend}");
        assert_eq!(game.created_at, game.updated_at, "{backend}");
        assert_eq!(repo.get_game(game.id).unwrap(), game, "{backend}");
    }
}

#[test]
fn test_create_game_rejects_blank_fields() {
    for (backend, repo) in backends() {
        let err = repo
            .create_game(gamebk_storage::NewGame::new("Foo", "   ", "/b"))
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation, "{backend}");
        assert!(repo.list_games().unwrap().is_empty(), "{backend}");
    }
}

#[test]
fn test_get_missing_game_is_not_found() {
    for (backend, repo) in backends() {
        let err = repo.get_game(99).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound, "{backend}");
        assert_eq!(err.message, "game not found: 99", "{backend}");
    }
}

#[test]
fn test_list_games_newest_id_first() {
    for (backend, repo) in backends() {
        for name in ["A", "B", "C"] {
            seed_game(&repo, name);
        }

        let games = repo.list_games().unwrap();
        assert_eq!(ids(&games, |g| g.id), vec![3, 2, 1], "{backend}");
    }
}

#[test]
fn test_update_game_replaces_fields() {
    for (backend, repo) in backends() {
        let mut game = seed_game(&repo, "Foo");
        game.name = "Bar".to_string();
        game.backup_root = "/elsewhere".to_string();

        let updated = repo.update_game(&game).unwrap();

        assert_eq!(updated.name, "Bar", "{backend}");
        assert_eq!(updated.game_path, "/save/foo", "{backend}");
        assert_eq!(updated.backup_root, "/elsewhere", "{backend}");
        assert_eq!(updated.created_at, game.created_at, "{backend}");
        assert!(updated.updated_at >= game.updated_at, "{backend}");
        assert_eq!(repo.get_game(game.id).unwrap(), updated, "{backend}");
    }
}

#[test]
fn test_update_game_validation_and_not_found() {
    for (backend, repo) in backends() {
        let mut game = seed_game(&repo, "Foo");
        game.name = "  ".to_string();
        let err = repo.update_game(&game).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "{backend}");

        game.name = "Foo".to_string();
        game.id = 77;
        let err = repo.update_game(&game).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound, "{backend}");
    }
}

#[test]
fn test_update_without_fields_is_rejected_before_storage() {
    for (backend, repo) in backends() {
        let mut game = seed_game(&repo, "Foo");
        let err = GameUpdate::default().apply_to(&mut game).unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation, "{backend}");
        assert_eq!(err.message, "no fields to update", "{backend}");
    }
}

#[test]
fn test_update_last_backup_at() {
    for (backend, repo) in backends() {
        let game = seed_game(&repo, "Foo");
        let at = gamebk_storage::now();

        repo.update_game_last_backup_at(game.id, at).unwrap();

        let stored = repo.get_game(game.id).unwrap();
        assert_eq!(stored.last_backup_at, Some(at), "{backend}");
        assert_eq!(stored.name, game.name, "{backend}");

        let err = repo.update_game_last_backup_at(404, at).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound, "{backend}");
    }
}

#[test]
fn test_backups_newest_first_and_latest_matches_head() {
    for (backend, repo) in backends() {
        let game = seed_game(&repo, "Foo");
        let other = seed_game(&repo, "Other");
        let first = seed_backup(&repo, game.id, "first");
        seed_backup(&repo, other.id, "unrelated");
        let second = seed_backup(&repo, game.id, "second");
        let third = seed_backup(&repo, game.id, "third");

        let listed = repo.list_backups_by_game(game.id).unwrap();
        assert_eq!(
            ids(&listed, |b| b.id),
            vec![third.id, second.id, first.id],
            "{backend}"
        );

        let latest = repo.get_latest_backup_by_game(game.id).unwrap();
        assert_eq!(latest, listed[0], "{backend}");
        assert_eq!(repo.get_backup(first.id).unwrap(), first, "{backend}");
    }
}

#[test]
fn test_latest_backup_of_game_without_backups_is_not_found() {
    for (backend, repo) in backends() {
        let game = seed_game(&repo, "Foo");

        assert!(repo.list_backups_by_game(game.id).unwrap().is_empty(), "{backend}");
        let err = repo.get_latest_backup_by_game(game.id).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound, "{backend}");
    }
}

#[test]
fn test_delete_backup() {
    for (backend, repo) in backends() {
        let game = seed_game(&repo, "Foo");
        let backup = seed_backup(&repo, game.id, "b1");

        repo.delete_backup(backup.id).unwrap();
        assert!(repo.get_backup(backup.id).unwrap_err().is_not_found(), "{backend}");

        let err = repo.delete_backup(backup.id).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound, "{backend}");
        assert!(repo.get_backup(backup.id).unwrap_err().is_not_found(), "{backend}");
    }
}

#[test]
fn test_delete_game_cascades_backup_records() {
    for (backend, repo) in backends() {
        let game = seed_game(&repo, "Foo");
        let keep = seed_game(&repo, "Keep");
        let doomed = seed_backup(&repo, game.id, "b1");
        let kept = seed_backup(&repo, keep.id, "k1");

        repo.delete_game(game.id).unwrap();

        assert!(repo.get_game(game.id).unwrap_err().is_not_found(), "{backend}");
        assert!(repo.get_backup(doomed.id).unwrap_err().is_not_found(), "{backend}");
        assert_eq!(repo.get_backup(kept.id).unwrap(), kept, "{backend}");
        assert_eq!(
            repo.delete_game(game.id).unwrap_err().kind,
            ErrorKind::NotFound,
            "{backend}"
        );
    }
}

#[test]
fn test_ids_keep_increasing_after_deletes() {
    for (backend, repo) in backends() {
        let a = seed_game(&repo, "A");
        let b = seed_game(&repo, "B");
        repo.delete_game(b.id).unwrap();
        let c = seed_game(&repo, "C");
        assert!(c.id > b.id && b.id > a.id, "{backend}");

        let b1 = seed_backup(&repo, a.id, "b1");
        repo.delete_backup(b1.id).unwrap();
        let b2 = seed_backup(&repo, a.id, "b2");
        assert!(b2.id > b1.id, "{backend}");
    }
}

#[test]
fn test_sqlite_rejects_backup_for_missing_game() {
    let repo = sqlite_repository();
    let err = repo.create_backup(new_backup(12, "orphan")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Referential);
}
