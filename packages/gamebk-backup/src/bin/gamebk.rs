//! gamebk: game save backup CLI
//!
//! # Usage
//!
//! ```bash
//! gamebk add-game --name Foo --game-path ~/.local/share/foo/saves --backup-root ~/backups/foo
//! gamebk backup 1 --name before-boss
//! gamebk backups 1
//! gamebk restore 1                 # latest backup
//! gamebk restore 1 --backup 3
//! gamebk --backend sqlite --db ./data/gamebk.sqlite games
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gamebk_backup::{init_tracing, BackupService};
use gamebk_storage::{open_repository, BackendKind, GameUpdate, NewGame, StorageConfig};
use serde_json::json;

#[derive(Parser)]
#[command(name = "gamebk")]
#[command(about = "Back up and restore game save directories", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML storage configuration (overrides GAMEBK_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend: kv or sqlite
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Database file path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a game
    AddGame {
        #[arg(long)]
        name: String,

        /// Live save directory
        #[arg(long)]
        game_path: String,

        /// Directory backups are created under
        #[arg(long)]
        backup_root: String,
    },

    /// Change a game's name or paths
    UpdateGame {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        game_path: Option<String>,

        #[arg(long)]
        backup_root: Option<String>,
    },

    /// List games, newest first
    Games,

    /// Back up a game's save directory
    Backup {
        game_id: i64,

        /// Backup directory name (default: current local time)
        #[arg(long)]
        name: Option<String>,
    },

    /// List a game's backups, newest first
    Backups { game_id: i64 },

    /// Restore the latest backup, or the one given by --backup
    Restore {
        game_id: i64,

        #[arg(long)]
        backup: Option<i64>,
    },

    /// Delete a backup record
    DeleteBackup {
        game_id: i64,
        backup_id: i64,

        /// Also remove the backup directory
        #[arg(long)]
        purge: bool,
    },

    /// Delete a game and its backup records (directories are kept)
    DeleteGame { game_id: i64 },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = storage_config(&cli)?;
    let repo = open_repository(&config)
        .with_context(|| format!("failed to open {} store at {}", config.backend, config.db_path.display()))?;
    let service = BackupService::new(repo);

    run(&service, cli.command)
}

/// Environment, then config file, then command-line flags
fn storage_config(cli: &Cli) -> Result<StorageConfig> {
    let mut config = match &cli.config {
        Some(path) => StorageConfig::from_yaml_file(path)
            .with_context(|| format!("invalid config file {}", path.display()))?,
        None => StorageConfig::from_env().context("invalid GAMEBK_* environment")?,
    };
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    Ok(config)
}

fn run(service: &BackupService, command: Commands) -> Result<()> {
    match command {
        Commands::AddGame {
            name,
            game_path,
            backup_root,
        } => print_json(&service.create_game(NewGame::new(name, game_path, backup_root))?),
        Commands::UpdateGame {
            id,
            name,
            game_path,
            backup_root,
        } => {
            let update = GameUpdate {
                name,
                game_path,
                backup_root,
            };
            print_json(&service.update_game(id, update)?)
        }
        Commands::Games => print_json(&service.list_games()?),
        Commands::Backup { game_id, name } => {
            print_json(&service.backup_game(game_id, name.as_deref())?)
        }
        Commands::Backups { game_id } => print_json(&service.list_backups(game_id)?),
        Commands::Restore { game_id, backup } => {
            let restored = match backup {
                Some(backup_id) => service.restore_backup(game_id, backup_id)?,
                None => service.restore_latest(game_id)?,
            };
            print_json(&json!({ "restored": restored }))
        }
        Commands::DeleteBackup {
            game_id,
            backup_id,
            purge,
        } => {
            service.delete_backup(game_id, backup_id, purge)?;
            print_json(&json!({ "deleted_backup": backup_id, "purged": purge }))
        }
        Commands::DeleteGame { game_id } => {
            service.delete_game(game_id)?;
            print_json(&json!({ "deleted_game": game_id }))
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
