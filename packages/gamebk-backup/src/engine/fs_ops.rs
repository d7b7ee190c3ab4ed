//! Directory copy and clear primitives
//!
//! None of these are transactional: a failure part way leaves whatever was
//! already written or removed in place.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{BackupError, Result};

/// Copy `source` into a new directory `destination`.
///
/// Fails with `DestinationExists` if anything is already at `destination`.
/// Returns the total number of bytes copied.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<u64> {
    ensure_source_dir(source)?;
    match fs::symlink_metadata(destination) {
        Ok(_) => return Err(BackupError::DestinationExists(destination.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(BackupError::io("stat", destination)(err)),
    }
    ensure_disjoint(source, destination)?;

    fs::create_dir_all(destination).map_err(BackupError::io("create directory", destination))?;
    let total = copy_entries(source, destination)?;
    debug!(source = %source.display(), destination = %destination.display(), bytes = total, "copied tree");
    Ok(total)
}

/// Copy `source` into `destination`, creating it if absent and overwriting
/// files that are already there.
pub fn copy_tree_into(source: &Path, destination: &Path) -> Result<u64> {
    ensure_source_dir(source)?;
    ensure_disjoint(source, destination)?;

    fs::create_dir_all(destination).map_err(BackupError::io("create directory", destination))?;
    let total = copy_entries(source, destination)?;
    debug!(source = %source.display(), destination = %destination.display(), bytes = total, "copied tree into");
    Ok(total)
}

/// Remove every child of `directory`, keeping the directory itself.
pub fn clear_directory_contents(directory: &Path) -> Result<()> {
    let entries = fs::read_dir(directory).map_err(BackupError::io("read directory", directory))?;
    let mut removed = 0usize;
    for entry in entries {
        let entry = entry.map_err(BackupError::io("read directory", directory))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(BackupError::io("stat", &path))?;
        // DirEntry::file_type does not follow links: a link to a directory is unlinked, not emptied
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(BackupError::io("remove directory", &path))?;
        } else {
            fs::remove_file(&path).map_err(BackupError::io("remove file", &path))?;
        }
        removed += 1;
    }
    debug!(directory = %directory.display(), removed, "cleared directory");
    Ok(())
}

fn ensure_source_dir(source: &Path) -> Result<()> {
    let metadata = fs::metadata(source).map_err(BackupError::io("stat", source))?;
    if !metadata.is_dir() {
        return Err(BackupError::SourceNotDirectory(source.to_path_buf()));
    }
    Ok(())
}

/// Reject copies where one tree contains the other.
pub(crate) fn ensure_disjoint(source: &Path, destination: &Path) -> Result<()> {
    let source_abs = comparable(source);
    let destination_abs = comparable(destination);
    if destination_abs.starts_with(&source_abs) || source_abs.starts_with(&destination_abs) {
        return Err(BackupError::OverlappingPaths {
            source_dir: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    Ok(())
}

/// Absolute form of `path` as the OS would resolve it, even where parts of it
/// do not exist yet.
///
/// Components are applied one at a time; every prefix that exists is
/// canonicalized before the next `..` pops it, so links resolve first.
fn comparable(path: &Path) -> PathBuf {
    let mut resolved = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().unwrap_or_default()
    };
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => {
                resolved.push(other);
                if let Ok(canonical) = fs::canonicalize(&resolved) {
                    resolved = canonical;
                }
            }
        }
    }
    resolved
}

fn copy_entries(source: &Path, destination: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|err| BackupError::Walk {
            path: err.path().unwrap_or(source).to_path_buf(),
            source: err,
        })?;
        let rel = entry.path().strip_prefix(source).map_err(|_| BackupError::Io {
            op: "resolve",
            path: entry.path().to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "entry outside source tree"),
        })?;
        let target = destination.join(rel);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            return Err(BackupError::SymlinkUnsupported(entry.path().to_path_buf()));
        }
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(BackupError::io("create directory", &target))?;
        } else if file_type.is_file() {
            total += copy_file(entry.path(), &target)?;
        } else {
            warn!(path = %entry.path().display(), "skipping special file");
        }
    }
    Ok(total)
}

/// Copy one regular file and flush it to disk before returning.
fn copy_file(source: &Path, target: &Path) -> Result<u64> {
    let mut input = File::open(source).map_err(BackupError::io("open", source))?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(BackupError::io("create directory", parent))?;
    }
    let mut output = File::create(target).map_err(BackupError::io("create", target))?;
    let copied = io::copy(&mut input, &mut output).map_err(BackupError::io("copy", source))?;
    output.sync_all().map_err(BackupError::io("sync", target))?;
    debug!(file = %source.display(), bytes = copied, "copied file");
    Ok(copied)
}
