//! Filesystem helpers for placing and removing addon content
//!
//! These are blocking; async callers run them on `spawn_blocking`.

use crate::entry::is_relevant;
use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Move the relevant part of `from` into `to`, skipping irrelevant entries
/// and their subtrees
pub fn move_filtered(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;

    // Collected up front so the walk never sees a directory being emptied
    let entries = WalkDir::new(from)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || is_relevant(e))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for entry in entries {
        let target = to.join(relative_to(entry.path(), from)?);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Recursively copy a local directory
pub fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;

    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry?;
        let target = to.join(relative_to(entry.path(), from)?);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove a file or directory tree; a missing path is not an error
///
/// Returns whether anything was removed.
pub fn remove_path(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

/// Append `.extension` unless the path already ends with it
pub fn with_default_extension(path: &Path, extension: &str) -> PathBuf {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> io::Result<&'a Path> {
    path.strip_prefix(base).map_err(io::Error::other)
}
