use std::fs;
use std::io;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::error::{BuildError, IoContext, Result};

pub(crate) fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

pub(crate) fn walk_error(root: &Path, err: walkdir::Error) -> BuildError {
    let path = err.path().unwrap_or(root).to_path_buf();
    BuildError::io(path, err.into())
}

/// Copies the tree under `from` over `to`, skipping dotfiles and hidden
/// directories. Existing files are overwritten. Returns the file count.
pub fn copy_layer(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(BuildError::io(
            from,
            io::Error::new(io::ErrorKind::NotFound, "source layer not found"),
        ));
    }
    fs::create_dir_all(to).at(to)?;

    let mut files = 0;
    let walker = WalkDir::new(from)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(from, e))?;
        let Ok(rel) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).at(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).at(parent)?;
            }
            fs::copy(entry.path(), &target).at(&target)?;
            files += 1;
        }
    }
    Ok(files)
}

/// Removes a file or directory; absent paths are fine.
pub fn remove_path(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other.at(path),
    }
}
