//! Candidate file enumeration and worker partitioning.
//!
//! This module produces the ordered set of file paths a scan will visit,
//! under one of three strategies (explicit list, flat directory listing,
//! recursive tree walk with folder exclusions), and splits that order
//! deterministically across workers.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Yields exactly the user-supplied paths, in the given order.
///
/// No filesystem access happens here; nonexistent entries simply fail
/// later, at disassembly time, and are skipped.
pub fn enumerate_explicit(paths: &[String]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

/// Yields the immediate children of `base_dir` that are regular files.
///
/// Directories (including symlinked directories) are skipped. A missing
/// or unreadable base directory yields an empty sequence: enumeration is
/// best-effort discovery, not validation.
pub fn enumerate_flat(base_dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read directory {}: {}", base_dir.display(), e);
            return Vec::new();
        }
    };

    entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect()
}

/// Walks the tree rooted at `base_dir` and yields every regular file
/// outside the ignored subtrees.
///
/// A directory whose path starts with any entry of `ignore_folders`
/// (string-prefix match) is pruned along with its whole subtree.
/// The walk does not descend into symlinked directories, so cyclic
/// link structures cannot trap it, but a symlink resolving to a
/// regular file is still yielded, matching the flat strategy. A
/// missing base directory yields nothing.
pub fn enumerate_recursive(base_dir: &Path, ignore_folders: &[String]) -> Vec<PathBuf> {
    WalkDir::new(base_dir)
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && is_ignored(entry.path(), ignore_folders) {
                debug!("Ignored: {}", entry.path().display());
                return false;
            }
            true
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Walk error under {}: {}", base_dir.display(), e);
                None
            }
        })
        // The resolved file test, not the entry type: a symlink to a
        // regular file counts, a symlink to a directory does not.
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Checks whether a directory path falls under any ignored folder prefix.
fn is_ignored(path: &Path, ignore_folders: &[String]) -> bool {
    let path = path.to_string_lossy();
    ignore_folders
        .iter()
        .any(|ignored| path.starts_with(ignored.as_str()))
}

/// Assigns the i-th enumerated path to partition `i mod n`.
///
/// Pure and order-dependent: the same enumeration order always produces
/// the same partitioning, every path lands in exactly one partition, and
/// enumeration order is preserved within each partition.
pub fn partition(paths: Vec<PathBuf>, n: usize) -> Vec<Vec<PathBuf>> {
    assert!(n > 0, "partition count must be at least 1");

    let mut partitions: Vec<Vec<PathBuf>> = vec![Vec::new(); n];
    for (i, path) in paths.into_iter().enumerate() {
        partitions[i % n].push(path);
    }
    partitions
}
