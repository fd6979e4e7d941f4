//! File and directory content as seen by the engines.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use overrides_fs::checksum::{compute_checksum, compute_tree_checksum};
use overrides_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::Result;

/// Whether an override or base is a single file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    File,
    Directory,
}

impl TargetKind {
    /// Kind of the entry at `path`, following symlinks. `None` if missing.
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        if metadata.is_dir() {
            Some(Self::Directory)
        } else {
            Some(Self::File)
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// Bytes of a file, or every file of a directory keyed by relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    File(Vec<u8>),
    Tree(BTreeMap<String, Vec<u8>>),
}

impl Content {
    /// Canonical `sha256:` checksum of the content.
    pub fn checksum(&self) -> String {
        match self {
            Self::File(bytes) => compute_checksum(bytes),
            Self::Tree(tree) => compute_tree_checksum(tree),
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            Self::File(_) => TargetKind::File,
            Self::Tree(_) => TargetKind::Directory,
        }
    }

    /// Read `path` from disk as the given kind.
    pub fn read(path: &Path, kind: TargetKind) -> Result<Self> {
        match kind {
            TargetKind::File => Ok(Self::File(io::read_bytes(path)?)),
            TargetKind::Directory => Ok(Self::Tree(read_tree(path)?)),
        }
    }

    /// Write the content to `path`.
    ///
    /// Files are written atomically. For trees every file is written
    /// atomically and files no longer present in the tree are removed.
    pub fn write(&self, path: &Path) -> Result<()> {
        match self {
            Self::File(bytes) => Ok(io::write_atomic(path, bytes)?),
            Self::Tree(tree) => {
                let existing = if path.is_dir() {
                    read_tree_paths(path)?
                } else {
                    Vec::new()
                };
                for (relative, bytes) in tree {
                    io::write_atomic(&NormalizedPath::new(relative).under(path), bytes)?;
                }
                for stale in existing.iter().filter(|p| !tree.contains_key(*p)) {
                    let stale_path = NormalizedPath::new(stale).under(path);
                    fs::remove_file(&stale_path)
                        .map_err(|e| overrides_fs::Error::io(&stale_path, e))?;
                }
                Ok(())
            }
        }
    }
}

/// Read every file under `dir`, keyed by forward-slash relative path.
pub fn read_tree(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut tree = BTreeMap::new();
    for relative in read_tree_paths(dir)? {
        let bytes = io::read_bytes(&NormalizedPath::new(&relative).under(dir))?;
        tree.insert(relative, bytes);
    }
    Ok(tree)
}

fn read_tree_paths(dir: &Path) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            paths.push(NormalizedPath::new(relative).as_str().to_string());
        }
    }
    Ok(paths)
}

pub(crate) fn walk_error(root: &Path, error: walkdir::Error) -> overrides_fs::Error {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    overrides_fs::Error::io(path, error.into())
}
