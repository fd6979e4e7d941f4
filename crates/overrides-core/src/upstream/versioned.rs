//! Upstream laid out as one directory per release

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use overrides_fs::{io, validate_relative};

use super::UpstreamSource;
use crate::content::{TargetKind, read_tree};
use crate::{Error, Result};

/// `<root>/<version>/<path>`
#[derive(Debug, Clone)]
pub struct VersionedDirs {
    root: PathBuf,
}

impl VersionedDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str, version: &str) -> Result<PathBuf> {
        let release = validate_relative(version)?;
        if release.as_str().contains('/') {
            return Err(overrides_fs::Error::InvalidPath {
                path: version.to_string(),
                reason: "version must be a single path component".to_string(),
            }
            .into());
        }
        let relative = validate_relative(path)?;
        Ok(relative.under(&release.under(&self.root)))
    }

    fn not_found(path: &str, version: &str) -> Error {
        Error::BaseNotFound {
            reference: path.to_string(),
            version: version.to_string(),
        }
    }
}

impl UpstreamSource for VersionedDirs {
    fn kind_of(&self, path: &str, version: &str) -> Result<Option<TargetKind>> {
        Ok(TargetKind::of(&self.resolve(path, version)?))
    }

    fn read_file(&self, path: &str, version: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path, version)?;
        if TargetKind::of(&full) != Some(TargetKind::File) {
            return Err(Self::not_found(path, version));
        }
        Ok(io::read_bytes(&full)?)
    }

    fn read_tree(&self, path: &str, version: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let full = self.resolve(path, version)?;
        if TargetKind::of(&full) != Some(TargetKind::Directory) {
            return Err(Self::not_found(path, version));
        }
        read_tree(&full)
    }

    fn locate(&self, path: &str, version: &str) -> String {
        match self.resolve(path, version) {
            Ok(full) => full.display().to_string(),
            Err(_) => format!("{}/{version}/{path}", self.root.display()),
        }
    }
}
