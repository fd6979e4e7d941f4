//! Upstream content providers
//!
//! Base files are read at a named upstream release. Two layouts are
//! supported: a directory per release, and a git repository with one tag per
//! release.

mod git;
mod versioned;

pub use git::GitTags;
pub use versioned::VersionedDirs;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Result;
use crate::content::TargetKind;
use crate::manifest::{Manifest, UpstreamConfig, UpstreamLayout};

/// Tag prefix used when the manifest does not set one
pub const DEFAULT_TAG_PREFIX: &str = "v";

/// Read access to upstream releases
///
/// Paths are forward-slash paths relative to the upstream root.
pub trait UpstreamSource: Send + Sync {
    /// Kind of `path` at `version`, or `None` if it does not exist there
    fn kind_of(&self, path: &str, version: &str) -> Result<Option<TargetKind>>;

    /// Bytes of the file at `path`
    ///
    /// # Errors
    ///
    /// Returns `BaseNotFound` if there is no file at `path` in `version`.
    fn read_file(&self, path: &str, version: &str) -> Result<Vec<u8>>;

    /// Every file under the directory at `path`, keyed by relative path
    ///
    /// # Errors
    ///
    /// Returns `BaseNotFound` if there is no directory at `path` in `version`.
    fn read_tree(&self, path: &str, version: &str) -> Result<BTreeMap<String, Vec<u8>>>;

    /// Human-readable location of `path` at `version`
    fn locate(&self, path: &str, version: &str) -> String;
}

/// Builds the provider a manifest is configured for
pub struct Upstream;

impl Upstream {
    /// Provider for the manifest's `upstream` table
    ///
    /// # Errors
    ///
    /// Returns `NoUpstreamConfigured` if the manifest has no upstream table.
    pub fn from_manifest(manifest: &Manifest) -> Result<Arc<dyn UpstreamSource>> {
        let config = manifest
            .upstream
            .as_ref()
            .ok_or(crate::Error::NoUpstreamConfigured)?;
        let source = manifest.upstream_source()?;
        Ok(Self::from_config(config, source))
    }

    /// Provider for `config`, with `source` already resolved to a real path
    pub fn from_config(
        config: &UpstreamConfig,
        source: std::path::PathBuf,
    ) -> Arc<dyn UpstreamSource> {
        match config.layout {
            UpstreamLayout::VersionedDirs => Arc::new(VersionedDirs::new(source)),
            UpstreamLayout::Git => {
                let prefix = config
                    .tag_prefix
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TAG_PREFIX.to_string());
                Arc::new(GitTags::new(source, prefix))
            }
        }
    }
}
