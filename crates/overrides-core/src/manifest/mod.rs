//! Override manifest store
//!
//! The manifest is the persisted ledger of every tracked override. It is
//! loaded fresh for each operation, mutated in memory and written back
//! atomically (temp file + rename) with entries in name order, so the
//! document diffs cleanly under version control.

mod entry;

pub use entry::{BaseRef, OverrideEntry, OverrideKind, OverrideType};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use overrides_fs::{ConfigStore, MANIFEST_CANDIDATES};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Current manifest document format
const FORMAT_VERSION: &str = "1";

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

fn default_include() -> Vec<String> {
    vec!["**/*".to_string()]
}

/// How the upstream source is laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamLayout {
    /// `<source>/<version>/<base_file>`
    #[default]
    VersionedDirs,
    /// A git repository with one tag per release
    Git,
}

/// Where base files are read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Upstream root, relative to the manifest directory or absolute
    pub source: String,
    #[serde(default)]
    pub layout: UpstreamLayout,
    /// Prefix turning a version into a tag name (git layout only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_prefix: Option<String>,
    /// Active upstream version, unless the caller supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The override manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// File this manifest was loaded from and is saved to
    #[serde(skip)]
    path: PathBuf,
    /// Document format version for forward compatibility
    #[serde(default = "default_version")]
    version: String,
    /// Patterns selecting files that count as overrides during scans
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    /// Patterns excluded from scans
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Upstream source configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamConfig>,
    /// All tracked overrides
    #[serde(default)]
    overrides: Vec<OverrideEntry>,
}

impl Manifest {
    /// Create an empty manifest bound to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: default_version(),
            include: default_include(),
            exclude: Vec::new(),
            upstream: None,
            overrides: Vec::new(),
        }
    }

    /// Find the nearest manifest in `start` or one of its ancestors
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` if no directory up to the filesystem root
    /// holds a recognized manifest file.
    pub fn discover(start: &Path) -> Result<PathBuf> {
        let start = dunce::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
        let first = if start.is_file() {
            start.parent().map(Path::to_path_buf)
        } else {
            Some(start.clone())
        };

        let mut current = first;
        while let Some(dir) = current {
            for candidate in MANIFEST_CANDIDATES {
                let path = dir.join(candidate);
                if path.is_file() {
                    tracing::debug!(path = %path.display(), "Found manifest");
                    return Ok(path);
                }
            }
            current = dir.parent().map(Path::to_path_buf);
        }

        Err(Error::ManifestNotFound { start })
    }

    /// Load a manifest from a TOML, JSON or YAML file
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` if the file does not exist, `ManifestParse`
    /// if it is malformed and `DuplicateOverride` if a name repeats.
    pub fn load(path: &Path) -> Result<Self> {
        let mut manifest: Manifest = ConfigStore::new().load(path).map_err(|e| match e {
            e if e.is_not_found() => Error::ManifestNotFound {
                start: path.to_path_buf(),
            },
            overrides_fs::Error::ConfigParse { message, .. } => Error::ManifestParse {
                path: path.to_path_buf(),
                message,
            },
            other => Error::Fs(other),
        })?;
        manifest.path = path.to_path_buf();

        let mut seen = HashSet::new();
        for entry in &manifest.overrides {
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::DuplicateOverride {
                    name: entry.name.clone(),
                    path: manifest.path.clone(),
                });
            }
        }

        tracing::debug!(
            path = %manifest.path.display(),
            overrides = manifest.overrides.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    /// Save the manifest to its file atomically, entries sorted by name
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        let mut canonical = self.clone();
        canonical.overrides.sort_by(|a, b| a.name.cmp(&b.name));
        ConfigStore::new().save(&self.path, &canonical)?;
        tracing::debug!(path = %self.path.display(), "Saved manifest");
        Ok(())
    }

    /// Path of the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory override names are relative to
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Document format version
    pub fn format_version(&self) -> &str {
        &self.version
    }

    /// All entries in manifest order
    pub fn entries(&self) -> &[OverrideEntry] {
        &self.overrides
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&OverrideEntry> {
        self.overrides.iter().find(|e| e.name == name)
    }

    /// Mutable lookup by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut OverrideEntry> {
        self.overrides.iter_mut().find(|e| e.name == name)
    }

    /// True if an entry with `name` exists
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert an entry, replacing any entry with the same name
    ///
    /// Returns the replaced entry, if there was one.
    pub fn add(&mut self, entry: OverrideEntry) -> Option<OverrideEntry> {
        match self.get_mut(&entry.name) {
            Some(existing) => Some(std::mem::replace(existing, entry)),
            None => {
                self.overrides.push(entry);
                None
            }
        }
    }

    /// Remove an entry by name
    ///
    /// Returns false if there was nothing to remove.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.overrides.len();
        self.overrides.retain(|e| e.name != name);
        self.overrides.len() != before
    }

    /// The upstream version to validate and upgrade against
    ///
    /// A caller-supplied version wins over the manifest's configured one.
    pub fn active_version(&self, requested: Option<&str>) -> Result<String> {
        requested
            .map(str::to_string)
            .or_else(|| self.upstream.as_ref().and_then(|u| u.version.clone()))
            .ok_or(Error::NoUpstreamVersion)
    }

    /// Absolute path of the configured upstream source
    pub fn upstream_source(&self) -> Result<PathBuf> {
        let upstream = self.upstream.as_ref().ok_or(Error::NoUpstreamConfigured)?;
        let source = Path::new(&upstream.source);
        Ok(if source.is_absolute() {
            source.to_path_buf()
        } else {
            self.root().join(source)
        })
    }
}
