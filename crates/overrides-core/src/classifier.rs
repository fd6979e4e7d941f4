//! File classifier
//!
//! Resolves an entry to what is actually on disk and upstream: where the
//! override lives, whether it is a file or directory, and what its base is
//! at a given release.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use overrides_fs::NormalizedPath;

use crate::Result;
use crate::content::{Content, TargetKind};
use crate::manifest::{BaseRef, OverrideEntry};
use crate::upstream::UpstreamSource;

/// On-disk and upstream state of one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub name: String,
    /// Absolute path of the override
    pub path: PathBuf,
    /// What the entry type says the override must be
    pub expected: TargetKind,
    /// What is actually there, if anything
    pub actual: Option<TargetKind>,
    /// Base state for entries that carry one
    pub base: Option<BaseStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseStatus {
    pub reference: BaseRef,
    /// Where the base was looked up at the requested release
    pub location: String,
    pub actual: Option<TargetKind>,
}

impl Classification {
    /// Override exists with the expected kind
    pub fn override_ok(&self) -> bool {
        self.actual == Some(self.expected)
    }

    /// Base exists with the expected kind, or the entry has no base
    pub fn base_ok(&self) -> bool {
        self.base
            .as_ref()
            .is_none_or(|base| base.actual == Some(self.expected))
    }
}

/// Classifies entries relative to a manifest directory and an upstream
#[derive(Clone)]
pub struct Classifier {
    root: PathBuf,
    upstream: Arc<dyn UpstreamSource>,
}

impl Classifier {
    pub fn new(root: impl Into<PathBuf>, upstream: Arc<dyn UpstreamSource>) -> Self {
        Self {
            root: root.into(),
            upstream,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn upstream(&self) -> &dyn UpstreamSource {
        self.upstream.as_ref()
    }

    /// Absolute path of the override called `name`
    pub fn override_path(&self, name: &str) -> PathBuf {
        NormalizedPath::new(name).under(&self.root)
    }

    /// Classify `entry` against upstream release `version`
    pub fn classify(&self, entry: &OverrideEntry, version: &str) -> Result<Classification> {
        let path = self.override_path(&entry.name);
        let actual = TargetKind::of(&path);

        let base = match entry.kind.base() {
            Some(reference) => Some(BaseStatus {
                reference: reference.clone(),
                location: self.upstream.locate(&reference.base_file, version),
                actual: self.upstream.kind_of(&reference.base_file, version)?,
            }),
            None => None,
        };

        Ok(Classification {
            name: entry.name.clone(),
            path,
            expected: entry.kind.target(),
            actual,
            base,
        })
    }

    /// Current content of the override
    pub fn read_override(&self, name: &str, kind: TargetKind) -> Result<Content> {
        Content::read(&self.override_path(name), kind)
    }

    /// Content of `base_file` at `version`
    pub fn read_base(&self, base_file: &str, kind: TargetKind, version: &str) -> Result<Content> {
        match kind {
            TargetKind::File => Ok(Content::File(self.upstream.read_file(base_file, version)?)),
            TargetKind::Directory => Ok(Content::Tree(self.upstream.read_tree(base_file, version)?)),
        }
    }

    /// Like [`Classifier::read_base`], but `None` when the base is missing
    pub fn try_read_base(
        &self,
        base_file: &str,
        kind: TargetKind,
        version: &str,
    ) -> Result<Option<Content>> {
        match self.read_base(base_file, kind, version) {
            Ok(content) => Ok(Some(content)),
            Err(crate::Error::BaseNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
