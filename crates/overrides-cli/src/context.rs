//! Manifest and upstream resolution for commands
//!
//! Commands work from any directory below the manifest, the way git does:
//! the nearest manifest is found by walking up from the current directory
//! unless `--manifest` names one explicitly.

use std::path::PathBuf;
use std::sync::Arc;

use overrides_core::{Classifier, Manifest, Upstream, UpstreamSource, VersionedDirs};
use overrides_fs::DEFAULT_MANIFEST;

use crate::error::Result;

/// Where a command runs and what it was told on the command line
#[derive(Debug, Clone)]
pub struct Context {
    cwd: PathBuf,
    manifest: Option<PathBuf>,
    upstream_version: Option<String>,
}

/// A loaded manifest together with its classifier
pub struct Session {
    pub manifest: Manifest,
    pub classifier: Classifier,
}

impl Context {
    pub fn new(cwd: PathBuf, manifest: Option<PathBuf>, upstream_version: Option<String>) -> Self {
        Self {
            cwd,
            manifest,
            upstream_version,
        }
    }

    /// Version given on the command line or in the environment
    pub fn requested_version(&self) -> Option<&str> {
        self.upstream_version.as_deref()
    }

    /// Path `init` should create
    pub fn init_path(&self) -> PathBuf {
        match &self.manifest {
            Some(path) => self.cwd.join(path),
            None => self.cwd.join(DEFAULT_MANIFEST),
        }
    }

    /// Path of the manifest to operate on
    pub fn manifest_path(&self) -> Result<PathBuf> {
        match &self.manifest {
            Some(path) => Ok(self.cwd.join(path)),
            None => Ok(Manifest::discover(&self.cwd)?),
        }
    }

    pub fn load_manifest(&self) -> Result<Manifest> {
        let path = self.manifest_path()?;
        tracing::debug!(path = %path.display(), "Using manifest");
        Ok(Manifest::load(&path)?)
    }

    /// Load the manifest and build a classifier for its upstream
    pub fn session(&self) -> Result<Session> {
        let manifest = self.load_manifest()?;
        let upstream = Upstream::from_manifest(&manifest)?;
        Ok(Self::session_with(manifest, upstream))
    }

    /// Like [`Context::session`], but tolerates a manifest with no upstream
    ///
    /// Only platform overrides can be handled this way; they never read
    /// from the upstream.
    pub fn local_session(&self) -> Result<Session> {
        let manifest = self.load_manifest()?;
        let upstream: Arc<dyn UpstreamSource> = match manifest.upstream {
            Some(_) => Upstream::from_manifest(&manifest)?,
            None => Arc::new(VersionedDirs::new(manifest.root())),
        };
        Ok(Self::session_with(manifest, upstream))
    }

    fn session_with(manifest: Manifest, upstream: Arc<dyn UpstreamSource>) -> Session {
        let classifier = Classifier::new(manifest.root(), upstream);
        Session {
            manifest,
            classifier,
        }
    }

    /// Active upstream version for `manifest`
    pub fn version(&self, manifest: &Manifest) -> Result<String> {
        Ok(manifest.active_version(self.requested_version())?)
    }
}
