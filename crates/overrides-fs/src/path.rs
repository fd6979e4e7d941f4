//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Override names are stored in the manifest in this form so the document
/// diffs identically no matter which platform wrote it. Conversion to a
/// platform-native path happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes, drops `.` components and
    /// repeated separators.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let absolute = raw.starts_with('/');
        let parts: Vec<&str> = raw
            .split('/')
            .filter(|part| !part.is_empty() && *part != ".")
            .collect();
        let mut inner = parts.join("/");
        if absolute {
            inner.insert(0, '/');
        }
        Self { inner }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Resolve this (relative) path against `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        self.inner
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(root.to_path_buf(), |acc, part| acc.join(part))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// True if `self` equals `ancestor` or lives beneath it.
    pub fn starts_with(&self, ancestor: &NormalizedPath) -> bool {
        if ancestor.inner.is_empty() {
            return true;
        }
        self.inner == ancestor.inner
            || self
                .inner
                .strip_prefix(&ancestor.inner)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Validate that `path` is a relative path that stays inside its root.
///
/// Returns the normalized form on success.
pub fn validate_relative(path: &str) -> Result<NormalizedPath> {
    let invalid = |reason: &str| Error::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let normalized = NormalizedPath::new(path);
    if normalized.as_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    if normalized.as_str().starts_with('/') || Path::new(path).is_absolute() {
        return Err(invalid("path must be relative"));
    }
    if normalized.as_str().split('/').any(|part| part == "..") {
        return Err(invalid("path must not contain '..'"));
    }
    if normalized
        .as_str()
        .split('/')
        .next()
        .is_some_and(|first| first.ends_with(':'))
    {
        return Err(invalid("path must not carry a drive prefix"));
    }
    Ok(normalized)
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
