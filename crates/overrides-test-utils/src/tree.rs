//! [`TestTree`] builder for override scenarios.
//!
//! Lays out a manifest directory holding overrides, with a `versioned-dirs`
//! upstream under `upstream/<version>/`.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Directory name of the upstream inside a [`TestTree`]
pub const UPSTREAM_DIR: &str = "upstream";

/// A temporary manifest directory with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use overrides_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.upstream("0.72.0", "lib/a.cpp", "int a;\n");
/// tree.write("src/a.cpp", "int a;\n");
/// tree.manifest("0.72.0", r#"
/// [[overrides]]
/// name = "src/a.cpp"
/// type = "copy"
/// base_file = "lib/a.cpp"
/// base_version = "0.72.0"
/// "#);
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the tree; override names are relative to it.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the default manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("overrides.toml")
    }

    /// Root of the versioned upstream.
    pub fn upstream_root(&self) -> PathBuf {
        self.root().join(UPSTREAM_DIR)
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestTree::write: failed to write {relative}: {e}"));
        self
    }

    /// Write `upstream/<version>/<relative>`.
    pub fn upstream(&self, version: &str, relative: &str, content: &str) -> &Self {
        self.write(&format!("{UPSTREAM_DIR}/{version}/{relative}"), content)
    }

    /// Write `overrides.toml` pointing at the local upstream, followed by
    /// `body`.
    ///
    /// The upstream is an inline table, so `body` may start with top-level
    /// keys such as `exclude` before its `[[overrides]]` tables.
    pub fn manifest(&self, version: &str, body: &str) -> &Self {
        let header = format!(
            "version = \"1\"\nupstream = {{ source = \"{UPSTREAM_DIR}\", layout = \"versioned-dirs\", version = \"{version}\" }}\n"
        );
        fs::write(self.manifest_path(), format!("{header}\n{body}"))
            .unwrap_or_else(|e| panic!("TestTree::manifest: failed to write manifest: {e}"));
        self
    }

    /// Read a file relative to the root.
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative))
            .unwrap_or_else(|e| panic!("TestTree::read: failed to read {relative}: {e}"))
    }

    /// Assert that a file exists relative to the root.
    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert that a file contains the expected substring.
    pub fn assert_file_contains(&self, relative: &str, expected: &str) {
        let content = self.read(relative);
        assert!(
            content.contains(expected),
            "File {relative} does not contain '{expected}'. Content:\n{content}"
        );
    }
}
