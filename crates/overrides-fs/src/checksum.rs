//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) recorded in
//! the manifest as `base_hash` and used for drift detection.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of raw bytes.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute a checksum over a directory tree.
///
/// The tree is given as relative path to content. The digest covers each
/// path and the checksum of its content in path order, so two trees hash
/// equal exactly when they hold the same files with the same bytes.
pub fn compute_tree_checksum(tree: &BTreeMap<String, Vec<u8>>) -> String {
    let mut hasher = Sha256::new();
    for (path, content) in tree {
        hasher.update(path.as_bytes());
        hasher.update([0u8]);
        hasher.update(compute_checksum(content).as_bytes());
        hasher.update([b'\n']);
    }
    format!("{}{:x}", PREFIX, hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_has_prefix() {
        let checksum = compute_checksum(b"hello world");
        assert!(checksum.starts_with("sha256:"));
    }

    #[test]
    fn checksum_known_value() {
        let checksum = compute_checksum(b"hello world");
        assert_eq!(
            checksum,
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn tree_checksum_depends_on_paths() {
        let mut a = BTreeMap::new();
        a.insert("x.txt".to_string(), b"same".to_vec());
        let mut b = BTreeMap::new();
        b.insert("y.txt".to_string(), b"same".to_vec());

        assert_ne!(compute_tree_checksum(&a), compute_tree_checksum(&b));
        assert_eq!(compute_tree_checksum(&a), compute_tree_checksum(&a.clone()));
    }
}
