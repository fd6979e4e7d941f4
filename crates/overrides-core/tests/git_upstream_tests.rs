//! Tests for the git tag upstream

use std::sync::Arc;

use overrides_core::{
    Classifier, Error, GitTags, Manifest, TargetKind, UpstreamSource, ValidationError,
    ValidationErrorKind, validate_manifest,
};
use overrides_test_utils::git::tagged_upstream;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn releases(dir: &std::path::Path) -> GitTags {
    tagged_upstream(
        dir,
        &[
            ("1.0", &[("lib/a.cpp", "foo\n"), ("lib/assets/x.txt", "x")]),
            ("2.0", &[("lib/a.cpp", "foo\nbar\n"), ("lib/assets/y/z.txt", "z")]),
        ],
    );
    GitTags::new(dir, "v")
}

#[test]
fn test_git_reads_files_per_tag() {
    let temp = TempDir::new().unwrap();
    let upstream = releases(temp.path());

    assert_eq!(upstream.read_file("lib/a.cpp", "1.0").unwrap(), b"foo\n");
    assert_eq!(upstream.read_file("lib/a.cpp", "2.0").unwrap(), b"foo\nbar\n");
    assert_eq!(upstream.locate("lib/a.cpp", "2.0"), "v2.0:lib/a.cpp");
}

#[test]
fn test_git_reads_trees_per_tag() {
    let temp = TempDir::new().unwrap();
    let upstream = releases(temp.path());

    let old: Vec<String> = upstream.read_tree("lib/assets", "1.0").unwrap().into_keys().collect();
    let new: Vec<String> = upstream.read_tree("lib/assets", "2.0").unwrap().into_keys().collect();

    assert_eq!(old, vec!["x.txt".to_string()]);
    assert_eq!(new, vec!["y/z.txt".to_string()]);
}

#[test]
fn test_git_missing_tag_or_path() {
    let temp = TempDir::new().unwrap();
    let upstream = releases(temp.path());

    assert_eq!(upstream.kind_of("lib/a.cpp", "9.9").unwrap(), None);
    assert_eq!(upstream.kind_of("lib/none.cpp", "1.0").unwrap(), None);
    assert_eq!(
        upstream.kind_of("lib/assets", "1.0").unwrap(),
        Some(TargetKind::Directory)
    );
    assert!(matches!(
        upstream.read_file("lib/assets", "1.0"),
        Err(Error::BaseNotFound { .. })
    ));
}

#[test]
fn test_git_upstream_drives_validation() {
    let upstream_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let upstream: Arc<dyn UpstreamSource> = Arc::new(releases(upstream_dir.path()));

    std::fs::create_dir_all(work.path().join("src")).unwrap();
    std::fs::write(work.path().join("src/a.cpp"), "foo\n// note\n").unwrap();
    let manifest_path = work.path().join("overrides.toml");
    std::fs::write(
        &manifest_path,
        format!(
            r#"
upstream = {{ source = "{}", layout = "git" }}

[[overrides]]
name = "src/a.cpp"
type = "derived"
base_file = "lib/a.cpp"
base_version = "1.0"
"#,
            upstream_dir.path().display().to_string().replace('\\', "/")
        ),
    )
    .unwrap();

    let manifest = Manifest::load(&manifest_path).unwrap();
    let classifier = Classifier::new(manifest.root(), upstream);

    assert_eq!(validate_manifest(&manifest, &classifier, "1.0").unwrap(), vec![]);
    assert_eq!(
        validate_manifest(&manifest, &classifier, "2.0").unwrap(),
        vec![ValidationError::new("src/a.cpp", ValidationErrorKind::OutOfDate)]
    );
}
