//! Tests for the validation engine

use overrides_core::{
    Classifier, Manifest, Upstream, ValidationError, ValidationErrorKind, validate_manifest,
};
use overrides_fs::checksum::compute_checksum;
use overrides_test_utils::TestTree;
use pretty_assertions::assert_eq;

use ValidationErrorKind::*;

fn validate(tree: &TestTree, version: &str) -> Vec<ValidationError> {
    let manifest = Manifest::load(&tree.manifest_path()).unwrap();
    let classifier = Classifier::new(manifest.root(), Upstream::from_manifest(&manifest).unwrap());
    validate_manifest(&manifest, &classifier, version).unwrap()
}

fn errors(expected: &[(&str, ValidationErrorKind)]) -> Vec<ValidationError> {
    expected
        .iter()
        .map(|(name, kind)| ValidationError::new(*name, *kind))
        .collect()
}

#[test]
fn test_validate_clean_tree_has_no_errors() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/a.cpp", "int a;\n")
        .write("src/b.cpp", "int a; // tuned\n")
        .write("src/new.cpp", "int n;\n")
        .manifest(
            "1.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "copy"
base_file = "lib/a.cpp"
base_version = "1.0"

[[overrides]]
name = "src/b.cpp"
type = "derived"
base_file = "lib/a.cpp"
base_version = "1.0"

[[overrides]]
name = "src/new.cpp"
type = "platform"
"#,
        );

    assert_eq!(validate(&tree, "1.0"), vec![]);
}

#[test]
fn test_validate_copy_drift() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/a.cpp", "int a; // edited\n")
        .manifest(
            "1.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "copy"
base_file = "lib/a.cpp"
base_version = "1.0"
"#,
        );

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[("src/a.cpp", OverrideDifferentFromBase)])
    );
}

#[test]
fn test_validate_redundant_patch() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/a.cpp", "int a;\n")
        .manifest(
            "1.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "patch"
base_file = "lib/a.cpp"
base_version = "1.0"
issue = "UP-1"
"#,
        );

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[("src/a.cpp", OverrideSameAsBase)])
    );
}

#[test]
fn test_validate_reports_unlisted_files() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/extra.cpp", "int x;\n")
        .write("assets/icon.png", "png")
        .write(".hidden/ignored.txt", "x")
        .write("build/out.o", "obj")
        .manifest(
            "1.0",
            r#"
exclude = ["build/**"]

[[overrides]]
name = "assets"
type = "directory_copy"
base_file = "lib/assets"
base_version = "1.0"
"#,
        );
    tree.upstream("1.0", "lib/assets/icon.png", "png");

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[("src/extra.cpp", MissingFromManifest)])
    );
}

#[test]
fn test_validate_include_narrows_scan() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/extra.cpp", "int x;\n")
        .write("docs/readme.md", "docs")
        .manifest("1.0", "include = [\"src/**/*.cpp\"]\n");

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[("src/extra.cpp", MissingFromManifest)])
    );
}

#[test]
fn test_validate_override_not_found() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n").manifest(
        "1.0",
        r#"
[[overrides]]
name = "src/a.cpp"
type = "copy"
base_file = "lib/a.cpp"
base_version = "1.0"

[[overrides]]
name = "src/gone.cpp"
type = "platform"
"#,
    );

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[
            ("src/a.cpp", OverrideNotFound),
            ("src/gone.cpp", OverrideNotFound),
        ])
    );
}

#[test]
fn test_validate_wrong_target_kinds() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .upstream("1.0", "lib/assets/x.png", "x")
        .write("assets", "not a directory")
        .manifest(
            "1.0",
            r#"
[[overrides]]
name = "assets"
type = "directory_copy"
base_file = "lib/assets"
base_version = "1.0"

[[overrides]]
name = "src/a.cpp"
type = "copy"
base_file = "lib/a.cpp"
base_version = "1.0"
"#,
        );
    tree.write("src/a.cpp/inner.cpp", "int inner;\n");

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[("assets", ExpectedDirectory), ("src/a.cpp", ExpectedFile)])
    );
}

#[test]
fn test_validate_base_not_found_skips_content_checks() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/a.cpp", "int a;\n")
        .manifest(
            "1.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "derived"
base_file = "lib/removed.cpp"
base_version = "1.0"
"#,
        );

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[("src/a.cpp", BaseNotFound)])
    );
}

#[test]
fn test_validate_out_of_date_when_base_changed() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "foo\n")
        .upstream("2.0", "lib/a.cpp", "foo\nbar\n")
        .write("src/a.cpp", "foo\n// note\n")
        .manifest(
            "2.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "derived"
base_file = "lib/a.cpp"
base_version = "1.0"
"#,
        );

    assert_eq!(validate(&tree, "2.0"), errors(&[("src/a.cpp", OutOfDate)]));
}

#[test]
fn test_validate_unchanged_base_across_versions_is_current() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "foo\n")
        .upstream("2.0", "lib/a.cpp", "foo\n")
        .write("src/a.cpp", "foo\n// note\n")
        .manifest(
            "2.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "derived"
base_file = "lib/a.cpp"
base_version = "1.0"
"#,
        );

    assert_eq!(validate(&tree, "2.0"), vec![]);
}

#[test]
fn test_validate_missing_old_release_counts_as_changed() {
    let tree = TestTree::new();
    tree.upstream("2.0", "lib/a.cpp", "foo\n")
        .write("src/a.cpp", "foo\n// note\n")
        .manifest(
            "2.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "derived"
base_file = "lib/a.cpp"
base_version = "1.0"
"#,
        );

    assert_eq!(validate(&tree, "2.0"), errors(&[("src/a.cpp", OutOfDate)]));
}

#[test]
fn test_validate_recorded_hash_stands_in_for_old_release() {
    let tree = TestTree::new();
    let hash = compute_checksum(b"foo\n");
    tree.upstream("2.0", "lib/a.cpp", "foo\n")
        .write("src/a.cpp", "foo\n// note\n")
        .manifest(
            "2.0",
            &format!(
                r#"
[[overrides]]
name = "src/a.cpp"
type = "derived"
base_file = "lib/a.cpp"
base_version = "1.0"
base_hash = "{hash}"
"#
            ),
        );

    assert_eq!(validate(&tree, "2.0"), vec![]);
}

#[test]
fn test_validate_copy_compares_against_recorded_base() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "old\n")
        .upstream("2.0", "lib/a.cpp", "new\n")
        .write("src/a.cpp", "old\n")
        .manifest(
            "2.0",
            r#"
[[overrides]]
name = "src/a.cpp"
type = "copy"
base_file = "lib/a.cpp"
base_version = "1.0"
"#,
        );

    assert_eq!(validate(&tree, "2.0"), errors(&[("src/a.cpp", OutOfDate)]));
}

#[test]
fn test_validate_directory_copy_drift() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/assets/a.txt", "a")
        .upstream("1.0", "lib/assets/b.txt", "b")
        .write("assets/a.txt", "a")
        .write("assets/b.txt", "changed")
        .manifest(
            "1.0",
            r#"
[[overrides]]
name = "assets"
type = "directory_copy"
base_file = "lib/assets"
base_version = "1.0"
"#,
        );

    assert_eq!(
        validate(&tree, "1.0"),
        errors(&[("assets", OverrideDifferentFromBase)])
    );
}

#[test]
fn test_validate_is_idempotent_and_sorted() {
    let tree = TestTree::new();
    tree.upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("z.cpp", "z")
        .write("a.cpp", "int a;\n")
        .write("m.cpp", "int a; // changed\n")
        .manifest(
            "1.0",
            r#"
[[overrides]]
name = "m.cpp"
type = "copy"
base_file = "lib/a.cpp"
base_version = "1.0"

[[overrides]]
name = "a.cpp"
type = "patch"
base_file = "lib/a.cpp"
base_version = "1.0"
issue = "UP-2"
"#,
        );

    let first = validate(&tree, "1.0");
    let second = validate(&tree, "1.0");

    assert_eq!(first, second);
    assert_eq!(
        first,
        errors(&[
            ("a.cpp", OverrideSameAsBase),
            ("m.cpp", OverrideDifferentFromBase),
            ("z.cpp", MissingFromManifest),
        ])
    );
}
