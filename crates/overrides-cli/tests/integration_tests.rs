//! Integration tests for the overrides CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use overrides_fs::{NamedLock, TOOL_IDENTITY};
use overrides_test_utils::TestTree;
use predicates::prelude::*;
use tempfile::TempDir;

/// A tree plus a private lock directory so tests do not contend
struct Fixture {
    tree: TestTree,
    lock_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            tree: TestTree::new(),
            lock_dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("overrides"));
        cmd.current_dir(self.tree.root())
            .env("OVERRIDES_LOCK_DIR", self.lock_dir.path())
            .env_remove("OVERRIDES_UPSTREAM_VERSION")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Derived override whose base gained a line in 2.0
fn stale_derived() -> Fixture {
    let fx = Fixture::new();
    fx.tree
        .upstream("1.0", "lib/a.cpp", "foo\n")
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
    fx
}

// ============================================================================
// Help and init
// ============================================================================

#[test]
fn test_help_output() {
    Fixture::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("overrides"))
        .stdout(predicate::str::contains("upgrade"));
}

#[test]
fn test_init_creates_manifest_once() {
    let fx = Fixture::new();

    fx.cmd()
        .args(["init", "--upstream", "upstream", "--upstream-version", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    fx.tree.assert_file_contains("overrides.toml", "versioned-dirs");

    fx.cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// Add, list, remove
// ============================================================================

#[test]
fn test_add_then_list() {
    let fx = Fixture::new();
    fx.tree
        .upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/a.cpp", "int a; // local\n")
        .manifest("1.0", "");

    fx.cmd()
        .args(["add", "src/a.cpp", "--type", "derived", "--base", "lib/a.cpp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracking"));

    fx.cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("src/a.cpp"))
        .stdout(predicate::str::contains("derived"));

    let output = fx.cmd().args(["list", "--json"]).output().unwrap();
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["name"], "src/a.cpp");
    assert_eq!(entries[0]["type"], "derived");
    assert_eq!(entries[0]["base_version"], "1.0");
}

#[test]
fn test_add_requires_type_without_terminal() {
    let fx = Fixture::new();
    fx.tree.write("src/a.cpp", "x").manifest("1.0", "");

    fx.cmd()
        .args(["add", "src/a.cpp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--type is required"));
}

#[test]
fn test_add_patch_requires_issue() {
    let fx = Fixture::new();
    fx.tree
        .upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/a.cpp", "int a; // fix\n")
        .manifest("1.0", "");

    fx.cmd()
        .args(["add", "src/a.cpp", "-t", "patch", "-b", "lib/a.cpp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires an issue"));
}

#[test]
fn test_remove_unknown_override_fails() {
    let fx = Fixture::new();
    fx.tree.manifest("1.0", "");

    fx.cmd()
        .args(["remove", "src/none.cpp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the manifest"));
}

#[test]
fn test_remove_tracked_override() {
    let fx = stale_derived();

    fx.cmd().args(["remove", "src/a.cpp"]).assert().success();
    fx.cmd()
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No overrides tracked"));
}

// ============================================================================
// Validate
// ============================================================================

#[test]
fn test_validate_clean_tree_succeeds() {
    let fx = Fixture::new();
    fx.tree
        .upstream("1.0", "lib/a.cpp", "int a;\n")
        .write("src/a.cpp", "int a;\n")
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

    fx.cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_reports_stale_override_and_fails() {
    let fx = stale_derived();

    fx.cmd()
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("out_of_date"))
        .stderr(predicate::str::contains("1 validation error(s) found"));
}

#[test]
fn test_validate_json_output() {
    let fx = stale_derived();

    let output = fx.cmd().args(["validate", "--json"]).output().unwrap();
    assert!(!output.status.success());
    let errors: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        errors,
        serde_json::json!([{ "name": "src/a.cpp", "kind": "out_of_date" }])
    );
}

#[test]
fn test_validate_upstream_version_flag_overrides_manifest() {
    let fx = stale_derived();

    fx.cmd()
        .args(["validate", "--upstream-version", "1.0"])
        .assert()
        .success();
    fx.cmd()
        .arg("validate")
        .env("OVERRIDES_UPSTREAM_VERSION", "1.0")
        .assert()
        .success();
}

#[test]
fn test_commands_find_manifest_from_subdirectory() {
    let fx = stale_derived();

    fx.cmd()
        .current_dir(fx.tree.root().join("src"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("src/a.cpp"));
}

// ============================================================================
// Upgrade and diff
// ============================================================================

#[test]
fn test_upgrade_conflict_is_not_written() {
    let fx = stale_derived();

    fx.cmd()
        .arg("upgrade")
        .assert()
        .failure()
        .stdout(predicate::str::contains("skipped"))
        .stderr(predicate::str::contains("--allow-conflicts"));
    assert_eq!(fx.tree.read("src/a.cpp"), "foo\n// note\n");
}

#[test]
fn test_upgrade_allow_conflicts_writes_markers() {
    let fx = stale_derived();

    fx.cmd()
        .args(["upgrade", "--allow-conflicts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("conflicts written"));
    fx.tree.assert_file_contains("src/a.cpp", "<<<<<<< override");
    fx.tree.assert_file_contains("overrides.toml", "base_version = \"2.0\"");
}

#[test]
fn test_upgrade_copy_then_nothing_left() {
    let fx = Fixture::new();
    fx.tree
        .upstream("1.0", "lib/a.cpp", "old\n")
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

    fx.cmd()
        .arg("upgrade")
        .assert()
        .success()
        .stdout(predicate::str::contains("merged"));
    assert_eq!(fx.tree.read("src/a.cpp"), "new\n");

    fx.cmd()
        .arg("upgrade")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to upgrade"));
}

#[test]
fn test_diff_shows_override_changes() {
    let fx = stale_derived();

    fx.cmd()
        .args(["diff", "src/a.cpp", "--upstream-version", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+// note"));
}

// ============================================================================
// Locking
// ============================================================================

#[test]
fn test_no_wait_fails_while_lock_is_held() {
    let fx = stale_derived();
    let lock = NamedLock::in_dir(fx.lock_dir.path(), TOOL_IDENTITY).with_command("upgrade");
    let guard = lock.try_lock().unwrap().unwrap();

    fx.cmd()
        .args(["list", "--no-wait"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Another instance is running"))
        .stderr(predicate::str::contains("upgrade"));

    guard.unlock().unwrap();
    fx.cmd().args(["list", "--no-wait"]).assert().success();
}
