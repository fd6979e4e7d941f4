//! Git upstream fixtures.
//!
//! Builds a repository where every release is a commit tagged
//! `<prefix><version>`, the layout read by the git upstream provider.

use std::fs;
use std::path::Path;

/// One release: its version and the files it contains.
pub type Release<'a> = (&'a str, &'a [(&'a str, &'a str)]);

/// Initialises a repository at `path` and commits each release in order,
/// tagging it `v<version>`.
///
/// Each release replaces the whole tree, so files absent from a later
/// release are deleted in that commit.
///
/// # Panics
/// Panics if any filesystem or git operation fails.
pub fn tagged_upstream(path: &Path, releases: &[Release<'_>]) -> git2::Repository {
    tagged_upstream_with_prefix(path, "v", releases)
}

/// Like [`tagged_upstream`] with a custom tag prefix.
///
/// # Panics
/// Panics if any filesystem or git operation fails.
pub fn tagged_upstream_with_prefix(
    path: &Path,
    prefix: &str,
    releases: &[Release<'_>],
) -> git2::Repository {
    let repo = git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "tagged_upstream: failed to init repository at {}: {e}",
            path.display()
        )
    });
    let signature = git2::Signature::now("Test User", "test@test.com")
        .unwrap_or_else(|e| panic!("tagged_upstream: failed to build signature: {e}"));

    for (version, files) in releases {
        clear_worktree(path);
        for (relative, content) in *files {
            let file = path.join(relative);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&file, content)
                .unwrap_or_else(|e| panic!("tagged_upstream: failed to write {relative}: {e}"));
        }

        let mut index = repo.index().unwrap();
        index.clear().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap_or_else(|e| panic!("tagged_upstream: failed to stage release {version}: {e}"));
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let commit_id = repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &format!("Release {version}"),
                &tree,
                &parents,
            )
            .unwrap_or_else(|e| panic!("tagged_upstream: failed to commit {version}: {e}"));

        let commit = repo.find_object(commit_id, None).unwrap();
        repo.tag_lightweight(&format!("{prefix}{version}"), &commit, false)
            .unwrap_or_else(|e| panic!("tagged_upstream: failed to tag {version}: {e}"));
    }

    repo
}

fn clear_worktree(path: &Path) {
    for entry in fs::read_dir(path).unwrap() {
        let entry = entry.unwrap();
        if entry.file_name() == ".git" {
            continue;
        }
        let target = entry.path();
        if target.is_dir() {
            fs::remove_dir_all(&target).unwrap();
        } else {
            fs::remove_file(&target).unwrap();
        }
    }
}
