//! Upstream held in a git repository, one tag per release

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};
use overrides_fs::validate_relative;

use super::UpstreamSource;
use crate::content::TargetKind;
use crate::{Error, Result};

/// Reads `<path>` from the tree of tag `<prefix><version>`
///
/// The repository is opened per call; `git2::Repository` cannot be shared
/// across the validation thread pool.
#[derive(Debug, Clone)]
pub struct GitTags {
    repo: PathBuf,
    tag_prefix: String,
}

/// What a path resolves to inside a tagged tree
enum Found {
    Blob(Oid),
    Tree(Oid),
}

impl GitTags {
    pub fn new(repo: impl Into<PathBuf>, tag_prefix: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            tag_prefix: tag_prefix.into(),
        }
    }

    pub fn tag_name(&self, version: &str) -> String {
        format!("{}{version}", self.tag_prefix)
    }

    fn open(&self) -> Result<Repository> {
        Ok(Repository::open(&self.repo)?)
    }

    fn find(&self, repo: &Repository, path: &str, version: &str) -> Result<Option<Found>> {
        let relative = validate_relative(path)?;
        let tag = self.tag_name(version);

        let object = match repo.revparse_single(&format!("refs/tags/{tag}")) {
            Ok(object) => object,
            Err(e) if e.code() == ErrorCode::NotFound => {
                tracing::debug!(tag = %tag, "Upstream tag not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let tree = object.peel_to_commit()?.tree()?;

        let entry = match tree.get_path(Path::new(relative.as_str())) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(match entry.kind() {
            Some(ObjectType::Blob) => Some(Found::Blob(entry.id())),
            Some(ObjectType::Tree) => Some(Found::Tree(entry.id())),
            _ => None,
        })
    }

    fn not_found(path: &str, version: &str) -> Error {
        Error::BaseNotFound {
            reference: path.to_string(),
            version: version.to_string(),
        }
    }
}

impl UpstreamSource for GitTags {
    fn kind_of(&self, path: &str, version: &str) -> Result<Option<TargetKind>> {
        let repo = self.open()?;
        Ok(self.find(&repo, path, version)?.map(|found| match found {
            Found::Blob(_) => TargetKind::File,
            Found::Tree(_) => TargetKind::Directory,
        }))
    }

    fn read_file(&self, path: &str, version: &str) -> Result<Vec<u8>> {
        let repo = self.open()?;
        match self.find(&repo, path, version)? {
            Some(Found::Blob(id)) => Ok(repo.find_blob(id)?.content().to_vec()),
            _ => Err(Self::not_found(path, version)),
        }
    }

    fn read_tree(&self, path: &str, version: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        let repo = self.open()?;
        let Some(Found::Tree(id)) = self.find(&repo, path, version)? else {
            return Err(Self::not_found(path, version));
        };

        let mut blobs = Vec::new();
        repo.find_tree(id)?.walk(TreeWalkMode::PreOrder, |prefix, entry| {
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                blobs.push((format!("{prefix}{name}"), entry.id()));
            }
            TreeWalkResult::Ok
        })?;

        let mut tree = BTreeMap::new();
        for (relative, id) in blobs {
            tree.insert(relative, repo.find_blob(id)?.content().to_vec());
        }
        Ok(tree)
    }

    fn locate(&self, path: &str, version: &str) -> String {
        format!("{}:{path}", self.tag_name(version))
    }
}
