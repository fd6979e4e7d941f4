//! Override entry types
//!
//! An entry records one tracked divergence from upstream: where the override
//! lives, what kind of divergence it is, and which upstream file and release
//! it was last synchronized against.

use serde::{Deserialize, Serialize};

use crate::content::TargetKind;
use crate::{Error, Result};

/// One tracked override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    /// Forward-slash path relative to the manifest directory; unique key
    pub name: String,
    /// The kind of override and its base reference
    #[serde(flatten)]
    pub kind: OverrideKind,
    /// Tracking reference explaining why the override exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The closed set of override kinds
///
/// Each variant fixes whether the override targets a file or a directory
/// and whether it carries a base reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverrideKind {
    /// A new file with no upstream counterpart
    Platform,

    /// Byte-for-byte mirror of an upstream file
    Copy(BaseRef),

    /// Modified copy of an upstream file
    Derived(BaseRef),

    /// Modified copy of an upstream file carrying a fix meant to go upstream
    Patch(BaseRef),

    /// Mirror of a whole upstream directory
    DirectoryCopy(BaseRef),
}

/// Reference to the upstream file an override was taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRef {
    /// Path of the base relative to the upstream source root
    pub base_file: String,
    /// Upstream release the override was last synchronized against
    pub base_version: String,
    /// Checksum of the base content at `base_version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_hash: Option<String>,
}

/// Payload-free discriminant of [`OverrideKind`], used when adding entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideType {
    Platform,
    Copy,
    Derived,
    Patch,
    DirectoryCopy,
}

impl OverrideType {
    pub const ALL: [OverrideType; 5] = [
        Self::Platform,
        Self::Copy,
        Self::Derived,
        Self::Patch,
        Self::DirectoryCopy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Copy => "copy",
            Self::Derived => "derived",
            Self::Patch => "patch",
            Self::DirectoryCopy => "directory_copy",
        }
    }

    /// What the override must be on disk
    pub fn target(self) -> TargetKind {
        match self {
            Self::DirectoryCopy => TargetKind::Directory,
            Self::Platform | Self::Copy | Self::Derived | Self::Patch => TargetKind::File,
        }
    }

    pub fn requires_base(self) -> bool {
        !matches!(self, Self::Platform)
    }

    /// Short explanation shown by interactive prompts
    pub fn description(self) -> &'static str {
        match self {
            Self::Platform => "new file with no upstream counterpart",
            Self::Copy => "exact copy of an upstream file",
            Self::Derived => "modified copy of an upstream file",
            Self::Patch => "upstream file with a fix that should go upstream",
            Self::DirectoryCopy => "exact copy of an upstream directory",
        }
    }

    /// Build the persisted kind from this type and an optional base
    pub fn with_base(self, base: Option<BaseRef>) -> Option<OverrideKind> {
        match (self, base) {
            (Self::Platform, None) => Some(OverrideKind::Platform),
            (Self::Copy, Some(base)) => Some(OverrideKind::Copy(base)),
            (Self::Derived, Some(base)) => Some(OverrideKind::Derived(base)),
            (Self::Patch, Some(base)) => Some(OverrideKind::Patch(base)),
            (Self::DirectoryCopy, Some(base)) => Some(OverrideKind::DirectoryCopy(base)),
            _ => None,
        }
    }
}

impl std::str::FromStr for OverrideType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::UnknownOverrideType(s.to_string()))
    }
}

impl std::fmt::Display for OverrideType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OverrideKind {
    pub fn override_type(&self) -> OverrideType {
        match self {
            Self::Platform => OverrideType::Platform,
            Self::Copy(_) => OverrideType::Copy,
            Self::Derived(_) => OverrideType::Derived,
            Self::Patch(_) => OverrideType::Patch,
            Self::DirectoryCopy(_) => OverrideType::DirectoryCopy,
        }
    }

    /// What the override must be on disk
    pub fn target(&self) -> TargetKind {
        self.override_type().target()
    }

    /// The base reference, if this kind carries one
    pub fn base(&self) -> Option<&BaseRef> {
        match self {
            Self::Platform => None,
            Self::Copy(base) | Self::Derived(base) | Self::Patch(base) | Self::DirectoryCopy(base) => {
                Some(base)
            }
        }
    }

    pub fn base_mut(&mut self) -> Option<&mut BaseRef> {
        match self {
            Self::Platform => None,
            Self::Copy(base) | Self::Derived(base) | Self::Patch(base) | Self::DirectoryCopy(base) => {
                Some(base)
            }
        }
    }
}

impl OverrideEntry {
    /// Create a new entry
    pub fn new(name: impl Into<String>, kind: OverrideKind) -> Self {
        Self {
            name: name.into(),
            kind,
            issue: None,
            comment: None,
        }
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issue = Some(issue.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl BaseRef {
    pub fn new(base_file: impl Into<String>, base_version: impl Into<String>) -> Self {
        Self {
            base_file: base_file.into(),
            base_version: base_version.into(),
            base_hash: None,
        }
    }

    pub fn with_hash(mut self, base_hash: impl Into<String>) -> Self {
        self.base_hash = Some(base_hash.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_type_parses_case_and_dashes() {
        assert_eq!(
            "Directory-Copy".parse::<OverrideType>().unwrap(),
            OverrideType::DirectoryCopy
        );
        assert!(matches!(
            "symlink".parse::<OverrideType>(),
            Err(Error::UnknownOverrideType(_))
        ));
    }

    #[test]
    fn with_base_rejects_mismatched_payload() {
        assert!(OverrideType::Platform
            .with_base(Some(BaseRef::new("a", "1")))
            .is_none());
        assert!(OverrideType::Copy.with_base(None).is_none());
        assert_eq!(
            OverrideType::Patch.with_base(Some(BaseRef::new("a", "1"))),
            Some(OverrideKind::Patch(BaseRef::new("a", "1")))
        );
    }

    #[test]
    fn only_directory_copy_targets_directories() {
        for t in OverrideType::ALL {
            let expected = if t == OverrideType::DirectoryCopy {
                TargetKind::Directory
            } else {
                TargetKind::File
            };
            assert_eq!(t.target(), expected);
        }
    }
}
