//! Cross-process tool lock.
//!
//! A named advisory lock over a lock file. Only one process (or one open
//! handle within a process) can hold it at a time. The holder records its
//! pid, command and start time in the file so a waiting process can say who
//! it is waiting for.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::constants::LOCK_SUFFIX;
use crate::{Error, Result};

/// Metadata written into the lock file by the current holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub command: String,
    pub started_at: DateTime<Utc>,
}

/// A named lock backed by a file on disk.
#[derive(Debug, Clone)]
pub struct NamedLock {
    path: PathBuf,
    command: String,
}

impl NamedLock {
    /// Lock keyed only by the tool identity.
    ///
    /// The lock file lives in the user's runtime directory, falling back to
    /// the cache directory and finally the system temp directory.
    pub fn for_tool(identity: &str) -> Self {
        let dir = dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .unwrap_or_else(std::env::temp_dir);
        Self::in_dir(&dir, identity)
    }

    /// Lock file named after `identity` inside `dir`.
    pub fn in_dir(dir: &Path, identity: &str) -> Self {
        Self::at(dir.join(format!("{identity}.{LOCK_SUFFIX}")))
    }

    /// Lock backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            command: String::new(),
        }
    }

    /// Command recorded in the lock metadata while held.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Ok(None)` when another holder has it.
    pub fn try_lock(&self) -> Result<Option<LockGuard>> {
        let file = self.open()?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => self.acquired(file).map(Some),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                tracing::debug!(path = %self.path.display(), "Lock is held elsewhere");
                Ok(None)
            }
            Err(e) => Err(self.lock_failed(e)),
        }
    }

    /// Acquire the lock, blocking until the current holder releases it.
    pub fn lock(&self) -> Result<LockGuard> {
        let file = self.open()?;
        FileExt::lock_exclusive(&file).map_err(|e| self.lock_failed(e))?;
        self.acquired(file)
    }

    /// Read the metadata of the current holder, if any can be read.
    pub fn holder(&self) -> Option<LockHolder> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        if content.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&content) {
            Ok(holder) => Some(holder),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable lock metadata");
                None
            }
        }
    }

    fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| Error::io(&self.path, e))
    }

    fn acquired(&self, file: File) -> Result<LockGuard> {
        let holder = LockHolder {
            pid: std::process::id(),
            command: self.command.clone(),
            started_at: Utc::now(),
        };
        write_holder(&file, &holder).map_err(|e| Error::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), pid = holder.pid, "Lock acquired");

        Ok(LockGuard {
            file: Some(file),
            path: self.path.clone(),
        })
    }

    fn lock_failed(&self, source: io::Error) -> Error {
        Error::LockFailed {
            path: self.path.clone(),
            source,
        }
    }
}

/// Proof of lock ownership. The lock is released by [`LockGuard::unlock`]
/// or, failing that, when the guard is dropped.
#[derive(Debug)]
pub struct LockGuard {
    file: Option<File>,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back the metadata through the held handle.
    pub fn holder(&self) -> io::Result<LockHolder> {
        let mut file = self
            .file
            .as_ref()
            .ok_or_else(|| io::Error::other("lock already released"))?;
        file.seek(SeekFrom::Start(0))?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        serde_json::from_str(&content).map_err(io::Error::other)
    }

    /// Release the lock.
    pub fn unlock(mut self) -> Result<()> {
        match self.file.take() {
            Some(file) => release(&file).map_err(|source| Error::LockFailed {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take()
            && let Err(e) = release(&file)
        {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release lock");
        }
    }
}

fn write_holder(mut file: &File, holder: &LockHolder) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    serde_json::to_writer(file, holder).map_err(io::Error::other)?;
    file.flush()
}

fn release(file: &File) -> io::Result<()> {
    file.set_len(0)?;
    FileExt::unlock(file)
}
