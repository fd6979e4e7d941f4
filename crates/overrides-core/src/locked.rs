//! Running operations under the cross-process tool lock

use overrides_fs::{LockHolder, NamedLock};

use crate::Error;

/// What to do when another process holds the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Wait as long as it takes
    #[default]
    Block,
    /// Give up with `Busy`
    FailFast,
}

/// Describe a lock holder for messages
pub fn describe_holder(holder: Option<&LockHolder>) -> String {
    match holder {
        Some(h) if h.command.is_empty() => {
            format!("pid {} since {}", h.pid, h.started_at.to_rfc3339())
        }
        Some(h) => format!(
            "pid {} running '{}' since {}",
            h.pid,
            h.command,
            h.started_at.to_rfc3339()
        ),
        None => "unknown holder".to_string(),
    }
}

/// Run `op` while holding `lock`
///
/// `on_wait` is called once, with the current holder, before blocking. The
/// lock is released whether `op` succeeds or fails.
///
/// # Errors
///
/// Returns `Busy` under [`WaitPolicy::FailFast`] when the lock is held,
/// a lock error if it cannot be acquired, or whatever `op` returns.
pub fn with_lock<T, E>(
    lock: &NamedLock,
    policy: WaitPolicy,
    on_wait: impl FnOnce(Option<&LockHolder>),
    op: impl FnOnce() -> std::result::Result<T, E>,
) -> std::result::Result<T, E>
where
    E: From<Error>,
{
    let guard = match lock.try_lock().map_err(Error::from)? {
        Some(guard) => guard,
        None => {
            let holder = lock.holder();
            if policy == WaitPolicy::FailFast {
                return Err(Error::Busy {
                    path: lock.path().to_path_buf(),
                    holder: describe_holder(holder.as_ref()),
                }
                .into());
            }
            on_wait(holder.as_ref());
            tracing::info!(path = %lock.path().display(), "Waiting for lock");
            lock.lock().map_err(Error::from)?
        }
    };

    let result = op();
    if let Err(e) = guard.unlock() {
        tracing::warn!(error = %e, "Failed to release lock");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use tempfile::TempDir;

    #[test]
    fn fail_fast_reports_busy_while_held() {
        let temp = TempDir::new().unwrap();
        let lock = NamedLock::in_dir(temp.path(), "overrides-test").with_command("upgrade");
        let _held = lock.try_lock().unwrap().unwrap();

        let result: Result<()> =
            with_lock(&NamedLock::at(lock.path()), WaitPolicy::FailFast, |_| {}, || Ok(()));
        assert!(matches!(result, Err(Error::Busy { .. })));
    }

    #[test]
    fn lock_is_released_when_op_fails() {
        let temp = TempDir::new().unwrap();
        let lock = NamedLock::in_dir(temp.path(), "overrides-test");

        let result: Result<()> = with_lock(&lock, WaitPolicy::FailFast, |_| {}, || {
            Err(Error::NoUpstreamVersion)
        });
        assert!(matches!(result, Err(Error::NoUpstreamVersion)));
        assert!(lock.try_lock().unwrap().is_some());
    }
}
