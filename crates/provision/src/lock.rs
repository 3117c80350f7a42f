//! Cross-process mutual exclusion for artifact generation.
//!
//! Many processes (web workers, CLI invocations) may race to provision
//! the same never-before-seen tenant. An exclusive advisory lock on a
//! sidecar file gives at-most-one-writer semantics; racing resolvers
//! block briefly, then re-check artifact existence after acquiring
//! (check-lock-check), so the directory is queried and the secret key
//! minted at most once per tenant.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use tenantgate_core::error::ProvisionError;

/// An acquired exclusive lock. Released on drop; the sidecar file
/// itself is left in place (removing it would race other lockers).
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            tracing::warn!(path = %self.path.display(), error = %err, "Failed to release artifact lock");
        }
    }
}

/// Acquire the exclusive lock at `path`, blocking until it is free.
///
/// The blocking `flock` happens on the spawn-blocking pool so a
/// contended lock never stalls the async runtime.
pub async fn acquire(path: &Path) -> Result<LockGuard, ProvisionError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| {
                ProvisionError::PersistFailed(format!(
                    "cannot open lock file {}: {e}",
                    path.display()
                ))
            })?;
        file.lock_exclusive().map_err(|e| {
            ProvisionError::PersistFailed(format!(
                "cannot lock {}: {e}",
                path.display()
            ))
        })?;
        Ok(LockGuard { file, path })
    })
    .await
    .map_err(|e| ProvisionError::PersistFailed(format!("lock task failed: {e}")))?
}
