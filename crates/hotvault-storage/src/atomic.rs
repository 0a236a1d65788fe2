// SPDX-FileCopyrightText: 2026 Hotvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe file writes and per-key writer serialization.
//!
//! Writes go to a temporary file in the destination directory, are synced,
//! then renamed over the target. Readers see either the old or the new
//! record, never a truncated one.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use hotvault_core::HotvaultError;
use tempfile::NamedTempFile;

fn staged(path: &Path, bytes: &[u8]) -> Result<NamedTempFile, HotvaultError> {
    let dir = path
        .parent()
        .ok_or_else(|| HotvaultError::Internal(format!("{} has no parent", path.display())))?;
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Replace `path` with `bytes` atomically, creating parent directories.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), HotvaultError> {
    staged(path, bytes)?.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like [`write_atomic`], with owner-only permissions on unix.
pub fn write_private(path: &Path, bytes: &[u8]) -> Result<(), HotvaultError> {
    let tmp = staged(path, bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create `path` with `bytes` only if nothing exists there yet.
///
/// The existence check and the create are one atomic step, so two racing
/// creators cannot both succeed.
pub fn create_new(path: &Path, bytes: &[u8]) -> Result<(), HotvaultError> {
    match staged(path, bytes)?.persist_noclobber(path) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Err(
            HotvaultError::AlreadyExists(format!("{} already exists", path.display())),
        ),
        Err(e) => Err(e.error.into()),
    }
}

/// Read a file, mapping "not found" to `None`.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, HotvaultError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Remove a file. Returns whether anything was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool, HotvaultError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// One mutex per record key.
///
/// Entries are never evicted; the key space is bounded by users times apps.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        // Clone the Arc out so the shard lock is released before blocking.
        let lock = Arc::clone(
            self.locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        // A panicked writer left nothing half-written (writes are atomic).
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f()
    }
}
