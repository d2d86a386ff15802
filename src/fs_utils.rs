//! Crash-safe filesystem helpers.
//!
//! Every persisted file goes through a temp-file-plus-rename protocol so
//! a consumer never observes partial content at the final path. On a
//! mid-stream error the temp file is abandoned; it is never visible under
//! the real name.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

/// Sibling temp path used while a file is being written: `<path>.tmp`.
#[must_use]
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Check whether `path` exists.
pub async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Atomically write `value` as pretty JSON (2-space indent) to `path`.
///
/// Parent directories are created as needed. An existing final path is
/// overwritten; callers gate on existence themselves.
///
/// # Errors
///
/// Returns an error if serialization, directory creation, the temp-file
/// write, or the rename fails.
pub async fn write_json_pretty<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut body = serde_json::to_vec_pretty(value).context("Failed to serialize JSON")?;
    body.push(b'\n');

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, &body)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to rename {} into place", tmp.display()))?;
    Ok(())
}
