//! Media URL collection and idempotent blob download.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::constants::{CANONICAL_MEDIA_HOST, MEDIA_EXTENSIONS};
use crate::fetch::Fetcher;
use crate::fs_utils;

/// Collect media URLs referenced anywhere in a post record.
///
/// A string leaf qualifies when it mentions the canonical media host and
/// one of the known extensions. Order follows the tree walk; duplicates
/// within a record are not filtered here, the downloader dedups globally.
#[must_use]
pub fn collect_media_urls(value: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    collect_into(value, &mut urls);
    urls
}

fn collect_into(value: &Value, urls: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for child in map.values() {
                collect_into(child, urls);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_into(child, urls);
            }
        }
        Value::String(s) => {
            if s.contains(CANONICAL_MEDIA_HOST)
                && MEDIA_EXTENSIONS.iter().any(|ext| s.contains(ext))
            {
                urls.push(s.clone());
            }
        }
        _ => {}
    }
}

/// Media blob store mirroring URL paths under a local root.
///
/// Holds the process-wide URL memo: any given URL is downloaded at most
/// once per run, and a blob already on disk is never overwritten.
pub struct MediaStore {
    root: PathBuf,
    downloaded: Mutex<HashSet<String>>,
}

impl MediaStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            downloaded: Mutex::new(HashSet::new()),
        }
    }

    /// Download `raw_url` to `<root>/<url path>` unless already handled.
    ///
    /// The memo check-and-insert is atomic, so concurrent workers racing
    /// on the same URL issue a single request. The body streams to a
    /// temp file that is renamed into place once complete.
    ///
    /// # Errors
    ///
    /// Returns an error on an unparsable URL or a failed fetch or write;
    /// callers log and continue.
    pub async fn download(&self, fetcher: &Fetcher, raw_url: &str) -> Result<()> {
        let parsed =
            Url::parse(raw_url).with_context(|| format!("invalid media URL {raw_url}"))?;

        {
            let mut downloaded = self.downloaded.lock().expect("media memo poisoned");
            if !downloaded.insert(raw_url.to_string()) {
                return Ok(());
            }
        }

        let local_path = self.root.join(parsed.path().trim_start_matches('/'));
        if fs_utils::file_exists(&local_path).await {
            return Ok(());
        }
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut response = fetcher.get_media(raw_url).await?;

        let tmp = fs_utils::tmp_path(&local_path);
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to read media body from {raw_url}"))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", tmp.display()))?;
        }
        file.flush()
            .await
            .with_context(|| format!("Failed to flush {}", tmp.display()))?;
        drop(file);

        tokio::fs::rename(&tmp, &local_path)
            .await
            .with_context(|| format!("Failed to rename {} into place", tmp.display()))?;

        debug!(url = %raw_url, path = %local_path.display(), "Media downloaded");
        Ok(())
    }
}
