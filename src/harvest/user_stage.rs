//! Stage 3: per-user profile and post capture.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::Harvester;
use crate::extract;
use crate::fs_utils;
use crate::media::collect_media_urls;
use crate::rewrite::rewrite_record;

impl Harvester {
    /// Capture the profile and every referenced post for each user.
    ///
    /// Per-user failures are logged and skipped, as are per-post and
    /// per-media failures inside a user.
    ///
    /// # Errors
    ///
    /// Returns an error if worker admission fails.
    pub async fn harvest_users(&self, user_ids: Vec<String>) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(user_ids.len());

        for user_id in user_ids {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("worker semaphore closed")?;
            let harvester = self.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = harvester.harvest_user(&user_id).await {
                    warn!(user = %user_id, "User harvest failed: {e:#}");
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("User worker panicked: {e}");
            }
        }
        Ok(())
    }

    async fn harvest_user(&self, user_id: &str) -> Result<()> {
        let profile_path = self.profile_path(user_id);
        if !fs_utils::file_exists(&profile_path).await {
            let profile = self
                .fetcher
                .fetch_json(&self.profile_url(user_id))
                .await
                .context("fetch profile")?;
            let profile = rewrite_record(profile);
            fs_utils::write_json_pretty(&profile_path, &Value::Object(profile))
                .await
                .context("persist profile")?;
        }

        // Enumerate from the persisted bytes so future runs see the same list.
        let raw = tokio::fs::read(&profile_path)
            .await
            .with_context(|| format!("read profile {}", profile_path.display()))?;
        let profile: Value = serde_json::from_slice(&raw)
            .with_context(|| format!("decode profile {}", profile_path.display()))?;

        let post_ids = extract::collect_post_ids(&profile);
        if post_ids.is_empty() {
            debug!(user = %user_id, "Profile references no posts");
            return Ok(());
        }

        for post_id in post_ids {
            if let Err(e) = self.harvest_post(user_id, &post_id).await {
                warn!(user = %user_id, post = %post_id, "Post harvest failed: {e:#}");
            }
        }
        Ok(())
    }

    async fn harvest_post(&self, user_id: &str, post_id: &str) -> Result<()> {
        let record = self.fetcher.fetch_json(&self.post_url(post_id)).await?;
        let real_id = extract::real_post_id(&record).unwrap_or_else(|| post_id.to_string());

        let path = self.post_path(user_id, &real_id);
        if fs_utils::file_exists(&path).await {
            return Ok(());
        }

        let record = Value::Object(rewrite_record(record));
        fs_utils::write_json_pretty(&path, &record)
            .await
            .with_context(|| format!("persist post {real_id}"))?;

        if self.download {
            for media_url in collect_media_urls(&record) {
                if let Err(e) = self.media.download(&self.fetcher, &media_url).await {
                    warn!(
                        user = %user_id,
                        post = %real_id,
                        url = %media_url,
                        "Media download failed: {e:#}"
                    );
                }
            }
        }
        Ok(())
    }
}
