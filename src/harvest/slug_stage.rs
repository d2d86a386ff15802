//! Stage 2: resolve seed slugs to posts and discover their owners.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::Harvester;
use crate::extract;
use crate::fs_utils;
use crate::rewrite::rewrite_record;

impl Harvester {
    /// Resolve every slug to a post record, persist it under its owner,
    /// and return the sorted set of discovered user ids.
    ///
    /// Per-slug failures are logged and skipped; the stage only fails on
    /// infrastructure errors such as a closed worker semaphore.
    ///
    /// # Errors
    ///
    /// Returns an error if worker admission fails.
    pub async fn harvest_slugs(&self, slugs: Vec<String>) -> Result<Vec<String>> {
        let users = Arc::new(Mutex::new(HashSet::new()));
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(slugs.len());

        for slug in slugs {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("worker semaphore closed")?;
            let harvester = self.clone();
            let users = Arc::clone(&users);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = harvester.seed_from_slug(&slug, &users).await {
                    warn!(slug = %slug, "Seed fetch failed: {e:#}");
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Seed worker panicked: {e}");
            }
        }

        let users = users.lock().expect("user set poisoned");
        let mut ids: Vec<String> = users.iter().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn seed_from_slug(&self, slug: &str, users: &Mutex<HashSet<String>>) -> Result<()> {
        let record = self.fetcher.fetch_json(&self.post_url(slug)).await?;
        let record = rewrite_record(record);

        let Some(user_id) = extract::user_id(&record) else {
            debug!(slug = %slug, "Post record has no user id, skipping");
            return Ok(());
        };
        let post_id = extract::real_post_id(&record).unwrap_or_else(|| slug.to_string());

        {
            let mut users = users.lock().expect("user set poisoned");
            users.insert(user_id.clone());
        }

        let path = self.post_path(&user_id, &post_id);
        if !fs_utils::file_exists(&path).await {
            fs_utils::write_json_pretty(&path, &Value::Object(record))
                .await
                .with_context(|| format!("persist post {post_id} of user {user_id}"))?;
        }
        Ok(())
    }
}
