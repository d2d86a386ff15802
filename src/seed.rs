//! Seed sources: where the slug corpus comes from.
//!
//! The input locator is either a local directory tree or an
//! `s3://bucket/prefix` pointing at an S3-compatible (R2) bucket. Both
//! feed every byte stream they enumerate to the slug scanner and return
//! one deduplicated slug set.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use tokio::io::BufReader;
use tracing::{debug, info, warn};

use crate::config::R2Credentials;
use crate::slugs::scan_slugs;

/// Collect the deduplicated slug set from the input locator.
///
/// # Errors
///
/// Returns an error on an unusable root (missing directory, malformed
/// locator, missing R2 credentials) or a failed bucket listing.
/// Individual unreadable files or objects are logged and skipped.
pub async fn collect_slugs(input: &str) -> Result<HashSet<String>> {
    if let Some(locator) = input.strip_prefix("s3://") {
        collect_from_bucket(locator).await
    } else {
        collect_from_dir(Path::new(input)).await
    }
}

async fn collect_from_dir(root: &Path) -> Result<HashSet<String>> {
    let metadata = tokio::fs::metadata(root)
        .await
        .with_context(|| format!("cannot read seed directory {}", root.display()))?;
    if !metadata.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut found = HashSet::new();

    // Async recursion is not allowed without boxing; use an explicit stack.
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), "Failed to read seed directory: {e}");
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %dir.display(), "Failed to enumerate seed entry: {e}");
                    break;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(_) => continue,
            };

            if file_type.is_dir() {
                stack.push(path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let file = match tokio::fs::File::open(&path).await {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %path.display(), "Failed to open seed file: {e}");
                    continue;
                }
            };
            if let Err(e) = scan_slugs(BufReader::new(file), &mut found).await {
                warn!(path = %path.display(), "Failed to scan seed file: {e}");
            }
        }
    }

    Ok(found)
}

async fn collect_from_bucket(locator: &str) -> Result<HashSet<String>> {
    let (bucket, prefix) = locator.split_once('/').unwrap_or((locator, ""));
    if bucket.is_empty() {
        bail!("object-store locator must look like s3://bucket/prefix");
    }

    let creds = R2Credentials::from_env().context("object-store seed mode")?;
    info!(bucket, prefix, endpoint = %creds.endpoint, "Listing seed objects");

    let client = build_client(&creds);
    let mut found = HashSet::new();
    let mut token: Option<String> = None;

    loop {
        let mut request = client.list_objects_v2().bucket(bucket);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(t) = token.as_deref() {
            request = request.continuation_token(t);
        }
        let page = request
            .send()
            .await
            .with_context(|| format!("failed to list objects in bucket {bucket}"))?;

        for object in page.contents() {
            let Some(key) = object.key() else { continue };
            if key.ends_with('/') {
                continue;
            }
            debug!(key, "Scanning seed object");

            let output = match client.get_object().bucket(bucket).key(key).send().await {
                Ok(output) => output,
                Err(e) => {
                    warn!(key, "Failed to fetch seed object: {e:?}");
                    continue;
                }
            };
            let body = match output.body.collect().await {
                Ok(data) => data.into_bytes(),
                Err(e) => {
                    warn!(key, "Failed to read seed object body: {e}");
                    continue;
                }
            };
            if let Err(e) = scan_slugs(&body[..], &mut found).await {
                warn!(key, "Failed to scan seed object: {e}");
            }
        }

        if page.is_truncated().unwrap_or(false) {
            token = page.next_continuation_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        } else {
            break;
        }
    }

    Ok(found)
}

fn build_client(creds: &R2Credentials) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        creds.access_key_id.clone(),
        creds.secret_access_key.clone(),
        None,
        None,
        "env",
    );

    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("auto"))
        .credentials_provider(credentials)
        .endpoint_url(&creds.endpoint)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}
