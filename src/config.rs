use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

/// Command-line interface for the harvester.
#[derive(Debug, Clone, Parser)]
#[command(name = "vine-archive-harvester")]
#[command(about = "Harvest Vine profiles, posts, and media from archived short-link mentions")]
#[command(version)]
pub struct HarvestArgs {
    /// Directory OR s3://bucket/prefix containing seed text files
    #[arg(long, default_value = "vine_tweets")]
    pub input_dir: String,

    /// Output root directory
    #[arg(long, default_value = "vine_archive_harvest")]
    pub out_dir: PathBuf,

    /// Base URL for profile JSON (no trailing slash)
    #[arg(long, default_value = "https://archive.vine.co/profiles")]
    pub base_profile: String,

    /// Base URL for post JSON (no trailing slash)
    #[arg(long, default_value = "https://archive.vine.co/posts")]
    pub base_post: String,

    /// Number of concurrent workers per stage
    #[arg(long, default_value_t = 128)]
    pub workers: usize,

    /// Also download media files referenced by harvested posts
    #[arg(long)]
    pub download: bool,
}

impl HarvestArgs {
    /// Validate that the arguments are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue {
                name: "workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn profiles_dir(&self) -> PathBuf {
        self.out_dir.join("profiles")
    }

    #[must_use]
    pub fn posts_root(&self) -> PathBuf {
        self.out_dir.join("posts")
    }

    #[must_use]
    pub fn media_root(&self) -> PathBuf {
        self.out_dir.join("media")
    }

    /// Path of the informational user-id index written after stage 2.
    #[must_use]
    pub fn user_index_path(&self) -> PathBuf {
        self.out_dir.join("profiles.json")
    }

    /// Baseline arguments for tests; override fields as needed.
    #[must_use]
    pub fn for_testing(out_dir: &Path) -> Self {
        Self {
            input_dir: "vine_tweets".to_string(),
            out_dir: out_dir.to_path_buf(),
            base_profile: "https://archive.vine.co/profiles".to_string(),
            base_post: "https://archive.vine.co/posts".to_string(),
            workers: 4,
            download: false,
        }
    }
}

/// Credentials for the S3-compatible seed bucket, taken from the environment.
#[derive(Debug, Clone)]
pub struct R2Credentials {
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl R2Credentials {
    /// Load R2 credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: required_env("R2_ENDPOINT")?,
            access_key_id: required_env("R2_ACCESS_KEY_ID")?,
            secret_access_key: required_env("R2_SECRET_ACCESS_KEY")?,
        })
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
