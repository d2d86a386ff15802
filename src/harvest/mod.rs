//! The concurrent harvest stages.
//!
//! Stage 2 ([`Harvester::harvest_slugs`]) resolves seed slugs to posts
//! and discovers the owning users; stage 3 ([`Harvester::harvest_users`])
//! fans out per user to capture the profile and every referenced post.
//! Stages run sequentially; within a stage a fixed pool of workers
//! drains the work list in parallel.

pub mod slug_stage;
pub mod user_stage;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::HarvestArgs;
use crate::fetch::Fetcher;
use crate::media::MediaStore;

/// Shared context for both harvest stages.
///
/// Cloning is cheap and clones share the HTTP client, the rate gate,
/// and the media memo; each spawned worker task gets its own copy.
#[derive(Clone)]
pub struct Harvester {
    pub(crate) fetcher: Fetcher,
    pub(crate) media: Arc<MediaStore>,
    base_profile: String,
    base_post: String,
    profiles_dir: PathBuf,
    posts_root: PathBuf,
    pub(crate) workers: usize,
    pub(crate) download: bool,
}

impl Harvester {
    #[must_use]
    pub fn new(args: &HarvestArgs, fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            media: Arc::new(MediaStore::new(args.media_root())),
            base_profile: args.base_profile.trim_end_matches('/').to_string(),
            base_post: args.base_post.trim_end_matches('/').to_string(),
            profiles_dir: args.profiles_dir(),
            posts_root: args.posts_root(),
            workers: args.workers,
            download: args.download,
        }
    }

    pub(crate) fn post_url(&self, id: &str) -> String {
        format!("{}/{}.json", self.base_post, urlencoding::encode(id))
    }

    pub(crate) fn profile_url(&self, user_id: &str) -> String {
        format!("{}/{}.json", self.base_profile, urlencoding::encode(user_id))
    }

    pub(crate) fn post_path(&self, user_id: &str, post_id: &str) -> PathBuf {
        self.posts_root.join(user_id).join(format!("{post_id}.json"))
    }

    pub(crate) fn profile_path(&self, user_id: &str) -> PathBuf {
        self.profiles_dir.join(format!("{user_id}.json"))
    }
}
