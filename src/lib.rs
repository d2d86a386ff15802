//! Vine archive harvester library.
//!
//! Reconstructs the public data graph of the Vine archive from a seed
//! corpus of third-party mentions. Short-link slugs found in text are
//! resolved to posts through the archival endpoint, the owning users are
//! discovered, and every post belonging to those users (optionally with
//! its media blobs) is persisted as a content-addressable tree on disk.

pub mod config;
pub mod constants;
pub mod extract;
pub mod fetch;
pub mod fs_utils;
pub mod harvest;
pub mod media;
pub mod rate_gate;
pub mod rewrite;
pub mod seed;
pub mod slugs;
