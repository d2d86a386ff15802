//! Shared constants used across the harvester.

/// User agent string for JSON fetches against the archival endpoints.
pub const JSON_USER_AGENT: &str = "VineFullHarvester/1.0";

/// User agent string for media blob downloads.
pub const MEDIA_USER_AGENT: &str = "VineFullHarvesterMedia/1.0";

/// Legacy CDN hostnames that no longer resolve.
pub const LEGACY_CDN_HOSTS: [&str; 2] = ["v.cdn.vine.co", "mtc.cdn.vine.co"];

/// Canonical archival origin substituted for every legacy CDN hostname.
pub const CANONICAL_MEDIA_ORIGIN: &str = "https://vines.s3.amazonaws.com";

/// Host substring identifying media URLs worth downloading.
pub const CANONICAL_MEDIA_HOST: &str = "vines.s3.amazonaws.com";

/// Path extensions recognized as downloadable media.
pub const MEDIA_EXTENSIONS: [&str; 5] = [".mp4", ".jpg", ".jpeg", ".png", ".gif"];

/// Upper bound on outbound HTTP requests per second, shared by all stages.
pub const REQUESTS_PER_SECOND: u32 = 200;
