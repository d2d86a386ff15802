//! Video slug extraction from seed text streams.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"vine\.co/v/([A-Za-z0-9]+)").unwrap());

/// Scan a byte stream line-by-line for `vine.co/v/<slug>` references.
///
/// Each captured slug is inserted into `found`. Lines are decoded with
/// lossy UTF-8, so binary data is scanned silently and simply yields no
/// matches.
///
/// # Errors
///
/// Returns reader I/O errors.
pub async fn scan_slugs<R>(mut reader: R, found: &mut HashSet<String>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).await?;
        if read == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        for caps in SLUG_RE.captures_iter(&text) {
            let slug = caps[1].trim();
            if !slug.is_empty() {
                found.insert(slug.to_string());
            }
        }
    }
    Ok(())
}
