use sha2::{Digest, Sha256};
use url::Url;

use crate::AssetKind;

const MAX_STEM_LEN: usize = 60;

/// Relative, deterministic path for a saved asset:
/// `{folder}/{sanitized_stem}--{short_hash(url)}.{ext}`.
///
/// The hash covers the full URL, query included, so two assets that share a
/// file name never overwrite each other.
pub fn asset_filename(url: &str, kind: AssetKind) -> String {
    let last_segment = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default();

    let (stem, ext) = match last_segment.rsplit_once('.') {
        Some((stem, ext)) if is_plain_extension(ext) => (stem, ext.to_ascii_lowercase()),
        _ => (last_segment.as_str(), kind.default_extension().to_string()),
    };

    format!(
        "{}/{}--{}.{}",
        kind.folder(),
        sanitize_stem(stem),
        short_hash(url),
        ext
    )
}

fn is_plain_extension(ext: &str) -> bool {
    (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' };
        // Collapse runs of replaced characters
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    let mut cleaned = compacted.trim_matches('_').to_string();
    if cleaned.is_empty() {
        cleaned = "asset".to_string();
    }
    cleaned.truncate(MAX_STEM_LEN);
    cleaned
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
