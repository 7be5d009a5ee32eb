use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::JobConfig;

/// Leading part of every per-invocation directory name.
pub const CAPTURE_DIR_PREFIX: &str = "capture-";

/// Issues cache-busting tokens: Unix milliseconds, strictly increasing
/// within one process even when two invocations share a millisecond.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicI64,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_token(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Append `cachebust=<token>` to the query of `url`, keeping any existing
/// query and fragment.
pub fn cache_busted_url(url: &str, token: i64) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed
                .query_pairs_mut()
                .append_pair("cachebust", &token.to_string());
            parsed.into()
        }
        Err(_) => {
            let (base, fragment) = match url.split_once('#') {
                Some((base, fragment)) => (base, Some(fragment)),
                None => (url, None),
            };
            let separator = if base.contains('?') { '&' } else { '?' };
            match fragment {
                Some(fragment) => format!("{base}{separator}cachebust={token}#{fragment}"),
                None => format!("{base}{separator}cachebust={token}"),
            }
        }
    }
}

/// Everything one capture needs: where to fetch from and where to save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub target_url: String,
    /// Unique per invocation; uploaded as a whole and removed afterwards.
    pub local_dir: PathBuf,
    /// Folder inside `local_dir` that receives the page and its assets.
    pub page_dir: PathBuf,
}

impl CaptureRequest {
    pub fn new(config: &JobConfig, buster: &CacheBuster) -> Self {
        let dir_name = format!("{CAPTURE_DIR_PREFIX}{}", Uuid::new_v4().simple());
        let local_dir = config.capture_root.join(dir_name);
        let page_dir = local_dir.join(&config.subdir_prefix);
        Self {
            target_url: cache_busted_url(&config.capture_url, buster.next_token()),
            local_dir,
            page_dir,
        }
    }
}
