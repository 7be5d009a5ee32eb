use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
#[error("could not remove {path:?}: {source}")]
pub struct CleanupError {
    pub path: PathBuf,
    pub source: io::Error,
}

/// Removes an invocation's working directory.
#[async_trait::async_trait]
pub trait Cleaner: Send + Sync {
    /// Returns `true` if something was removed, `false` if `dir` was already gone.
    async fn cleanup(&self, dir: &Path) -> Result<bool, CleanupError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryCleaner;

#[async_trait::async_trait]
impl Cleaner for DirectoryCleaner {
    async fn cleanup(&self, dir: &Path) -> Result<bool, CleanupError> {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CleanupError {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }
}
