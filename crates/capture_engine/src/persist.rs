use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("capture directory {path:?} unavailable: {source}")]
    CaptureDir { path: PathBuf, source: io::Error },
    #[error("refusing to write outside the capture directory: {0:?}")]
    Escapes(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Create the per-invocation directory under `root`.
///
/// The root is created on demand; `dir` itself must not exist yet, so two
/// invocations can never end up sharing one.
pub async fn create_capture_dir(dir: &Path) -> Result<(), PersistError> {
    if let Some(root) = dir.parent() {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|source| PersistError::CaptureDir {
                path: root.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::create_dir(dir)
        .await
        .map_err(|source| PersistError::CaptureDir {
            path: dir.to_path_buf(),
            source,
        })
}

/// Atomically writes captured files below a base directory.
#[derive(Debug, Clone)]
pub struct CaptureWriter {
    base: PathBuf,
}

impl CaptureWriter {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// Write `content` to `{base}/{relative}` through a temp file and rename,
    /// creating intermediate folders.
    pub fn write(&self, relative: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(PersistError::Escapes(relative.to_path_buf()));
        }

        let target = self.base.join(relative);
        let parent = target.parent().unwrap_or(&self.base);
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(content)?;
        tmp.flush()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// [`write`](Self::write) on the blocking thread pool, for async callers.
    pub async fn save(&self, relative: String, content: Vec<u8>) -> Result<PathBuf, PersistError> {
        let writer = self.clone();
        tokio::task::spawn_blocking(move || writer.write(&relative, &content))
            .await
            .map_err(|err| PersistError::Io(io::Error::other(err)))?
    }
}
