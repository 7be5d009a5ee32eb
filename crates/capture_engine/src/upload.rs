use std::path::{Path, PathBuf};
use std::sync::Arc;

use capture_logging::{capture_debug, capture_info};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};

/// A directory to copy into `bucket` under `key_prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub local_dir: PathBuf,
    pub bucket: String,
    pub key_prefix: String,
}

/// Terminal state of an upload. Exactly one is produced per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Succeeded { files: usize, bytes: u64 },
    Failed(String),
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, job: &UploadJob) -> UploadOutcome;
}

/// Object key for a file at `relative` (forward slashes) below the upload root.
pub fn object_key(key_prefix: &str, relative: &str) -> String {
    format!("{key_prefix}{relative}")
}

/// Uploads every file of a directory to one bucket of an object store.
pub struct ObjectStoreUploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStoreUploader {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// S3 client for `bucket`, with region and credentials from the
    /// standard `AWS_*` environment.
    pub fn s3_from_env(bucket: &str) -> Result<Self, object_store::Error> {
        let store = AmazonS3Builder::from_env().with_bucket_name(bucket).build()?;
        Ok(Self::new(Arc::new(store), bucket))
    }

    async fn upload_files(&self, job: &UploadJob) -> Result<(usize, u64), String> {
        let files = collect_files(&job.local_dir)
            .await
            .map_err(|err| format!("cannot list {}: {err}", job.local_dir.display()))?;

        let mut total_bytes = 0u64;
        for (path, relative) in &files {
            let content = tokio::fs::read(path)
                .await
                .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
            let key = object_key(&job.key_prefix, relative);
            let len = content.len() as u64;

            let mut attributes = Attributes::new();
            if let Some(content_type) = content_type_for(relative) {
                attributes.insert(Attribute::ContentType, content_type.into());
            }
            let options = PutOptions {
                attributes,
                ..PutOptions::default()
            };

            self.store
                .put_opts(&ObjectPath::from(key.as_str()), PutPayload::from(content), options)
                .await
                .map_err(|err| format!("upload of {key} failed: {err}"))?;
            capture_debug!("Uploaded {} ({} bytes)", key, len);
            total_bytes += len;
        }
        Ok((files.len(), total_bytes))
    }
}

#[async_trait::async_trait]
impl Uploader for ObjectStoreUploader {
    async fn upload(&self, job: &UploadJob) -> UploadOutcome {
        if job.bucket != self.bucket {
            return UploadOutcome::Failed(format!(
                "uploader is bound to bucket {}, not {}",
                self.bucket, job.bucket
            ));
        }
        match self.upload_files(job).await {
            Ok((files, bytes)) => {
                capture_info!(
                    "Uploaded {} files ({} bytes) to {}/{}",
                    files,
                    bytes,
                    job.bucket,
                    job.key_prefix
                );
                UploadOutcome::Succeeded { files, bytes }
            }
            Err(reason) => UploadOutcome::Failed(reason),
        }
    }
}

/// All regular files below `root`, sorted by their slash-separated relative path.
async fn collect_files(root: &Path) -> std::io::Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                if let Some(relative) = relative_key(root, &path) {
                    files.push((path, relative));
                }
            }
        }
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let parts = path
        .strip_prefix(root)
        .ok()?
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn content_type_for(relative: &str) -> Option<&'static str> {
    let ext = relative.rsplit_once('.')?.1.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(content_type)
}
