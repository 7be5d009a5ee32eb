use std::sync::Arc;

use capture_core::{CaptureRequest, CaptureResult, CapturedResource, FetchLimits};
use capture_logging::{capture_debug, capture_info, capture_warn};
use thiserror::Error;

use crate::{
    asset_filename, create_capture_dir, decode_page, discover_assets, rewrite_references,
    CaptureWriter, FetchError, FetchSettings, Fetcher, PersistError, ReqwestFetcher,
};

/// File name the primary page is saved under, inside the page folder.
pub const PAGE_FILENAME: &str = "index.html";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not prepare capture directory: {0}")]
    Directory(#[source] PersistError),
    #[error("could not fetch {url}: {source}")]
    Page { url: String, source: FetchError },
    #[error("could not save the captured page: {0}")]
    Write(#[source] PersistError),
    #[error("capture engine failed: {0}")]
    Engine(String),
}

/// Renders or fetches a page and saves it below the request's directory.
#[async_trait::async_trait]
pub trait CaptureEngine: Send + Sync {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureResult, CaptureError>;
}

/// Saves a page and the images, stylesheets, scripts and media it references.
///
/// Failures of individual assets are recorded, not raised. The capture only
/// fails as a whole when the directory cannot be created, the page cannot be
/// reached at all, or the page file cannot be written.
pub struct SiteCapturer {
    fetcher: Arc<dyn Fetcher>,
    max_assets: usize,
}

impl SiteCapturer {
    pub fn new(fetcher: Arc<dyn Fetcher>, max_assets: usize) -> Self {
        Self {
            fetcher,
            max_assets,
        }
    }

    pub fn from_limits(limits: &FetchLimits) -> Self {
        let fetcher = ReqwestFetcher::new(FetchSettings::from_limits(limits));
        Self::new(Arc::new(fetcher), limits.max_assets)
    }

    async fn capture_assets(
        &self,
        html: &str,
        page_url: &str,
        writer: &CaptureWriter,
    ) -> (Vec<CapturedResource>, Vec<(String, String)>) {
        let assets = discover_assets(html, page_url, self.max_assets);
        capture_debug!("Discovered {} assets on {}", assets.len(), page_url);

        let mut records = Vec::with_capacity(assets.len());
        let mut replacements = Vec::new();
        for asset in assets {
            let fetched = match self.fetcher.fetch(&asset.url).await {
                Ok(output) => output,
                Err(err) => {
                    capture_warn!("Asset {} not captured: {}", asset.url, err);
                    records.push(CapturedResource::unsaved(asset.url, err.to_string()));
                    continue;
                }
            };
            let relative = asset_filename(&asset.url, asset.kind);
            match writer.save(relative.clone(), fetched.bytes).await {
                Ok(path) => {
                    for reference in &asset.references {
                        replacements.push((reference.clone(), relative.clone()));
                    }
                    records.push(CapturedResource::saved(asset.url, path));
                }
                Err(err) => {
                    capture_warn!("Asset {} not written: {}", asset.url, err);
                    records.push(CapturedResource::unsaved(asset.url, err.to_string()));
                }
            }
        }
        (records, replacements)
    }
}

#[async_trait::async_trait]
impl CaptureEngine for SiteCapturer {
    async fn capture(&self, request: &CaptureRequest) -> Result<CaptureResult, CaptureError> {
        create_capture_dir(&request.local_dir)
            .await
            .map_err(CaptureError::Directory)?;
        let writer = CaptureWriter::new(request.page_dir.clone());
        let url = request.target_url.as_str();

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(source) if source.is_transport() => {
                return Err(CaptureError::Page {
                    url: url.to_string(),
                    source,
                });
            }
            Err(err) => {
                capture_warn!("Page {} answered but was not saved: {}", url, err);
                return Ok(CaptureResult::new(vec![CapturedResource::unsaved(
                    url,
                    err.to_string(),
                )]));
            }
        };

        let decoded = if page.metadata.is_html() {
            match decode_page(&page.bytes, page.metadata.content_type.as_deref()) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    capture_warn!("Saving {} verbatim: {}", url, err);
                    None
                }
            }
        } else {
            None
        };

        let Some(decoded) = decoded else {
            let path = writer
                .save(PAGE_FILENAME.to_string(), page.bytes)
                .await
                .map_err(CaptureError::Write)?;
            return Ok(CaptureResult::new(vec![CapturedResource::saved(url, path)]));
        };

        let (asset_records, replacements) = self
            .capture_assets(&decoded.html, &page.metadata.final_url, &writer)
            .await;
        let html = match rewrite_references(&decoded.html, &replacements) {
            Ok(html) => html,
            Err(err) => {
                capture_warn!("Saving {} without local references: {}", url, err);
                decoded.html
            }
        };
        let path = writer
            .save(PAGE_FILENAME.to_string(), html.into_bytes())
            .await
            .map_err(CaptureError::Write)?;

        let mut resources = Vec::with_capacity(1 + asset_records.len());
        resources.push(CapturedResource::saved(url, path));
        resources.extend(asset_records);
        let result = CaptureResult::new(resources);
        capture_info!(
            "Captured {} ({} of {} resources saved)",
            url,
            result.saved_count(),
            result.resources.len()
        );
        Ok(result)
    }
}
