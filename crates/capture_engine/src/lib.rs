//! Capture engine: fetching, saving, uploading and cleaning up one page capture.
mod assets;
mod capture;
mod cleanup;
mod decode;
mod fetch;
mod filename;
mod job;
mod persist;
mod types;
mod upload;

pub use assets::{discover_assets, rewrite_references, AssetKind, AssetRef};
pub use capture::{CaptureEngine, CaptureError, SiteCapturer, PAGE_FILENAME};
pub use cleanup::{Cleaner, CleanupError, DirectoryCleaner};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::asset_filename;
pub use job::{CaptureJob, InvocationError};
pub use persist::{create_capture_dir, CaptureWriter, PersistError};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
pub use upload::{
    object_key, ObjectStoreUploader, UploadJob, UploadOutcome, Uploader,
};
