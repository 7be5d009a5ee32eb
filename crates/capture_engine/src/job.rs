use std::sync::Arc;

use capture_core::{
    compose_response, CacheBuster, CaptureRequest, InvocationEvent, JobConfig, PhaseEvent,
    PhaseTracker,
};
use capture_logging::{capture_debug, capture_error, capture_info, capture_warn};
use serde_json::Value;
use thiserror::Error;

use crate::{
    CaptureEngine, CaptureError, Cleaner, DirectoryCleaner, ObjectStoreUploader, SiteCapturer,
    UploadJob, UploadOutcome, Uploader,
};

/// Why an invocation ended in error. Cleanup problems never appear here.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("page capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("upload failed: {reason}")]
    Upload { reason: String },
}

/// Runs capture, upload, cleanup and response for one invocation at a time.
///
/// Instances are shared between invocations; each run gets its own request
/// and directory, and nothing else is mutated.
pub struct CaptureJob {
    config: Arc<JobConfig>,
    engine: Arc<dyn CaptureEngine>,
    uploader: Arc<dyn Uploader>,
    cleaner: Arc<dyn Cleaner>,
    cache_buster: CacheBuster,
}

impl CaptureJob {
    pub fn new(
        config: Arc<JobConfig>,
        engine: Arc<dyn CaptureEngine>,
        uploader: Arc<dyn Uploader>,
        cleaner: Arc<dyn Cleaner>,
    ) -> Self {
        Self {
            config,
            engine,
            uploader,
            cleaner,
            cache_buster: CacheBuster::new(),
        }
    }

    /// Production wiring: HTTP capture, S3 upload, directory removal.
    pub fn from_config(config: Arc<JobConfig>) -> Result<Self, object_store::Error> {
        let engine = SiteCapturer::from_limits(&config.limits);
        let uploader = ObjectStoreUploader::s3_from_env(&config.bucket)?;
        Ok(Self::new(
            config,
            Arc::new(engine),
            Arc::new(uploader),
            Arc::new(DirectoryCleaner),
        ))
    }

    /// Handle one raw invocation payload. Resolves exactly once, with the
    /// response message or the capture/upload error.
    pub async fn run(&self, event: &Value) -> Result<String, InvocationError> {
        let mut phases = PhaseTracker::new();
        step(&mut phases, PhaseEvent::Begin);

        let trigger = InvocationEvent::classify(event);
        step(&mut phases, PhaseEvent::Classified);

        let request = CaptureRequest::new(&self.config, &self.cache_buster);
        capture_debug!(
            "Invocation {} capturing {} into {:?}",
            trigger,
            request.target_url,
            request.local_dir
        );

        let outcome = self.capture_and_upload(&request, &mut phases).await;
        if outcome.is_err() {
            step(&mut phases, PhaseEvent::CleanupStarted);
        }

        match self.cleaner.cleanup(&request.local_dir).await {
            Ok(removed) => capture_debug!("Cleanup of {:?} removed={}", request.local_dir, removed),
            Err(err) => capture_warn!("Cleanup failed, continuing: {}", err),
        }
        step(&mut phases, PhaseEvent::CleanupFinished);

        let response = outcome.map(|status| compose_response(status, &trigger));
        step(&mut phases, PhaseEvent::Responded);

        match &response {
            Ok(message) => capture_info!("Invocation {} finished: {}", trigger, message),
            Err(err) => capture_error!("Invocation {} failed: {}", trigger, err),
        }
        response
    }

    async fn capture_and_upload(
        &self,
        request: &CaptureRequest,
        phases: &mut PhaseTracker,
    ) -> Result<bool, InvocationError> {
        let captured = match self.engine.capture(request).await {
            Ok(captured) => captured,
            Err(err) => {
                step(phases, PhaseEvent::CaptureFailed);
                return Err(err.into());
            }
        };
        step(phases, PhaseEvent::CaptureSucceeded);
        let status = captured.status();

        let job = UploadJob {
            local_dir: request.local_dir.clone(),
            bucket: self.config.bucket.clone(),
            key_prefix: self.config.key_prefix.clone(),
        };
        match self.uploader.upload(&job).await {
            UploadOutcome::Succeeded { .. } => {
                step(phases, PhaseEvent::UploadSucceeded);
                Ok(status)
            }
            UploadOutcome::Failed(reason) => {
                step(phases, PhaseEvent::UploadFailed);
                Err(InvocationError::Upload { reason })
            }
        }
    }
}

fn step(phases: &mut PhaseTracker, event: PhaseEvent) {
    match phases.apply(event) {
        Ok(phase) => capture_debug!("Phase {:?} after {:?}", phase, event),
        Err(err) => capture_error!("{}", err),
    }
}
