use capture_engine::CaptureJob;
use capture_logging::{capture_info, capture_warn};
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;

/// Run one invocation and hand its single outcome back to the runtime.
pub(crate) async fn handle(job: &CaptureJob, event: LambdaEvent<Value>) -> Result<String, Error> {
    let (payload, context) = event.into_parts();
    capture_info!("Request {} received", context.request_id);

    match job.run(&payload).await {
        Ok(response) => Ok(response),
        Err(err) => {
            capture_warn!("Request {} returned an error: {}", context.request_id, err);
            Err(Error::from(err))
        }
    }
}
