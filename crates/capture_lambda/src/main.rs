//! Function entry point: one page capture per invocation.
mod config;
mod handler;

use std::sync::Arc;

use anyhow::Context;
use capture_engine::CaptureJob;
use capture_logging::capture_info;
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load()?;
    capture_logging::initialize(capture_logging::parse_level(&config.log_level));
    capture_info!(
        "Starting page capture for {} into {}/{}",
        config.capture_url,
        config.bucket,
        config.key_prefix
    );

    let job = Arc::new(
        CaptureJob::from_config(Arc::new(config)).context("cannot create storage client")?,
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let job = job.clone();
        async move { handler::handle(&job, event).await }
    }))
    .await
    .map_err(|err| anyhow::anyhow!(err))
}
