use std::env;

use anyhow::Context;
use capture_core::JobConfig;

/// Read the process configuration once, honouring a local `.env` file.
pub(crate) fn load() -> anyhow::Result<JobConfig> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();
    JobConfig::from_lookup(|name| env::var(name).ok()).context("invalid capture configuration")
}
