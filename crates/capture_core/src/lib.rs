//! Capture core: pure decisions for one page-capture invocation.
mod config;
mod phase;
mod request;
mod response;
mod result;
mod trigger;

pub use config::{ConfigError, FetchLimits, JobConfig, DEFAULT_CAPTURE_ROOT};
pub use phase::{advance, Phase, PhaseError, PhaseEvent, PhaseTracker};
pub use request::{cache_busted_url, CacheBuster, CaptureRequest, CAPTURE_DIR_PREFIX};
pub use response::compose_response;
pub use result::{CaptureResult, CapturedResource};
pub use trigger::{InvocationEvent, SCHEDULE_SOURCE};
