use std::path::PathBuf;

/// One fetched resource. The first record of a capture is the page itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResource {
    pub url: String,
    pub saved: bool,
    pub local_path: Option<PathBuf>,
    pub failure: Option<String>,
}

impl CapturedResource {
    pub fn saved(url: impl Into<String>, local_path: PathBuf) -> Self {
        Self {
            url: url.into(),
            saved: true,
            local_path: Some(local_path),
            failure: None,
        }
    }

    pub fn unsaved(url: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            saved: false,
            local_path: None,
            failure: Some(failure.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureResult {
    pub resources: Vec<CapturedResource>,
}

impl CaptureResult {
    pub fn new(resources: Vec<CapturedResource>) -> Self {
        Self { resources }
    }

    /// Status reported for the whole capture: the `saved` flag of the
    /// primary record, or `false` when nothing was recorded.
    pub fn status(&self) -> bool {
        self.resources.first().is_some_and(|r| r.saved)
    }

    pub fn saved_count(&self) -> usize {
        self.resources.iter().filter(|r| r.saved).count()
    }
}
