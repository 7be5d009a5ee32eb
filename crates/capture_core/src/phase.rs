use thiserror::Error;

/// Where a single invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Classifying,
    Capturing,
    Uploading,
    Failed,
    CleaningUp,
    Responding,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Begin,
    Classified,
    CaptureSucceeded,
    CaptureFailed,
    UploadSucceeded,
    UploadFailed,
    CleanupStarted,
    CleanupFinished,
    Responded,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("illegal transition from {from:?} on {event:?}")]
pub struct PhaseError {
    pub from: Phase,
    pub event: PhaseEvent,
}

/// Pure transition function. `Done` accepts nothing.
pub fn advance(from: Phase, event: PhaseEvent) -> Result<Phase, PhaseError> {
    use Phase::*;
    use PhaseEvent::*;

    let next = match (from, event) {
        (Start, Begin) => Classifying,
        (Classifying, Classified) => Capturing,
        (Capturing, CaptureSucceeded) => Uploading,
        (Capturing, CaptureFailed) => Failed,
        (Uploading, UploadSucceeded) => CleaningUp,
        (Uploading, UploadFailed) => Failed,
        (Failed, CleanupStarted) => CleaningUp,
        (CleaningUp, CleanupFinished) => Responding,
        (Responding, Responded) => Done,
        _ => return Err(PhaseError { from, event }),
    };
    Ok(next)
}

/// Tracks one invocation's phase and the path it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTracker {
    current: Phase,
    history: Vec<Phase>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: Phase::Start,
            history: vec![Phase::Start],
        }
    }

    pub fn phase(&self) -> Phase {
        self.current
    }

    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Apply `event`. On an illegal transition the phase is left unchanged.
    pub fn apply(&mut self, event: PhaseEvent) -> Result<Phase, PhaseError> {
        let next = advance(self.current, event)?;
        self.current = next;
        self.history.push(next);
        Ok(next)
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
