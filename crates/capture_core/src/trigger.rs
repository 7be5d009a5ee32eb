use std::fmt;

use serde_json::Value;

/// `source` value carried by timer-based invocations.
pub const SCHEDULE_SOURCE: &str = "aws.events";

/// What caused an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationEvent {
    QueueTriggered { message_id: String },
    ScheduleTriggered { source: String },
    Unclassified,
}

impl InvocationEvent {
    /// Classify a raw invocation payload by its shape. Never fails.
    ///
    /// A non-empty `Records` list whose first entry has a string `messageId`
    /// is a queue delivery; otherwise a `source` equal to [`SCHEDULE_SOURCE`]
    /// is a schedule tick; anything else is unclassified.
    pub fn classify(event: &Value) -> Self {
        if let Some(message_id) = first_message_id(event) {
            return Self::QueueTriggered {
                message_id: message_id.to_string(),
            };
        }
        match event.get("source").and_then(Value::as_str) {
            Some(source) if source == SCHEDULE_SOURCE => Self::ScheduleTriggered {
                source: source.to_string(),
            },
            _ => Self::Unclassified,
        }
    }
}

fn first_message_id(event: &Value) -> Option<&str> {
    event
        .get("Records")?
        .as_array()?
        .first()?
        .get("messageId")?
        .as_str()
}

impl fmt::Display for InvocationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationEvent::QueueTriggered { message_id } => write!(f, "queue({message_id})"),
            InvocationEvent::ScheduleTriggered { source } => write!(f, "schedule({source})"),
            InvocationEvent::Unclassified => write!(f, "unclassified"),
        }
    }
}
