use crate::InvocationEvent;

/// Build the success message returned to the caller.
pub fn compose_response(status: bool, trigger: &InvocationEvent) -> String {
    let mut message = format!("Page capture finished. Capture status was {status}.");
    match trigger {
        InvocationEvent::QueueTriggered { message_id } => {
            message.push_str(&format!(" SQS message id was {message_id}."));
        }
        InvocationEvent::ScheduleTriggered { .. } => {
            message.push_str(" Triggered by a schedule.");
        }
        InvocationEvent::Unclassified => {}
    }
    message
}
