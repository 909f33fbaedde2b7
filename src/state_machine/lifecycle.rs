use super::events::LifecycleEvent;
use super::states::WorkflowStatus;
use crate::error::{EngineError, Result};

/// Determine the target status for a lifecycle event, or fail with a state
/// violation when the event is not legal from the current status.
///
/// This is the entire instance state machine: `Created → Started →
/// {Paused ⇄ Started} → Ended`, with `Ended` terminal. Callers apply the
/// returned status only after the check passes, so a guard failure leaves
/// the instance untouched.
pub fn next_status(current: WorkflowStatus, event: LifecycleEvent) -> Result<WorkflowStatus> {
    let target = match (current, event) {
        (WorkflowStatus::Created, LifecycleEvent::Start) => WorkflowStatus::Started,
        (WorkflowStatus::Started, LifecycleEvent::Pause) => WorkflowStatus::Paused,
        (WorkflowStatus::Paused, LifecycleEvent::Resume) => WorkflowStatus::Started,
        (WorkflowStatus::Started | WorkflowStatus::Paused, LifecycleEvent::End) => {
            WorkflowStatus::Ended
        }

        (from, event) => {
            return Err(EngineError::state_violation(format!(
                "cannot {} a workflow instance in status {from}",
                event.event_type()
            )))
        }
    };

    Ok(target)
}
