//! Exit conditions for each wizard step.
//!
//! `advance()` consults these before moving; nothing else changes the step
//! forward.

use crate::error::SchedulingError;
use crate::session::SchedulingSession;
use crate::types::WizardStep;

/// Blocker while a suggestion ticket is outstanding. A host that drops the
/// fetch recovers by reissuing through `retry_suggestions`.
pub const LOADING_REASON: &str = "suggestions are still loading; retry_suggestions reissues a dropped request";

/// Why the session cannot leave its current step, if anything.
pub fn exit_blocker(session: &SchedulingSession) -> Option<String> {
    match session.step() {
        WizardStep::TypeSelect => {
            if session.selected_type().is_none() {
                return Some("no meeting type selected".into());
            }
            None
        }
        WizardStep::TimeSelect => {
            if session.generation_pending() {
                return Some(LOADING_REASON.into());
            }
            let Some(selected) = session.selected_slot() else {
                return Some("no time slot selected".into());
            };
            if !session.suggested_slots().iter().any(|s| s.id == selected.id) {
                return Some(format!("slot {} is no longer suggested", selected.id));
            }
            None
        }
        WizardStep::Details | WizardStep::Review => None,
    }
}

/// `Ok` when the current step's exit condition holds.
pub fn check_exit(session: &SchedulingSession) -> Result<(), SchedulingError> {
    match exit_blocker(session) {
        None => Ok(()),
        Some(reason) => Err(SchedulingError::GateNotSatisfied {
            step: session.step(),
            reason,
        }),
    }
}
