//! Error types for the scheduling wizard
//!
//! Errors are classified by who can fix them:
//! - Retryable: provider or calendar failures and timeouts
//! - Blocked: the user still has something to do on the current step
//! - Programmer: an operation was dispatched in a state the UI should prevent

use thiserror::Error;

use crate::types::WizardStep;

/// Error types for scheduling session operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    // Programmer errors
    #[error("{operation} is not valid in step {step}")]
    InvalidTransition {
        operation: &'static str,
        step: WizardStep,
    },

    #[error("Already at the first step")]
    AtInitialStep,

    #[error("Wizard session is closed")]
    SessionClosed,

    // Stale or unknown references
    #[error("Slot {0} is not among the current suggestions")]
    UnknownSlot(String),

    #[error("Unknown meeting type: {0}")]
    UnknownMeetingType(String),

    #[error("Participant {0} is not part of this session")]
    UnknownParticipant(String),

    #[error("A participant with email {0} is already part of this session")]
    DuplicateParticipant(String),

    #[error("Checklist item {index} does not exist ({len} items)")]
    InvalidChecklistItem { index: usize, len: usize },

    // Blocked on the user
    #[error("Cannot leave {step}: {reason}")]
    GateNotSatisfied { step: WizardStep, reason: String },

    #[error("Schedule request is incomplete: {0}")]
    IncompleteRequest(&'static str),

    // Suggestion provider
    #[error("Suggestion provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Suggestion provider timed out after {0} seconds")]
    ProviderTimeout(u64),

    #[error("Provider returned an invalid slot: {0}")]
    InvalidSlot(String),

    // Calendar submission
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Calendar submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Calendar submission timed out after {0} seconds")]
    SubmissionTimeout(u64),
}

impl SchedulingError {
    /// Returns true if repeating the same action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SchedulingError::ProviderUnavailable(_)
                | SchedulingError::ProviderTimeout(_)
                | SchedulingError::InvalidSlot(_)
                | SchedulingError::SubmissionFailed(_)
                | SchedulingError::SubmissionTimeout(_)
        )
    }

    /// Returns true if the host dispatched an operation it should have prevented
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            SchedulingError::InvalidTransition { .. }
                | SchedulingError::AtInitialStep
                | SchedulingError::SessionClosed
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SchedulingError::InvalidTransition { .. } => "Reopen the scheduling wizard.",
            SchedulingError::AtInitialStep => "Pick a meeting type to continue.",
            SchedulingError::SessionClosed => "Start a new follow-up from the call summary.",
            SchedulingError::UnknownSlot(_) => "Suggestions changed. Pick one of the new times.",
            SchedulingError::UnknownMeetingType(_) => "Pick a meeting type from the list.",
            SchedulingError::UnknownParticipant(_) => "Refresh the participant list.",
            SchedulingError::DuplicateParticipant(_) => "This person is already invited.",
            SchedulingError::InvalidChecklistItem { .. } => "Refresh the preparation checklist.",
            SchedulingError::GateNotSatisfied { step, .. } => match step {
                WizardStep::TypeSelect => "Pick a meeting type first.",
                WizardStep::TimeSelect => "Pick one of the suggested times first.",
                _ => "Complete this step first.",
            },
            SchedulingError::IncompleteRequest(_) => "Go back and pick a meeting type and time.",
            SchedulingError::ProviderUnavailable(_) | SchedulingError::InvalidSlot(_) => {
                "Suggestions could not be loaded. Try again or pick another date."
            }
            SchedulingError::ProviderTimeout(_) => {
                "Suggestions took too long. Try again or pick another date."
            }
            SchedulingError::SubmissionInProgress => "Wait for the current submission to finish.",
            SchedulingError::SubmissionFailed(_) => {
                "The calendar rejected the meeting. Your details are kept; try again."
            }
            SchedulingError::SubmissionTimeout(_) => {
                "The calendar did not answer in time. Your details are kept; try again."
            }
        }
    }
}

/// Serializable error representation for the wizard host
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Retryable,
    Blocked,
    Programmer,
}

impl From<&SchedulingError> for WizardError {
    fn from(err: &SchedulingError) -> Self {
        let error_type = if err.is_programmer_error() {
            ErrorType::Programmer
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::Blocked
        };

        WizardError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
