//! Finalized schedule requests and the calendar submission coordinator.
//!
//! The coordinator walks `Idle -> Submitting -> Submitted | Failed` and keeps
//! at most one call to the calendar in flight. It never retries on its own;
//! calling `submit` again after `Failed` is the retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::SchedulingError;
use crate::session::SchedulingSession;
use crate::types::{ChecklistItem, Confirmation, Participant, TimeSlot};

/// Everything the calendar needs to book the follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub meeting_type_id: String,
    pub meeting_type_name: String,
    pub title: String,
    pub slot: TimeSlot,
    pub participants: Vec<Participant>,
    pub agenda_text: String,
    pub preparation_checklist: Vec<ChecklistItem>,
    pub notes: String,
    /// Invite body rendered from agenda and notes.
    pub description: String,
}

impl ScheduleRequest {
    /// Assemble the request from a session's current fields.
    pub fn from_session(session: &SchedulingSession) -> Result<Self, SchedulingError> {
        let meeting_type = session
            .selected_type()
            .ok_or(SchedulingError::IncompleteRequest("no meeting type selected"))?;
        let slot = session
            .selected_slot()
            .ok_or(SchedulingError::IncompleteRequest("no time slot selected"))?;

        let title = match session.company() {
            Some(company) if !company.trim().is_empty() => {
                format!("{} with {}", meeting_type.name, company.trim())
            }
            _ => meeting_type.name.clone(),
        };

        Ok(Self {
            session_id: session.id().to_string(),
            call_id: session.call_id().map(str::to_string),
            meeting_type_id: meeting_type.id.clone(),
            meeting_type_name: meeting_type.name.clone(),
            title,
            slot: slot.clone(),
            participants: session.participants().to_vec(),
            agenda_text: session.agenda_text().to_string(),
            preparation_checklist: session.preparation_checklist().to_vec(),
            notes: session.notes().to_string(),
            description: render_description(session.agenda_text(), session.notes()),
        })
    }

    pub fn attendee_emails(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.email.as_str()).collect()
    }
}

fn render_description(agenda_text: &str, notes: &str) -> String {
    let mut description = String::new();
    let agenda: Vec<&str> = agenda_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if !agenda.is_empty() {
        description.push_str("Agenda:\n");
        for line in agenda {
            description.push_str("- ");
            description.push_str(line);
            description.push('\n');
        }
    }
    let notes = notes.trim();
    if !notes.is_empty() {
        if !description.is_empty() {
            description.push('\n');
        }
        description.push_str("Notes:\n");
        description.push_str(notes);
        description.push('\n');
    }
    description
}

/// Books a finalized meeting on an external calendar.
#[async_trait]
pub trait CalendarSubmitter: Send + Sync {
    async fn submit_meeting(&self, request: &ScheduleRequest)
        -> Result<Confirmation, SchedulingError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase", tag = "phase")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Submitting,
    #[serde(rename_all = "camelCase")]
    Submitted { event_id: String },
    Failed { reason: String },
}

/// Serializes calendar submissions for one session.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    submitter: Arc<dyn CalendarSubmitter>,
    phase: Arc<Mutex<SubmissionPhase>>,
    timeout: Duration,
}

impl SubmissionCoordinator {
    pub fn new(submitter: Arc<dyn CalendarSubmitter>, timeout: Duration) -> Self {
        Self {
            submitter,
            phase: Arc::new(Mutex::new(SubmissionPhase::Idle)),
            timeout,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase.lock().clone()
    }

    /// Submit `request`, calling the calendar exactly once.
    ///
    /// Fails fast with `SubmissionInProgress` while another call is in flight.
    pub async fn submit(&self, request: &ScheduleRequest) -> Result<Confirmation, SchedulingError> {
        self.begin()?;
        let mut in_flight = InFlight {
            phase: &self.phase,
            settled: false,
        };

        log::info!(
            "Submitting {} for session {} at {}",
            request.meeting_type_id,
            request.session_id,
            request.slot.start
        );

        let outcome =
            match tokio::time::timeout(self.timeout, self.submitter.submit_meeting(request)).await {
                Ok(Ok(confirmation)) => Ok(confirmation),
                Ok(Err(err @ SchedulingError::SubmissionFailed(_)))
                | Ok(Err(err @ SchedulingError::SubmissionTimeout(_))) => Err(err),
                Ok(Err(other)) => Err(SchedulingError::SubmissionFailed(other.to_string())),
                Err(_) => Err(SchedulingError::SubmissionTimeout(self.timeout.as_secs())),
            };

        in_flight.settle(&outcome);
        match &outcome {
            Ok(confirmation) => log::info!(
                "Session {} submitted as event {}",
                request.session_id,
                confirmation.event_id
            ),
            Err(err) => log::warn!("Session {} submission failed: {}", request.session_id, err),
        }
        outcome
    }

    fn begin(&self) -> Result<(), SchedulingError> {
        let mut phase = self.phase.lock();
        match *phase {
            SubmissionPhase::Submitting => Err(SchedulingError::SubmissionInProgress),
            SubmissionPhase::Submitted { .. } => Err(SchedulingError::InvalidTransition {
                operation: "submit",
                step: crate::types::WizardStep::Review,
            }),
            SubmissionPhase::Idle | SubmissionPhase::Failed { .. } => {
                *phase = SubmissionPhase::Submitting;
                Ok(())
            }
        }
    }
}

/// Resets the phase if a submit future is dropped mid-flight.
struct InFlight<'a> {
    phase: &'a Mutex<SubmissionPhase>,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, outcome: &Result<Confirmation, SchedulingError>) {
        *self.phase.lock() = match outcome {
            Ok(confirmation) => SubmissionPhase::Submitted {
                event_id: confirmation.event_id.clone(),
            },
            Err(err) => SubmissionPhase::Failed {
                reason: err.to_string(),
            },
        };
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.phase.lock() = SubmissionPhase::Failed {
                reason: "submission cancelled".into(),
            };
        }
    }
}
