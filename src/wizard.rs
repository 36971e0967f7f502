//! Wizard host facade.
//!
//! Binds one `SchedulingSession` to a suggestion provider and a submission
//! coordinator, applies the configured timeouts, and discards the session
//! once the calendar confirms. Hosts that want suggestion fetches to overlap
//! take a `SuggestionFetcher`, run tickets themselves, and feed responses
//! back through `apply_suggestions`.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::catalog::get_meeting_type;
use crate::config::EngineConfig;
use crate::error::SchedulingError;
use crate::provider::SuggestionProvider;
use crate::session::{
    ApplyOutcome, DetailsUpdate, SchedulingSession, SuggestionTicket, WizardSnapshot,
};
use crate::submission::{CalendarSubmitter, ScheduleRequest, SubmissionCoordinator, SubmissionPhase};
use crate::types::{Confirmation, MeetingContext, Participant, TimeSlot, WizardStep};

/// A provider answer tagged with the ticket it belongs to.
#[derive(Debug, Clone)]
pub struct SuggestionResponse {
    pub sequence: u64,
    pub result: Result<Vec<TimeSlot>, SchedulingError>,
}

/// Runs suggestion tickets against the provider under a timeout.
#[derive(Clone)]
pub struct SuggestionFetcher {
    provider: Arc<dyn SuggestionProvider>,
    timeout: Duration,
}

impl SuggestionFetcher {
    pub fn new(provider: Arc<dyn SuggestionProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn fetch(&self, ticket: SuggestionTicket) -> SuggestionResponse {
        let result =
            match tokio::time::timeout(self.timeout, self.provider.generate_slots(&ticket.query))
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    log::warn!(
                        "Suggestion provider timed out for #{} ({})",
                        ticket.sequence,
                        ticket.query.date
                    );
                    Err(SchedulingError::ProviderTimeout(self.timeout.as_secs()))
                }
            };
        SuggestionResponse {
            sequence: ticket.sequence,
            result,
        }
    }
}

pub struct SchedulingWizard {
    session: Option<SchedulingSession>,
    fetcher: SuggestionFetcher,
    coordinator: SubmissionCoordinator,
}

impl SchedulingWizard {
    /// Open a wizard for one follow-up.
    pub fn open(
        context: MeetingContext,
        initial_date: NaiveDate,
        provider: Arc<dyn SuggestionProvider>,
        submitter: Arc<dyn CalendarSubmitter>,
        config: &EngineConfig,
    ) -> Self {
        let session = SchedulingSession::new(context, initial_date, &config.default_timezone);
        log::info!("Opened scheduling session {}", session.id());
        Self {
            session: Some(session),
            fetcher: SuggestionFetcher::new(provider, config.provider_timeout()),
            coordinator: SubmissionCoordinator::new(submitter, config.submission_timeout()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Result<&SchedulingSession, SchedulingError> {
        self.session.as_ref().ok_or(SchedulingError::SessionClosed)
    }

    fn session_mut(&mut self) -> Result<&mut SchedulingSession, SchedulingError> {
        self.session.as_mut().ok_or(SchedulingError::SessionClosed)
    }

    pub fn snapshot(&self) -> Result<WizardSnapshot, SchedulingError> {
        Ok(self.session()?.snapshot())
    }

    pub fn fetcher(&self) -> SuggestionFetcher {
        self.fetcher.clone()
    }

    pub fn submission_phase(&self) -> SubmissionPhase {
        self.coordinator.phase()
    }

    /// Discard the session without submitting.
    pub fn close(&mut self) -> Option<SchedulingSession> {
        let session = self.session.take();
        if let Some(ref s) = session {
            log::info!("Closed scheduling session {} at {}", s.id(), s.step());
        }
        session
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    /// Schedules: suggestion generation (returned ticket).
    pub fn select_type(&mut self, type_id: &str) -> Result<SuggestionTicket, SchedulingError> {
        let meeting_type = get_meeting_type(type_id)
            .ok_or_else(|| SchedulingError::UnknownMeetingType(type_id.to_string()))?;
        self.session_mut()?.select_type(meeting_type)
    }

    /// Schedules: suggestion generation (returned ticket).
    pub fn select_date(&mut self, date: NaiveDate) -> Result<SuggestionTicket, SchedulingError> {
        self.session_mut()?.select_date(date)
    }

    /// Schedules: suggestion generation (returned ticket).
    pub fn retry_suggestions(&mut self) -> Result<SuggestionTicket, SchedulingError> {
        self.session_mut()?.retry_suggestions()
    }

    pub fn apply_suggestions(
        &mut self,
        response: SuggestionResponse,
    ) -> Result<ApplyOutcome, SchedulingError> {
        Ok(self
            .session_mut()?
            .apply_suggestions(response.sequence, response.result))
    }

    pub fn select_slot(&mut self, slot_id: &str) -> Result<(), SchedulingError> {
        self.session_mut()?.select_slot(slot_id)
    }

    pub fn advance(&mut self) -> Result<WizardStep, SchedulingError> {
        self.session_mut()?.advance()
    }

    pub fn retreat(&mut self) -> Result<WizardStep, SchedulingError> {
        self.session_mut()?.retreat()
    }

    pub fn update_details(&mut self, update: DetailsUpdate) -> Result<(), SchedulingError> {
        self.session_mut()?.update_details(update)
    }

    pub fn add_participant(&mut self, participant: Participant) -> Result<(), SchedulingError> {
        self.session_mut()?.add_participant(participant)
    }

    pub fn remove_participant(&mut self, participant_id: &str) -> Result<Participant, SchedulingError> {
        self.session_mut()?.remove_participant(participant_id)
    }

    // =========================================================================
    // Awaiting helpers
    // =========================================================================

    /// Run `ticket` and apply its response.
    ///
    /// Provider failures are recorded on the session and returned as `Err`.
    pub async fn load_suggestions(
        &mut self,
        ticket: SuggestionTicket,
    ) -> Result<ApplyOutcome, SchedulingError> {
        let response = self.fetcher.fetch(ticket).await;
        match self.apply_suggestions(response)? {
            ApplyOutcome::Failed(err) => Err(err),
            outcome => Ok(outcome),
        }
    }

    /// `select_type` followed by its suggestion fetch.
    pub async fn choose_type(&mut self, type_id: &str) -> Result<ApplyOutcome, SchedulingError> {
        let ticket = self.select_type(type_id)?;
        self.load_suggestions(ticket).await
    }

    /// `select_date` followed by its suggestion fetch.
    pub async fn choose_date(&mut self, date: NaiveDate) -> Result<ApplyOutcome, SchedulingError> {
        let ticket = self.select_date(date)?;
        self.load_suggestions(ticket).await
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// The request `submit` would send, for the review screen.
    pub fn review_request(&self) -> Result<ScheduleRequest, SchedulingError> {
        ScheduleRequest::from_session(self.session()?)
    }

    /// Submit the reviewed request.
    ///
    /// On success the session is discarded. On failure it is kept as-is on
    /// `Review`, and calling `submit` again retries.
    pub async fn submit(&mut self) -> Result<Confirmation, SchedulingError> {
        let session = self.session()?;
        if session.step() != WizardStep::Review {
            return Err(SchedulingError::InvalidTransition {
                operation: "submit",
                step: session.step(),
            });
        }
        let request = ScheduleRequest::from_session(session)?;

        let confirmation = self.coordinator.submit(&request).await?;
        self.session = None;
        Ok(confirmation)
    }
}
