//! Follow-up scheduling engine.
//!
//! A wizard picks a meeting type from the catalog, asks a suggestion provider
//! for ranked time slots, collects details, and submits the finished request
//! to a calendar. Providers and calendars are injected through
//! `SuggestionProvider` and `CalendarSubmitter`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod gate;
pub mod provider;
pub mod session;
pub mod submission;
pub mod types;
pub mod wizard;

pub use catalog::{get_meeting_type, list_meeting_types, MeetingType};
pub use config::EngineConfig;
pub use error::{SchedulingError, WizardError};
pub use provider::{SlotQuery, SuggestionProvider, WorkingHoursProvider};
pub use session::{ApplyOutcome, DetailsUpdate, SchedulingSession, SuggestionTicket, WizardSnapshot};
pub use submission::{CalendarSubmitter, ScheduleRequest, SubmissionCoordinator, SubmissionPhase};
pub use types::{
    ChecklistItem, Confirmation, MeetingContext, Participant, SuggestionStatus, TimeSlot,
    WizardStep,
};
pub use wizard::{SchedulingWizard, SuggestionFetcher, SuggestionResponse};
