//! Time-slot suggestion seam.
//!
//! The engine never computes availability itself. A `SuggestionProvider`
//! returns candidates for a date and meeting type; every response passes
//! through `ranking::rank_slots` before it can reach a session.

pub mod ranking;
pub mod working_hours;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::MeetingType;
use crate::error::SchedulingError;
use crate::types::{Participant, TimeSlot};

pub use ranking::rank_slots;
pub use working_hours::WorkingHoursProvider;

/// What a provider is asked to rank.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub meeting_type: &'static MeetingType,
    pub participants: Vec<Participant>,
    /// IANA timezone the slots should be expressed in.
    pub timezone: String,
}

/// Produces ranked candidate slots for a follow-up meeting.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Candidate slots for `query`. Order is not trusted; the engine re-ranks.
    ///
    /// Failures should be reported as `ProviderUnavailable`.
    async fn generate_slots(&self, query: &SlotQuery) -> Result<Vec<TimeSlot>, SchedulingError>;
}
