//! In-progress state of one scheduling wizard.
//!
//! Every mutation goes through a method here. Operations that need fresh
//! suggestions return a `SuggestionTicket`; the host runs the provider and
//! hands the result back through `apply_suggestions`, which drops responses
//! for any ticket but the latest.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;

use crate::catalog::MeetingType;
use crate::error::SchedulingError;
use crate::gate;
use crate::provider::{rank_slots, SlotQuery};
use crate::types::{
    ChecklistItem, MeetingContext, Participant, SuggestionStatus, TimeSlot, WizardStep,
};

/// A suggestion request scheduled by a session operation.
#[derive(Debug, Clone)]
pub struct SuggestionTicket {
    pub sequence: u64,
    pub query: SlotQuery,
}

/// What `apply_suggestions` did with a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { slots: usize, kept_selection: bool },
    Failed(SchedulingError),
    /// The response belonged to a superseded ticket.
    Discarded { sequence: u64, latest: u64 },
}

/// Field edits allowed on the details step. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct DetailsUpdate {
    pub agenda_text: Option<String>,
    pub notes: Option<String>,
    /// Index into the preparation checklist to flip.
    pub toggle_item: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SchedulingSession {
    id: String,
    call_id: Option<String>,
    company: Option<String>,
    step: WizardStep,
    selected_type: Option<&'static MeetingType>,
    selected_date: NaiveDate,
    participants: Vec<Participant>,
    suggested_slots: Vec<TimeSlot>,
    selected_slot: Option<TimeSlot>,
    agenda_text: String,
    preparation_checklist: Vec<ChecklistItem>,
    notes: String,
    suggestions: SuggestionStatus,
    generation_seq: u64,
    pending_generation: Option<u64>,
    default_timezone: String,
}

impl SchedulingSession {
    /// Open a session seeded from the call context.
    ///
    /// Context participants are deduplicated by email, first occurrence wins.
    pub fn new(context: MeetingContext, initial_date: NaiveDate, default_timezone: &str) -> Self {
        let mut participants: Vec<Participant> = Vec::with_capacity(context.participants.len());
        for participant in context.participants {
            if participants
                .iter()
                .any(|p| p.email_key() == participant.email_key())
            {
                log::debug!("Dropping duplicate context participant {}", participant.email);
                continue;
            }
            participants.push(participant);
        }

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            call_id: context.call_id,
            company: context.company,
            step: WizardStep::TypeSelect,
            selected_type: None,
            selected_date: initial_date,
            participants,
            suggested_slots: Vec::new(),
            selected_slot: None,
            agenda_text: String::new(),
            preparation_checklist: Vec::new(),
            notes: context.summary.unwrap_or_default(),
            suggestions: SuggestionStatus::Idle,
            generation_seq: 0,
            pending_generation: None,
            default_timezone: default_timezone.to_string(),
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn call_id(&self) -> Option<&str> {
        self.call_id.as_deref()
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selected_type(&self) -> Option<&'static MeetingType> {
        self.selected_type
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn suggested_slots(&self) -> &[TimeSlot] {
        &self.suggested_slots
    }

    pub fn selected_slot(&self) -> Option<&TimeSlot> {
        self.selected_slot.as_ref()
    }

    pub fn agenda_text(&self) -> &str {
        &self.agenda_text
    }

    pub fn preparation_checklist(&self) -> &[ChecklistItem] {
        &self.preparation_checklist
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn suggestions(&self) -> &SuggestionStatus {
        &self.suggestions
    }

    /// Sequence number of the most recently issued suggestion ticket.
    pub fn latest_sequence(&self) -> u64 {
        self.generation_seq
    }

    pub fn generation_pending(&self) -> bool {
        self.pending_generation.is_some()
    }

    // =========================================================================
    // Step operations
    // =========================================================================

    /// Pick the meeting type and move to time selection.
    ///
    /// Schedules: suggestion generation for the selected date.
    pub fn select_type(
        &mut self,
        meeting_type: &'static MeetingType,
    ) -> Result<SuggestionTicket, SchedulingError> {
        self.require_step("select_type", WizardStep::TypeSelect)?;

        let changed = !matches!(self.selected_type, Some(current) if current.id == meeting_type.id);
        if changed {
            self.agenda_text = meeting_type.agenda_text();
            self.preparation_checklist = meeting_type
                .preparation_items
                .iter()
                .map(|text| ChecklistItem {
                    text: text.clone(),
                    done: false,
                })
                .collect();
            // Slots were sized for the previous type.
            self.suggested_slots.clear();
            self.selected_slot = None;
        }

        self.selected_type = Some(meeting_type);
        self.step = WizardStep::TimeSelect;
        log::info!(
            "Session {}: selected type {} (changed={})",
            self.id,
            meeting_type.id,
            changed
        );
        Ok(self.issue_ticket(meeting_type))
    }

    /// Change the date suggestions are generated for.
    ///
    /// Schedules: suggestion generation for `date`, superseding any in flight.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<SuggestionTicket, SchedulingError> {
        self.require_step("select_date", WizardStep::TimeSelect)?;
        let meeting_type = self.current_type("select_date")?;
        self.selected_date = date;
        Ok(self.issue_ticket(meeting_type))
    }

    /// Re-request suggestions for the current date after a failure.
    ///
    /// Schedules: suggestion generation for the current date.
    pub fn retry_suggestions(&mut self) -> Result<SuggestionTicket, SchedulingError> {
        self.require_step("retry_suggestions", WizardStep::TimeSelect)?;
        let meeting_type = self.current_type("retry_suggestions")?;
        Ok(self.issue_ticket(meeting_type))
    }

    pub fn select_slot(&mut self, slot_id: &str) -> Result<(), SchedulingError> {
        self.require_step("select_slot", WizardStep::TimeSelect)?;
        let slot = self
            .suggested_slots
            .iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| SchedulingError::UnknownSlot(slot_id.to_string()))?;
        self.selected_slot = Some(slot.clone());
        Ok(())
    }

    /// Move to the next step if the current step's gate holds.
    pub fn advance(&mut self) -> Result<WizardStep, SchedulingError> {
        let Some(next) = self.step.next() else {
            return Err(SchedulingError::InvalidTransition {
                operation: "advance",
                step: self.step,
            });
        };
        gate::check_exit(self)?;
        log::debug!("Session {}: {} -> {}", self.id, self.step, next);
        self.step = next;
        Ok(next)
    }

    /// Move back one step. Nothing but the step changes.
    pub fn retreat(&mut self) -> Result<WizardStep, SchedulingError> {
        let previous = self.step.previous().ok_or(SchedulingError::AtInitialStep)?;
        log::debug!("Session {}: {} -> {}", self.id, self.step, previous);
        self.step = previous;
        Ok(previous)
    }

    pub fn update_details(&mut self, update: DetailsUpdate) -> Result<(), SchedulingError> {
        self.require_step("update_details", WizardStep::Details)?;

        if let Some(index) = update.toggle_item {
            let len = self.preparation_checklist.len();
            let item = self
                .preparation_checklist
                .get_mut(index)
                .ok_or(SchedulingError::InvalidChecklistItem { index, len })?;
            item.done = !item.done;
        }
        if let Some(agenda_text) = update.agenda_text {
            self.agenda_text = agenda_text;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        Ok(())
    }

    pub fn add_participant(&mut self, participant: Participant) -> Result<(), SchedulingError> {
        self.require_editable("add_participant")?;
        if self
            .participants
            .iter()
            .any(|p| p.email_key() == participant.email_key())
        {
            return Err(SchedulingError::DuplicateParticipant(participant.email));
        }
        if self.participants.iter().any(|p| p.id == participant.id) {
            return Err(SchedulingError::DuplicateParticipant(participant.email));
        }
        self.participants.push(participant);
        Ok(())
    }

    pub fn remove_participant(&mut self, participant_id: &str) -> Result<Participant, SchedulingError> {
        self.require_editable("remove_participant")?;
        let index = self
            .participants
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or_else(|| SchedulingError::UnknownParticipant(participant_id.to_string()))?;
        Ok(self.participants.remove(index))
    }

    // =========================================================================
    // Suggestion results
    // =========================================================================

    /// Apply a provider response for ticket `sequence`.
    ///
    /// Only the pending ticket's response is applied, and only once; anything
    /// superseded, never issued, or already applied is discarded. Slots are
    /// validated and ranked here, so a malformed response never reaches the
    /// session.
    pub fn apply_suggestions(
        &mut self,
        sequence: u64,
        result: Result<Vec<TimeSlot>, SchedulingError>,
    ) -> ApplyOutcome {
        if self.pending_generation != Some(sequence) {
            log::debug!(
                "Session {}: discarding suggestions #{} (latest #{}, pending {:?})",
                self.id,
                sequence,
                self.generation_seq,
                self.pending_generation
            );
            return ApplyOutcome::Discarded {
                sequence,
                latest: self.generation_seq,
            };
        }
        self.pending_generation = None;

        match result.and_then(rank_slots) {
            Ok(slots) => {
                let reselected = self
                    .selected_slot
                    .as_ref()
                    .and_then(|selected| slots.iter().find(|s| s.id == selected.id))
                    .cloned();
                let kept_selection = reselected.is_some();
                self.selected_slot = reselected;
                self.suggested_slots = slots;
                self.suggestions = SuggestionStatus::Ready;
                log::info!(
                    "Session {}: applied {} suggestions #{}",
                    self.id,
                    self.suggested_slots.len(),
                    sequence
                );
                ApplyOutcome::Applied {
                    slots: self.suggested_slots.len(),
                    kept_selection,
                }
            }
            Err(err) => {
                log::warn!("Session {}: suggestions #{} failed: {}", self.id, sequence, err);
                self.suggested_slots.clear();
                self.selected_slot = None;
                self.suggestions = SuggestionStatus::Failed {
                    reason: err.to_string(),
                    can_retry: err.is_retryable(),
                };
                ApplyOutcome::Failed(err)
            }
        }
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            session_id: self.id.clone(),
            step: self.step,
            step_position: self.step.position(),
            selected_type_id: self.selected_type.map(|t| t.id.clone()),
            selected_date: self.selected_date,
            participants: self.participants.clone(),
            suggested_slots: self.suggested_slots.clone(),
            selected_slot_id: self.selected_slot.as_ref().map(|s| s.id.clone()),
            agenda_text: self.agenda_text.clone(),
            preparation_checklist: self.preparation_checklist.clone(),
            notes: self.notes.clone(),
            suggestions: self.suggestions.clone(),
            blocked_reason: gate::exit_blocker(self),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_step(&self, operation: &'static str, step: WizardStep) -> Result<(), SchedulingError> {
        if self.step != step {
            return Err(SchedulingError::InvalidTransition {
                operation,
                step: self.step,
            });
        }
        Ok(())
    }

    /// Participants are frozen once the request is under review.
    fn require_editable(&self, operation: &'static str) -> Result<(), SchedulingError> {
        if self.step == WizardStep::Review {
            return Err(SchedulingError::InvalidTransition {
                operation,
                step: self.step,
            });
        }
        Ok(())
    }

    /// First participant timezone the engine recognizes, else the default.
    fn query_timezone(&self) -> String {
        self.participants
            .iter()
            .find(|p| p.timezone.parse::<Tz>().is_ok())
            .map(|p| p.timezone.clone())
            .unwrap_or_else(|| self.default_timezone.clone())
    }

    /// The type time selection runs for; always set past `TypeSelect`.
    fn current_type(&self, operation: &'static str) -> Result<&'static MeetingType, SchedulingError> {
        self.selected_type.ok_or(SchedulingError::InvalidTransition {
            operation,
            step: self.step,
        })
    }

    fn issue_ticket(&mut self, meeting_type: &'static MeetingType) -> SuggestionTicket {
        self.generation_seq += 1;
        self.pending_generation = Some(self.generation_seq);
        self.suggestions = SuggestionStatus::Loading;

        SuggestionTicket {
            sequence: self.generation_seq,
            query: SlotQuery {
                date: self.selected_date,
                meeting_type,
                participants: self.participants.clone(),
                timezone: self.query_timezone(),
            },
        }
    }
}

/// Serializable view of a session for the wizard host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub session_id: String,
    pub step: WizardStep,
    pub step_position: usize,
    pub selected_type_id: Option<String>,
    pub selected_date: NaiveDate,
    pub participants: Vec<Participant>,
    pub suggested_slots: Vec<TimeSlot>,
    pub selected_slot_id: Option<String>,
    pub agenda_text: String,
    pub preparation_checklist: Vec<ChecklistItem>,
    pub notes: String,
    pub suggestions: SuggestionStatus,
    /// Why `advance` would fail right now, if it would.
    pub blocked_reason: Option<String>,
}


#[cfg(test)]
mod tests {
    use super::test_support::{context, session, slots};
    use super::*;
    use crate::catalog::get_meeting_type;

    fn demo() -> &'static MeetingType {
        get_meeting_type("product-demo").unwrap()
    }

    fn at_time_select(confidences: &[u8]) -> SchedulingSession {
        let mut s = session();
        let ticket = s.select_type(demo()).unwrap();
        s.apply_suggestions(ticket.sequence, Ok(slots(confidences)));
        s
    }

    fn at_details() -> SchedulingSession {
        let mut s = at_time_select(&[95, 88, 75]);
        s.select_slot("slot-95").unwrap();
        s.advance().unwrap();
        s
    }

    /// Holds for every session no matter what was called.
    fn assert_selection_invariant(s: &SchedulingSession) {
        if let Some(selected) = s.selected_slot() {
            assert!(
                s.suggested_slots().iter().any(|slot| slot.id == selected.id),
                "selected slot {} not among suggestions",
                selected.id
            );
        }
    }

    #[test]
    fn test_new_session_dedupes_context_participants() {
        let mut ctx = context();
        ctx.participants
            .push(Participant::new("Dana again", "DANA@acme.io", "UTC"));
        let s = SchedulingSession::new(ctx, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(), "UTC");
        assert_eq!(s.participants().len(), 2);
        assert_eq!(s.step(), WizardStep::TypeSelect);
        assert_eq!(s.company(), Some("Acme"));
        assert_eq!(s.call_id(), Some("call-42"));
    }

    #[test]
    fn test_select_type_seeds_details() {
        let mut s = session();
        let ticket = s.select_type(demo()).unwrap();

        assert_eq!(s.step(), WizardStep::TimeSelect);
        assert_eq!(s.selected_type().unwrap().duration_minutes, 60);
        assert_eq!(s.agenda_text(), demo().default_agenda.join("\n"));
        assert_eq!(s.preparation_checklist().len(), demo().preparation_items.len());
        assert!(s.preparation_checklist().iter().all(|item| !item.done));

        assert_eq!(ticket.sequence, 1);
        assert_eq!(ticket.query.meeting_type.id, "product-demo");
        assert_eq!(ticket.query.date, s.selected_date());
        assert_eq!(ticket.query.timezone, "America/New_York");
        assert_eq!(s.suggestions(), &SuggestionStatus::Loading);
    }

    #[test]
    fn test_select_type_outside_type_select_fails() {
        let mut s = at_time_select(&[90]);
        let err = s.select_type(demo()).unwrap_err();
        assert_eq!(
            err,
            SchedulingError::InvalidTransition {
                operation: "select_type",
                step: WizardStep::TimeSelect,
            }
        );
    }

    #[test]
    fn test_changing_type_clears_stale_slot() {
        let mut s = at_time_select(&[95, 88]);
        s.select_slot("slot-88").unwrap();
        s.retreat().unwrap();

        let _ticket = s.select_type(get_meeting_type("check-in").unwrap()).unwrap();
        assert!(s.selected_slot().is_none());
        assert!(s.suggested_slots().is_empty());
        assert_eq!(s.agenda_text(), get_meeting_type("check-in").unwrap().agenda_text());
    }

    #[test]
    fn test_reselecting_same_type_keeps_edits() {
        let mut s = at_details();
        s.update_details(DetailsUpdate {
            agenda_text: Some("Custom agenda".into()),
            ..Default::default()
        })
        .unwrap();
        s.retreat().unwrap();
        s.retreat().unwrap();

        let ticket = s.select_type(demo()).unwrap();
        assert_eq!(s.agenda_text(), "Custom agenda");

        // Same slot ids come back, so the selection survives regeneration.
        let outcome = s.apply_suggestions(ticket.sequence, Ok(slots(&[95, 88, 75])));
        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                slots: 3,
                kept_selection: true
            }
        );
        assert_eq!(s.selected_slot().unwrap().id, "slot-95");
    }

    #[test]
    fn test_suggestions_ranked_and_selectable() {
        let mut s = session();
        let ticket = s.select_type(demo()).unwrap();
        let mut unordered = slots(&[75, 95, 88]);
        unordered.reverse();
        s.apply_suggestions(ticket.sequence, Ok(unordered));

        let confidences: Vec<u8> = s.suggested_slots().iter().map(|slot| slot.confidence).collect();
        assert_eq!(confidences, vec![95, 88, 75]);

        s.select_slot("slot-88").unwrap();
        assert_eq!(s.selected_slot().unwrap().id, "slot-88");
        assert_eq!(s.suggestions(), &SuggestionStatus::Ready);
    }

    #[test]
    fn test_select_unknown_slot_fails() {
        let mut s = at_time_select(&[95]);
        let err = s.select_slot("slot-12").unwrap_err();
        assert_eq!(err, SchedulingError::UnknownSlot("slot-12".into()));
        assert!(s.selected_slot().is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut s = at_time_select(&[60]);
        let first = s.select_date(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()).unwrap();
        let second = s.select_date(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap()).unwrap();
        assert!(second.sequence > first.sequence);
        assert_eq!(second.query.date, NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());

        // Second answers first, then the first straggles in.
        let applied = s.apply_suggestions(second.sequence, Ok(slots(&[91, 81])));
        let stale = s.apply_suggestions(first.sequence, Ok(slots(&[99])));

        assert!(matches!(applied, ApplyOutcome::Applied { slots: 2, .. }));
        assert_eq!(
            stale,
            ApplyOutcome::Discarded {
                sequence: first.sequence,
                latest: second.sequence
            }
        );
        let ids: Vec<&str> = s.suggested_slots().iter().map(|slot| slot.id.as_str()).collect();
        assert_eq!(ids, vec!["slot-91", "slot-81"]);
    }

    #[test]
    fn test_stale_response_does_not_clear_pending() {
        let mut s = at_time_select(&[60]);
        let first = s.retry_suggestions().unwrap();
        let second = s.retry_suggestions().unwrap();
        s.apply_suggestions(first.sequence, Ok(slots(&[99])));
        assert!(s.generation_pending());
        s.apply_suggestions(second.sequence, Ok(slots(&[70])));
        assert!(!s.generation_pending());
    }

    #[test]
    fn test_unissued_sequence_is_discarded() {
        let mut s = session();
        let outcome = s.apply_suggestions(0, Ok(slots(&[90])));

        assert_eq!(outcome, ApplyOutcome::Discarded { sequence: 0, latest: 0 });
        assert_eq!(s.step(), WizardStep::TypeSelect);
        assert!(s.suggested_slots().is_empty());
        assert_eq!(s.suggestions(), &SuggestionStatus::Idle);
    }

    #[test]
    fn test_repeated_response_does_not_touch_review() {
        let mut s = session();
        let ticket = s.select_type(demo()).unwrap();
        let response = slots(&[95, 88]);
        s.apply_suggestions(ticket.sequence, Ok(response.clone()));
        s.select_slot("slot-88").unwrap();
        s.advance().unwrap();
        s.advance().unwrap();
        assert_eq!(s.step(), WizardStep::Review);

        let replay = s.apply_suggestions(ticket.sequence, Ok(slots(&[70])));
        assert_eq!(
            replay,
            ApplyOutcome::Discarded {
                sequence: ticket.sequence,
                latest: ticket.sequence
            }
        );
        let failed_replay = s.apply_suggestions(
            ticket.sequence,
            Err(SchedulingError::ProviderUnavailable("503".into())),
        );
        assert!(matches!(failed_replay, ApplyOutcome::Discarded { .. }));

        assert_eq!(s.selected_slot().unwrap().id, "slot-88");
        assert_eq!(s.suggested_slots().len(), response.len());
        assert!(crate::submission::ScheduleRequest::from_session(&s).is_ok());
    }

    #[test]
    fn test_regeneration_drops_missing_selection() {
        let mut s = at_time_select(&[95, 88]);
        s.select_slot("slot-88").unwrap();
        let ticket = s.select_date(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()).unwrap();
        let outcome = s.apply_suggestions(ticket.sequence, Ok(slots(&[90, 80])));

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                slots: 2,
                kept_selection: false
            }
        );
        assert!(s.selected_slot().is_none());
        assert_selection_invariant(&s);
    }

    #[test]
    fn test_provider_failure_leaves_empty_time_select() {
        let mut s = at_time_select(&[95]);
        s.select_slot("slot-95").unwrap();
        let ticket = s.retry_suggestions().unwrap();
        let outcome = s.apply_suggestions(
            ticket.sequence,
            Err(SchedulingError::ProviderUnavailable("503".into())),
        );

        assert!(matches!(outcome, ApplyOutcome::Failed(SchedulingError::ProviderUnavailable(_))));
        assert_eq!(s.step(), WizardStep::TimeSelect);
        assert!(s.suggested_slots().is_empty());
        assert!(s.selected_slot().is_none());
        assert!(matches!(
            s.suggestions(),
            SuggestionStatus::Failed { can_retry: true, .. }
        ));

        // Retry is available from the error state.
        let retry = s.retry_suggestions().unwrap();
        s.apply_suggestions(retry.sequence, Ok(slots(&[80])));
        assert_eq!(s.suggested_slots().len(), 1);
    }

    #[test]
    fn test_invalid_slot_rejected_at_boundary() {
        let mut s = session();
        let ticket = s.select_type(demo()).unwrap();
        let mut bad = slots(&[90, 80]);
        bad[1].end = bad[1].start;

        let outcome = s.apply_suggestions(ticket.sequence, Ok(bad));
        assert!(matches!(outcome, ApplyOutcome::Failed(SchedulingError::InvalidSlot(_))));
        assert!(s.suggested_slots().is_empty());
    }

    #[test]
    fn test_advance_blocked_without_slot() {
        let mut s = at_time_select(&[95]);
        let err = s.advance().unwrap_err();
        assert!(matches!(
            err,
            SchedulingError::GateNotSatisfied {
                step: WizardStep::TimeSelect,
                ..
            }
        ));
        assert_eq!(s.step(), WizardStep::TimeSelect);
    }

    #[test]
    fn test_advance_from_type_select_requires_type() {
        let mut s = session();
        assert!(s.advance().is_err());
        assert_eq!(s.step(), WizardStep::TypeSelect);
    }

    #[test]
    fn test_walks_all_steps_and_review_is_terminal() {
        let mut s = at_details();
        assert_eq!(s.step(), WizardStep::Details);
        assert_eq!(s.advance().unwrap(), WizardStep::Review);
        let err = s.advance().unwrap_err();
        assert_eq!(
            err,
            SchedulingError::InvalidTransition {
                operation: "advance",
                step: WizardStep::Review,
            }
        );
        assert_eq!(s.step(), WizardStep::Review);
    }

    #[test]
    fn test_retreat_at_initial_step_fails() {
        let mut s = session();
        assert_eq!(s.retreat().unwrap_err(), SchedulingError::AtInitialStep);
        assert_eq!(s.step(), WizardStep::TypeSelect);
    }

    #[test]
    fn test_retreat_then_advance_round_trips() {
        for steps_forward in 1..=3 {
            let mut s = at_details();
            s.advance().unwrap();
            // Walk back to the step under test.
            for _ in steps_forward..3 {
                s.retreat().unwrap();
            }
            let before = s.snapshot();
            s.retreat().unwrap();
            s.advance().unwrap();
            let after = s.snapshot();

            assert_eq!(before.step, after.step);
            assert_eq!(before.selected_type_id, after.selected_type_id);
            assert_eq!(before.selected_slot_id, after.selected_slot_id);
            assert_eq!(before.suggested_slots, after.suggested_slots);
            assert_eq!(before.agenda_text, after.agenda_text);
            assert_eq!(before.preparation_checklist, after.preparation_checklist);
            assert_eq!(before.notes, after.notes);
            assert_eq!(before.participants, after.participants);
        }
    }

    #[test]
    fn test_update_details() {
        let mut s = at_details();
        s.update_details(DetailsUpdate {
            agenda_text: Some("Walk through SSO".into()),
            notes: Some("CFO joins for the last 15 minutes".into()),
            toggle_item: Some(1),
        })
        .unwrap();

        assert_eq!(s.agenda_text(), "Walk through SSO");
        assert_eq!(s.notes(), "CFO joins for the last 15 minutes");
        assert!(s.preparation_checklist()[1].done);
        assert!(!s.preparation_checklist()[0].done);

        s.update_details(DetailsUpdate {
            toggle_item: Some(1),
            ..Default::default()
        })
        .unwrap();
        assert!(!s.preparation_checklist()[1].done);
    }

    #[test]
    fn test_update_details_rejects_bad_index_and_wrong_step() {
        let mut s = at_details();
        let err = s
            .update_details(DetailsUpdate {
                toggle_item: Some(40),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, SchedulingError::InvalidChecklistItem { index: 40, len: 4 });

        let mut s = at_time_select(&[90]);
        assert!(matches!(
            s.update_details(DetailsUpdate::default()),
            Err(SchedulingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_participants_unique_by_email() {
        let mut s = session();
        let err = s
            .add_participant(Participant::new("Dana", "Dana@Acme.io", "UTC"))
            .unwrap_err();
        assert_eq!(err, SchedulingError::DuplicateParticipant("Dana@Acme.io".into()));

        s.add_participant(Participant::new("Sam Ode", "sam@acme.io", "Europe/Berlin"))
            .unwrap();
        assert_eq!(s.participants().len(), 3);

        let id = s.participants()[0].id.clone();
        let removed = s.remove_participant(&id).unwrap();
        assert_eq!(removed.email, "dana@acme.io");
        assert_eq!(
            s.remove_participant(&id).unwrap_err(),
            SchedulingError::UnknownParticipant(id)
        );
    }

    #[test]
    fn test_participants_frozen_in_review() {
        let mut s = at_details();
        s.advance().unwrap();
        assert!(matches!(
            s.add_participant(Participant::new("Late", "late@acme.io", "UTC")),
            Err(SchedulingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_ticket_falls_back_to_default_timezone() {
        let ctx = MeetingContext {
            participants: vec![Participant::new("X", "x@y.io", "Not/AZone")],
            ..Default::default()
        };
        let mut s = SchedulingSession::new(ctx, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(), "Europe/London");
        let ticket = s.select_type(demo()).unwrap();
        assert_eq!(ticket.query.timezone, "Europe/London");
    }

    #[test]
    fn test_selection_invariant_across_operations() {
        let mut s = session();
        let ticket = s.select_type(demo()).unwrap();
        assert_selection_invariant(&s);
        s.apply_suggestions(ticket.sequence, Ok(slots(&[95, 88, 75])));
        s.select_slot("slot-75").unwrap();
        assert_selection_invariant(&s);

        let t1 = s.select_date(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()).unwrap();
        let t2 = s.select_date(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap()).unwrap();
        assert_selection_invariant(&s);
        s.apply_suggestions(t2.sequence, Ok(slots(&[75, 40])));
        assert_selection_invariant(&s);
        s.apply_suggestions(t1.sequence, Ok(slots(&[10])));
        assert_selection_invariant(&s);
        assert_eq!(s.selected_slot().unwrap().id, "slot-75");
    }

    #[test]
    fn test_snapshot_reports_blocker() {
        let s = at_time_select(&[95]);
        let snapshot = s.snapshot();
        assert_eq!(snapshot.step_position, 2);
        assert_eq!(snapshot.blocked_reason.as_deref(), Some("no time slot selected"));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["step"], "time_select");
        assert_eq!(json["selectedTypeId"], "product-demo");
        assert_eq!(json["suggestions"]["state"], "ready");
    }
}
