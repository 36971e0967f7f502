//! Demo provider for the `followup-wizard` CLI.
//!
//! Proposes starts on a fixed grid inside working hours and scores them by
//! time of day. It is not an availability engine: it never looks at anyone's
//! calendar, and the library never uses it on its own. Hosts with real
//! availability data plug in their own `SuggestionProvider`.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use super::{rank_slots, SlotQuery, SuggestionProvider};
use crate::config::{EngineConfig, WorkingHours};
use crate::error::SchedulingError;
use crate::types::TimeSlot;

/// Start time (minutes after midnight) that scores highest.
const PREFERRED_START_MINUTE: i64 = 10 * 60;

const BASE_CONFIDENCE: i64 = 95;

/// Confidence lost per hour away from the preferred start.
const DISTANCE_PENALTY_PER_HOUR: i64 = 6;

const LUNCH_START_MINUTE: i64 = 12 * 60;
const LUNCH_END_MINUTE: i64 = 13 * 60;
const LUNCH_PENALTY: i64 = 15;

/// Meetings ending in the last hour of the day run into wrap-up time.
const END_OF_DAY_PENALTY: i64 = 5;

/// Attendees beyond this count make a slot harder to hold.
const COMFORTABLE_GROUP_SIZE: usize = 3;
const PER_EXTRA_PARTICIPANT_PENALTY: i64 = 2;

pub struct WorkingHoursProvider {
    hours: WorkingHours,
    step_minutes: u32,
    max_suggestions: usize,
    default_tz: Tz,
}

impl WorkingHoursProvider {
    pub fn new(hours: WorkingHours, step_minutes: u32, max_suggestions: usize, default_tz: Tz) -> Self {
        Self {
            hours,
            step_minutes: step_minutes.max(1),
            max_suggestions,
            default_tz,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.working_hours,
            config.slot_step_minutes,
            config.max_suggestions,
            config.default_tz().unwrap_or(Tz::UTC),
        )
    }

    fn candidates(&self, query: &SlotQuery) -> Vec<TimeSlot> {
        if matches!(query.date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Vec::new();
        }

        let tz: Tz = query.timezone.parse().unwrap_or(self.default_tz);
        let duration = i64::from(query.meeting_type.duration_minutes);
        let day_start = i64::from(self.hours.start_hour) * 60;
        let day_end = i64::from(self.hours.end_hour) * 60;
        let step = i64::from(self.step_minutes);

        let mut slots = Vec::new();
        let mut minute = day_start;
        while minute + duration <= day_end {
            let Some(time) = NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
            else {
                break;
            };
            // Skips starts that fall into a DST gap.
            if let Some(local_start) = tz.from_local_datetime(&query.date.and_time(time)).single() {
                let start = local_start.with_timezone(&Utc);
                let (confidence, reasoning) =
                    score(minute, duration, day_end, query.participants.len());
                slots.push(TimeSlot {
                    id: format!("{}-{:04}", query.date, minute),
                    start,
                    end: start + Duration::minutes(duration),
                    confidence,
                    reasoning,
                    timezone: tz.name().to_string(),
                    available: true,
                });
            }
            minute += step;
        }
        slots
    }
}

fn score(start_minute: i64, duration: i64, day_end: i64, participants: usize) -> (u8, String) {
    let mut confidence = BASE_CONFIDENCE;
    let mut reasons = Vec::new();

    let distance_minutes = (start_minute - PREFERRED_START_MINUTE).abs();
    if distance_minutes == 0 {
        reasons.push("mid-morning slots have the best acceptance rate".to_string());
    } else {
        confidence -= distance_minutes * DISTANCE_PENALTY_PER_HOUR / 60;
        reasons.push(format!(
            "{} min from the preferred mid-morning start",
            distance_minutes
        ));
    }

    let end_minute = start_minute + duration;
    if start_minute < LUNCH_END_MINUTE && end_minute > LUNCH_START_MINUTE {
        confidence -= LUNCH_PENALTY;
        reasons.push("overlaps lunch".to_string());
    }

    if end_minute > day_end - 60 {
        confidence -= END_OF_DAY_PENALTY;
        reasons.push("runs into the end of the day".to_string());
    }

    if participants > COMFORTABLE_GROUP_SIZE {
        let extra = (participants - COMFORTABLE_GROUP_SIZE) as i64;
        confidence -= extra * PER_EXTRA_PARTICIPANT_PENALTY;
        reasons.push(format!("{} attendees to coordinate", participants));
    }

    (confidence.clamp(0, 100) as u8, reasons.join("; "))
}

#[async_trait]
impl SuggestionProvider for WorkingHoursProvider {
    async fn generate_slots(&self, query: &SlotQuery) -> Result<Vec<TimeSlot>, SchedulingError> {
        let mut ranked = rank_slots(self.candidates(query))?;
        ranked.truncate(self.max_suggestions);
        log::debug!(
            "WorkingHoursProvider: {} candidates for {} on {}",
            ranked.len(),
            query.meeting_type.id,
            query.date
        );
        Ok(ranked)
    }
}
