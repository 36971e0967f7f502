use std::collections::HashSet;

use crate::error::SchedulingError;
use crate::types::TimeSlot;

/// Validate a provider response and sort it best-first.
///
/// Order: confidence descending, then earlier start, then id. A response
/// containing any malformed slot is rejected whole with `InvalidSlot`.
pub fn rank_slots(mut slots: Vec<TimeSlot>) -> Result<Vec<TimeSlot>, SchedulingError> {
    let mut seen = HashSet::new();
    for slot in &slots {
        if slot.id.trim().is_empty() {
            return Err(SchedulingError::InvalidSlot("slot without an id".into()));
        }
        if slot.end <= slot.start {
            return Err(SchedulingError::InvalidSlot(format!(
                "{} ends at or before its start",
                slot.id
            )));
        }
        if slot.confidence > 100 {
            return Err(SchedulingError::InvalidSlot(format!(
                "{} has confidence {} (max 100)",
                slot.id, slot.confidence
            )));
        }
        if !seen.insert(slot.id.as_str()) {
            return Err(SchedulingError::InvalidSlot(format!(
                "duplicate slot id {}",
                slot.id
            )));
        }
    }

    slots.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then(a.start.cmp(&b.start))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(slots)
}
