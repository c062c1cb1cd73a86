//! Slot availability against existing bookings

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::slots::SLOT_INTERVAL_MINUTES;
use crate::models::hhmm;

/// How a candidate slot is compared against booked start times.
///
/// The two rules are not equivalent: `Window` also blocks slots next to an
/// off-grid booking (e.g. a manual 10:15 entry blocks 10:00 and 10:30).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Conflict only when the time labels are identical
    #[default]
    ExactMatch,
    /// Conflict when start times are less than one slot interval apart
    Window,
}

impl ConflictRule {
    pub fn conflicts(self, candidate: NaiveTime, booked: NaiveTime) -> bool {
        match self {
            ConflictRule::ExactMatch => candidate == booked,
            ConflictRule::Window => {
                (candidate - booked).num_minutes().abs() < SLOT_INTERVAL_MINUTES
            }
        }
    }

    pub fn conflicts_with_any(self, candidate: NaiveTime, booked: &[NaiveTime]) -> bool {
        booked.iter().any(|b| self.conflicts(candidate, *b))
    }
}

/// A slot with its availability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SlotAvailability {
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub hora: NaiveTime,
    pub available: bool,
}

/// Mark each slot available or occupied, keeping slot order
pub fn partition(slots: &[NaiveTime], booked: &[NaiveTime], rule: ConflictRule) -> Vec<SlotAvailability> {
    slots
        .iter()
        .map(|&hora| SlotAvailability {
            hora,
            available: !rule.conflicts_with_any(hora, booked),
        })
        .collect()
}

/// Only the free slots
pub fn available_slots(slots: &[NaiveTime], booked: &[NaiveTime], rule: ConflictRule) -> Vec<NaiveTime> {
    partition(slots, booked, rule)
        .into_iter()
        .filter(|s| s.available)
        .map(|s| s.hora)
        .collect()
}

/// Drop slots of `date` that already started
pub fn drop_elapsed(slots: &mut Vec<SlotAvailability>, date: NaiveDate, now: NaiveDateTime) {
    slots.retain(|slot| date.and_time(slot.hora) > now);
}
