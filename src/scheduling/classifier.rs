//! Temporal state of an appointment relative to "now"

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::duration::parse_duration;
use crate::models::Appointment;

/// Derived, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemporalState {
    InProgress,
    Today,
    Upcoming,
    Past,
}

/// Start and end of an appointment on the naive local timeline
///
/// The end saturates at the last representable instant instead of overflowing.
pub fn window(fecha: NaiveDate, hora: NaiveTime, duracion: &str) -> (NaiveDateTime, NaiveDateTime) {
    let start = fecha.and_time(hora);
    let end = Duration::try_minutes(parse_duration(duracion))
        .and_then(|length| start.checked_add_signed(length))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}

pub fn classify_at(fecha: NaiveDate, hora: NaiveTime, duracion: &str, now: NaiveDateTime) -> TemporalState {
    let (start, end) = window(fecha, hora, duracion);

    // Checked in this order: a finished appointment from earlier today is past.
    if start <= now && now < end {
        TemporalState::InProgress
    } else if end <= now {
        TemporalState::Past
    } else if start.date() == now.date() && start > now {
        TemporalState::Today
    } else {
        TemporalState::Upcoming
    }
}

pub fn classify(appointment: &Appointment, now: NaiveDateTime) -> TemporalState {
    classify_at(appointment.fecha, appointment.hora, &appointment.duracion, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn finished_today_is_past_not_today() {
        let now = d(3).and_time(t(12, 0));
        assert_eq!(classify_at(d(3), t(10, 0), "45 min", now), TemporalState::Past);
    }

    #[test]
    fn running_appointment_is_in_progress() {
        let now = d(3).and_time(t(10, 30));
        assert_eq!(classify_at(d(3), t(10, 0), "45 min", now), TemporalState::InProgress);
        // start is inclusive, end exclusive
        assert_eq!(classify_at(d(3), t(10, 30), "30 min", now), TemporalState::InProgress);
        assert_eq!(classify_at(d(3), t(10, 0), "30 min", now), TemporalState::Past);
    }

    #[test]
    fn later_today_and_future_days() {
        let now = d(3).and_time(t(9, 0));
        assert_eq!(classify_at(d(3), t(18, 0), "1h", now), TemporalState::Today);
        assert_eq!(classify_at(d(4), t(10, 0), "1h", now), TemporalState::Upcoming);
        assert_eq!(classify_at(d(2), t(18, 0), "1h", now), TemporalState::Past);
    }

    #[test]
    fn unparseable_duration_uses_default() {
        let now = d(3).and_time(t(10, 29));
        assert_eq!(classify_at(d(3), t(10, 0), "???", now), TemporalState::InProgress);
        let now = d(3).and_time(t(10, 30));
        assert_eq!(classify_at(d(3), t(10, 0), "???", now), TemporalState::Past);
    }

    #[test]
    fn absurd_stored_duration_still_classifies() {
        let now = d(3).and_time(t(10, 29));
        for label in ["9999999999999999h", "99999999999999999999min", "1000h 5min"] {
            assert_eq!(classify_at(d(3), t(10, 0), label, now), TemporalState::InProgress);
            assert_eq!(
                classify_at(d(3), t(10, 0), label, d(3).and_time(t(10, 30))),
                TemporalState::Past
            );
        }

        let (start, end) = window(NaiveDate::MAX, t(23, 59), "24h");
        assert_eq!(start, NaiveDate::MAX.and_time(t(23, 59)));
        assert_eq!(end, NaiveDateTime::MAX);
    }

    #[test]
    fn every_instant_gets_exactly_one_state() {
        let fecha = d(3);
        let hora = t(10, 0);
        let (start, end) = window(fecha, hora, "1h 15min");

        // Sweep "now" across the day before, the day itself and the day after
        let mut now = d(2).and_time(t(0, 0));
        let stop = d(5).and_time(t(0, 0));
        while now < stop {
            let state = classify_at(fecha, hora, "1h 15min", now);
            let expected = [
                start <= now && now < end,
                end <= now,
                now < start && now.date() == fecha,
                now < start && now.date() != fecha,
            ];
            assert_eq!(expected.iter().filter(|b| **b).count(), 1);
            let index = match state {
                TemporalState::InProgress => 0,
                TemporalState::Past => 1,
                TemporalState::Today => 2,
                TemporalState::Upcoming => 3,
            };
            assert!(expected[index], "wrong state {:?} at {}", state, now);
            now += Duration::minutes(15);
        }
    }
}
