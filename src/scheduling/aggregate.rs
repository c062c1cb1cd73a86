//! Reductions over appointment collections for the dashboard and statistics.
//!
//! Every money figure goes through [`revenue`]; totals, per-service and
//! per-staff breakdowns and the average ticket are sums of it over a subset.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::classifier::{classify, TemporalState};
use crate::models::{Appointment, AppointmentStatus};

/// Label used when an appointment has no barber assigned
pub const UNASSIGNED_STAFF: &str = "Sin asignar";

/// Revenue attributed to a single appointment
pub fn revenue(appointment: &Appointment) -> i64 {
    match appointment.estado {
        AppointmentStatus::Completed => i64::from(appointment.precio),
        AppointmentStatus::Confirmed | AppointmentStatus::Requested => {
            if appointment.sena_pagada {
                i64::from(appointment.deposit_amount())
            } else {
                0
            }
        }
        AppointmentStatus::Cancelled => 0,
    }
}

pub fn total_revenue<'a, I>(appointments: I) -> i64
where
    I: IntoIterator<Item = &'a Appointment>,
{
    appointments.into_iter().map(revenue).sum()
}

/// Mean revenue over appointments that produced any, 0 when none did
pub fn average_ticket<'a, I>(appointments: I) -> i64
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let (sum, count) = appointments
        .into_iter()
        .map(revenue)
        .filter(|r| *r > 0)
        .fold((0i64, 0i64), |(s, c), r| (s + r, c + 1));
    if count == 0 {
        0
    } else {
        (sum + count / 2) / count
    }
}

// ---------------------------------------------------------------------------
// Temporal buckets
// ---------------------------------------------------------------------------

/// Dashboard tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TemporalBucket {
    #[default]
    All,
    InProgress,
    /// Later today plus anything running right now
    Today,
    Upcoming,
    Past,
}

impl TemporalBucket {
    pub fn contains(self, state: TemporalState) -> bool {
        match self {
            TemporalBucket::All => true,
            TemporalBucket::InProgress => state == TemporalState::InProgress,
            TemporalBucket::Today => {
                matches!(state, TemporalState::Today | TemporalState::InProgress)
            }
            TemporalBucket::Upcoming => state == TemporalState::Upcoming,
            TemporalBucket::Past => state == TemporalState::Past,
        }
    }
}

pub fn filter_by_bucket(
    appointments: &[Appointment],
    bucket: TemporalBucket,
    now: NaiveDateTime,
) -> Vec<&Appointment> {
    appointments
        .iter()
        .filter(|a| bucket.contains(classify(a, now)))
        .collect()
}

/// Number of appointments per temporal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TemporalCounts {
    pub in_progress: i64,
    pub today: i64,
    pub upcoming: i64,
    pub past: i64,
}

pub fn count_by_temporal_state(appointments: &[Appointment], now: NaiveDateTime) -> TemporalCounts {
    appointments
        .iter()
        .fold(TemporalCounts::default(), |mut counts, a| {
            match classify(a, now) {
                TemporalState::InProgress => counts.in_progress += 1,
                TemporalState::Today => counts.today += 1,
                TemporalState::Upcoming => counts.upcoming += 1,
                TemporalState::Past => counts.past += 1,
            }
            counts
        })
}

// ---------------------------------------------------------------------------
// Status counts
// ---------------------------------------------------------------------------

/// Tally per lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub reservado: i64,
    pub confirmado: i64,
    pub completado: i64,
    pub cancelado: i64,
    pub total: i64,
}

pub fn count_by_status(appointments: &[Appointment]) -> StatusCounts {
    appointments
        .iter()
        .fold(StatusCounts::default(), |mut counts, a| {
            match a.estado {
                AppointmentStatus::Requested => counts.reservado += 1,
                AppointmentStatus::Confirmed => counts.confirmado += 1,
                AppointmentStatus::Completed => counts.completado += 1,
                AppointmentStatus::Cancelled => counts.cancelado += 1,
            }
            counts.total += 1;
            counts
        })
}

/// Cancelled share as a rounded percentage; 0 for an empty collection
pub fn cancellation_rate(appointments: &[Appointment]) -> u32 {
    if appointments.is_empty() {
        return 0;
    }
    let cancelled = appointments
        .iter()
        .filter(|a| a.estado == AppointmentStatus::Cancelled)
        .count();
    ((cancelled as f64 / appointments.len() as f64) * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Group and rank
// ---------------------------------------------------------------------------

/// What a group sums up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Revenue,
    Count,
}

impl Measure {
    fn of(self, appointment: &Appointment) -> i64 {
        match self {
            Measure::Revenue => revenue(appointment),
            Measure::Count => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedGroup<K> {
    pub key: K,
    pub value: i64,
}

/// Group by `key`, sum `measure`, sort descending (ties by key), keep `top_n`
pub fn group_and_rank<K, F>(
    appointments: &[Appointment],
    key: F,
    measure: Measure,
    top_n: Option<usize>,
) -> Vec<RankedGroup<K>>
where
    K: Ord,
    F: Fn(&Appointment) -> K,
{
    let mut groups: BTreeMap<K, i64> = BTreeMap::new();
    for appointment in appointments {
        *groups.entry(key(appointment)).or_insert(0) += measure.of(appointment);
    }

    let mut ranked: Vec<RankedGroup<K>> = groups
        .into_iter()
        .map(|(key, value)| RankedGroup { key, value })
        .collect();
    // BTreeMap order is the tie-breaker; sort_by is stable
    ranked.sort_by(|a, b| b.value.cmp(&a.value));

    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    ranked
}

pub fn by_service(appointment: &Appointment) -> String {
    appointment.servicio.clone()
}

pub fn by_staff(appointment: &Appointment) -> String {
    appointment
        .barbero_nombre
        .clone()
        .unwrap_or_else(|| UNASSIGNED_STAFF.to_string())
}

pub fn by_day(appointment: &Appointment) -> NaiveDate {
    appointment.fecha
}

/// Cell of the weekly occupancy heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
pub struct HourOfWeek {
    /// 0 = Monday ... 6 = Sunday
    pub weekday: u32,
    pub hour: u32,
}

pub fn by_hour_of_week(appointment: &Appointment) -> HourOfWeek {
    HourOfWeek {
        weekday: appointment.fecha.weekday().num_days_from_monday(),
        hour: appointment.hora.hour(),
    }
}
