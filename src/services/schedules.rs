//! Schedules service (opening hours and slot availability)

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::AppointmentFilter,
    repository::Repository,
    scheduling::{
        availability::{self, ConflictRule, SlotAvailability},
        slots::{generate_slots, BusinessHours},
    },
};

/// Slots of one day
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayAvailability {
    pub fecha: NaiveDate,
    pub closed: bool,
    pub rule: ConflictRule,
    pub slots: Vec<SlotAvailability>,
}

impl DayAvailability {
    /// The listed slot starting at `hora`, if the day offers it
    pub fn slot(&self, hora: NaiveTime) -> Option<&SlotAvailability> {
        self.slots.iter().find(|s| s.hora == hora)
    }

    pub fn is_available(&self, hora: NaiveTime) -> bool {
        self.slot(hora).map_or(false, |s| s.available)
    }
}

#[derive(Clone)]
pub struct SchedulesService {
    repository: Repository,
    hours: BusinessHours,
}

impl SchedulesService {
    pub fn new(repository: Repository, hours: BusinessHours) -> Self {
        Self { repository, hours }
    }

    /// Current shop-local time
    pub fn now(&self) -> NaiveDateTime {
        self.hours.now_local()
    }

    /// Start times held by live appointments on `fecha`
    pub async fn occupied_times(&self, fecha: NaiveDate) -> AppResult<Vec<NaiveTime>> {
        let appointments = self
            .repository
            .appointments
            .list(&AppointmentFilter::on(fecha))
            .await?;
        Ok(appointments
            .into_iter()
            .filter(|a| a.estado.occupies_slot())
            .map(|a| a.hora)
            .collect())
    }

    /// Slot list for `fecha`; slots already started relative to `now` are left out
    pub async fn availability(
        &self,
        fecha: NaiveDate,
        rule: ConflictRule,
        now: NaiveDateTime,
    ) -> AppResult<DayAvailability> {
        let slots = generate_slots(fecha, &self.hours);
        if slots.is_empty() {
            return Ok(DayAvailability {
                fecha,
                closed: true,
                rule,
                slots: Vec::new(),
            });
        }

        let booked = self.occupied_times(fecha).await?;
        let mut marked = availability::partition(&slots, &booked, rule);
        availability::drop_elapsed(&mut marked, fecha, now);

        tracing::debug!(
            %fecha,
            ?rule,
            booked = booked.len(),
            free = marked.iter().filter(|s| s.available).count(),
            "Computed availability"
        );

        Ok(DayAvailability {
            fecha,
            closed: false,
            rule,
            slots: marked,
        })
    }
}
