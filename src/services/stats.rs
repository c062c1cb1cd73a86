//! Statistics service

use chrono::{Duration, NaiveDate};

use crate::{
    api::stats::{HeatmapCell, StatEntry, StatsQuery, StatsResponse},
    error::{AppError, AppResult},
    models::{Appointment, AppointmentFilter, SessionClaims},
    repository::Repository,
    scheduling::aggregate::{self, Measure, RankedGroup},
    services::schedules::SchedulesService,
};

/// Days covered when no start date is given
pub const DEFAULT_PERIOD_DAYS: i64 = 30;
const DEFAULT_TOP: usize = 5;
const MAX_TOP: usize = 50;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    schedules: SchedulesService,
}

fn entries(groups: Vec<RankedGroup<String>>) -> Vec<StatEntry> {
    groups
        .into_iter()
        .map(|g| StatEntry {
            label: g.key,
            value: g.value,
        })
        .collect()
}

impl StatsService {
    pub fn new(repository: Repository, schedules: SchedulesService) -> Self {
        Self {
            repository,
            schedules,
        }
    }

    /// Resolve the period, defaulting to the last 30 days up to today
    pub fn period(&self, query: &StatsQuery) -> AppResult<(NaiveDate, NaiveDate)> {
        let hasta = query.hasta.unwrap_or_else(|| self.schedules.now().date());
        let desde = query
            .desde
            .unwrap_or_else(|| hasta - Duration::days(DEFAULT_PERIOD_DAYS - 1));
        if desde > hasta {
            return Err(AppError::Validation(format!(
                "desde ({}) is after hasta ({})",
                desde, hasta
            )));
        }
        Ok((desde, hasta))
    }

    /// Compute statistics over the period; barbers only see their own figures
    pub async fn get_stats(&self, claims: &SessionClaims, query: &StatsQuery) -> AppResult<StatsResponse> {
        let (desde, hasta) = self.period(query)?;
        let top = Some(query.top.unwrap_or(DEFAULT_TOP).clamp(1, MAX_TOP));

        let mut filter = AppointmentFilter::between(desde, hasta);
        if !claims.is_admin() {
            filter.barbero_id = Some(claims.account_id);
        }
        let appointments = self.repository.appointments.list(&filter).await?;

        tracing::debug!(%desde, %hasta, count = appointments.len(), "Computing statistics");
        Ok(Self::summarize(desde, hasta, &appointments, top))
    }

    fn summarize(
        desde: NaiveDate,
        hasta: NaiveDate,
        appointments: &[Appointment],
        top: Option<usize>,
    ) -> StatsResponse {
        let mut by_day = aggregate::group_and_rank(appointments, aggregate::by_day, Measure::Revenue, None);
        by_day.sort_by_key(|g| g.key);

        let live: Vec<Appointment> = appointments
            .iter()
            .filter(|a| a.estado.occupies_slot())
            .cloned()
            .collect();
        let mut heatmap = aggregate::group_and_rank(&live, aggregate::by_hour_of_week, Measure::Count, None);
        heatmap.sort_by_key(|g| g.key);

        StatsResponse {
            desde,
            hasta,
            total: appointments.len() as i64,
            revenue: aggregate::total_revenue(appointments),
            average_ticket: aggregate::average_ticket(appointments),
            cancellation_rate: aggregate::cancellation_rate(appointments),
            by_status: aggregate::count_by_status(appointments),
            by_service: entries(aggregate::group_and_rank(
                appointments,
                aggregate::by_service,
                Measure::Revenue,
                top,
            )),
            by_staff: entries(aggregate::group_and_rank(
                appointments,
                aggregate::by_staff,
                Measure::Revenue,
                top,
            )),
            by_day: by_day
                .into_iter()
                .map(|g| StatEntry {
                    label: g.key.format("%Y-%m-%d").to_string(),
                    value: g.value,
                })
                .collect(),
            heatmap: heatmap
                .into_iter()
                .map(|g| HeatmapCell {
                    weekday: g.key.weekday,
                    hour: g.key.hour,
                    count: g.value,
                })
                .collect(),
        }
    }
}
