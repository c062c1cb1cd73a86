//! Business logic services

pub mod appointments;
pub mod auth;
pub mod booking;
pub mod notifications;
pub mod schedules;
pub mod stats;

use std::sync::Arc;

use crate::{
    config::AppConfig, error::AppResult, repository::Repository, scheduling::slots::BusinessHours,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub schedules: schedules::SchedulesService,
    pub booking: booking::BookingService,
    pub appointments: appointments::AppointmentsService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the configured notifier
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let notifier = notifications::from_config(&config.notifications)?;
        Self::with_notifier(repository, config, notifier)
    }

    /// Create all services around an explicit notifier
    pub fn with_notifier(
        repository: Repository,
        config: &AppConfig,
        notifier: Arc<dyn notifications::Notifier>,
    ) -> AppResult<Self> {
        let hours = BusinessHours::from_config(&config.business)?;
        let auth = auth::AuthService::new(repository.clone(), config.auth.clone());
        let schedules = schedules::SchedulesService::new(repository.clone(), hours);

        Ok(Self {
            booking: booking::BookingService::new(
                repository.clone(),
                schedules.clone(),
                auth.clone(),
                notifier.clone(),
                config,
            ),
            appointments: appointments::AppointmentsService::new(
                repository.clone(),
                schedules.clone(),
                auth.clone(),
                notifier,
                config.business.name.clone(),
                config.business.deposit_percent,
            ),
            stats: stats::StatsService::new(repository.clone(), schedules.clone()),
            auth,
            schedules,
            repository,
        })
    }

    /// Existence probe against the appointment store
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.appointments.ping().await
    }
}
