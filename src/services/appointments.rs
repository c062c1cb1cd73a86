//! Staff dashboard: listing and lifecycle changes of appointments

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{
            deposit_for, AppointmentQuery, AppointmentSummary, AppointmentView, DepositUpdate,
        },
        Appointment, AppointmentFilter, AppointmentPatch, AppointmentStatus, SessionClaims,
    },
    repository::Repository,
    scheduling::{aggregate, classifier::classify},
    services::{
        auth::AuthService,
        notifications::{notify_best_effort, Notifier, TemplateData, TemplateKind},
        schedules::SchedulesService,
    },
};

#[derive(Clone)]
pub struct AppointmentsService {
    repository: Repository,
    schedules: SchedulesService,
    auth: AuthService,
    notifier: Arc<dyn Notifier>,
    business_name: String,
    deposit_percent: u32,
}

impl AppointmentsService {
    pub fn new(
        repository: Repository,
        schedules: SchedulesService,
        auth: AuthService,
        notifier: Arc<dyn Notifier>,
        business_name: String,
        deposit_percent: u32,
    ) -> Self {
        Self {
            repository,
            schedules,
            auth,
            notifier,
            business_name,
            deposit_percent,
        }
    }

    /// Store filter for the caller; barbers are pinned to their own appointments
    fn scoped_filter(claims: &SessionClaims, query: &AppointmentQuery) -> AppResult<AppointmentFilter> {
        let mut filter = query.to_filter();
        if !claims.is_admin() {
            if filter.barbero_id.is_some() {
                claims.require_access_to(filter.barbero_id)?;
            }
            filter.barbero_id = Some(claims.account_id);
        }
        Ok(filter)
    }

    async fn visible(&self, claims: &SessionClaims, query: &AppointmentQuery) -> AppResult<Vec<Appointment>> {
        let filter = Self::scoped_filter(claims, query)?;
        self.repository.appointments.list(&filter).await
    }

    /// Appointments in the requested bucket with their temporal state
    pub async fn list(
        &self,
        claims: &SessionClaims,
        query: &AppointmentQuery,
    ) -> AppResult<Vec<AppointmentView>> {
        let appointments = self.visible(claims, query).await?;
        let now = self.schedules.now();
        let bucket = query.bucket.unwrap_or_default();

        Ok(aggregate::filter_by_bucket(&appointments, bucket, now)
            .into_iter()
            .map(|a| AppointmentView {
                appointment: a.clone(),
                temporal_state: classify(a, now),
            })
            .collect())
    }

    /// Counters for the dashboard header; the bucket parameter is ignored
    pub async fn summary(
        &self,
        claims: &SessionClaims,
        query: &AppointmentQuery,
    ) -> AppResult<AppointmentSummary> {
        let appointments = self.visible(claims, query).await?;
        Ok(AppointmentSummary {
            by_status: aggregate::count_by_status(&appointments),
            by_temporal_state: aggregate::count_by_temporal_state(&appointments, self.schedules.now()),
        })
    }

    pub async fn get(&self, claims: &SessionClaims, id: Uuid) -> AppResult<AppointmentView> {
        let appointment = self.accessible(claims, id).await?;
        let temporal_state = classify(&appointment, self.schedules.now());
        Ok(AppointmentView {
            appointment,
            temporal_state,
        })
    }

    async fn accessible(&self, claims: &SessionClaims, id: Uuid) -> AppResult<Appointment> {
        let appointment = self.repository.appointments.get(id).await?;
        claims.require_access_to(appointment.barbero_id)?;
        Ok(appointment)
    }

    /// Change the lifecycle status; confirm and cancel notify the client
    pub async fn update_status(
        &self,
        claims: &SessionClaims,
        id: Uuid,
        estado: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let current = self.accessible(claims, id).await?;
        if current.estado == estado {
            return Ok(current);
        }

        let updated = self
            .repository
            .appointments
            .update(
                id,
                &AppointmentPatch {
                    estado: Some(estado),
                    ..AppointmentPatch::default()
                },
            )
            .await?;

        tracing::info!(
            appointment_id = %id,
            from = %current.estado,
            to = %estado,
            by = %claims.account_id,
            "Appointment status changed"
        );

        let kind = match estado {
            AppointmentStatus::Confirmed => Some(TemplateKind::BookingConfirmed),
            AppointmentStatus::Cancelled => Some(TemplateKind::BookingCancelled),
            _ => None,
        };
        if let Some(kind) = kind {
            let data = TemplateData::from_appointment(&self.business_name, &updated);
            notify_best_effort(self.notifier.as_ref(), &updated.email, kind, &data).await;
        }

        Ok(updated)
    }

    /// Mark the deposit paid or unpaid
    pub async fn set_deposit(
        &self,
        claims: &SessionClaims,
        id: Uuid,
        sena_pagada: bool,
    ) -> AppResult<Appointment> {
        let current = self.accessible(claims, id).await?;
        if current.estado == AppointmentStatus::Cancelled && sena_pagada {
            return Err(AppError::Validation(
                "Cannot take a deposit for a cancelled appointment".to_string(),
            ));
        }

        let deposit = DepositUpdate {
            monto_sena: current
                .monto_sena
                .unwrap_or_else(|| deposit_for(current.precio, self.deposit_percent)),
            sena_pagada,
            fecha_pago_sena: sena_pagada.then(Utc::now),
        };

        let updated = self
            .repository
            .appointments
            .update(
                id,
                &AppointmentPatch {
                    deposit: Some(deposit),
                    ..AppointmentPatch::default()
                },
            )
            .await?;
        tracing::info!(appointment_id = %id, sena_pagada, "Deposit updated");
        Ok(updated)
    }

    /// Assign a barber (admin only)
    pub async fn assign_staff(
        &self,
        claims: &SessionClaims,
        id: Uuid,
        barbero_id: Uuid,
    ) -> AppResult<Appointment> {
        claims.require_admin()?;
        let barber = self.auth.get_staff(barbero_id).await?;

        let updated = self
            .repository
            .appointments
            .update(
                id,
                &AppointmentPatch {
                    barbero: Some((barber.id, barber.nombre)),
                    ..AppointmentPatch::default()
                },
            )
            .await?;
        tracing::info!(appointment_id = %id, barbero_id = %barbero_id, "Barber assigned");
        Ok(updated)
    }

    /// Delete an appointment (admin only)
    pub async fn delete(&self, claims: &SessionClaims, id: Uuid) -> AppResult<()> {
        claims.require_admin()?;
        self.repository.appointments.delete(id).await?;
        tracing::info!(appointment_id = %id, by = %claims.account_id, "Appointment deleted");
        Ok(())
    }
}
