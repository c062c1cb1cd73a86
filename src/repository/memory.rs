//! In-memory stores, used when no database URL is configured

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, AppointmentStore, SLOT_TAKEN};
use crate::{
    error::{AppError, AppResult},
    models::{
        account::NewAccount, Account, Appointment, AppointmentFilter, AppointmentPatch,
        NewAppointment, Role,
    },
};

fn holds_slot(a: &Appointment, fecha: NaiveDate, hora: NaiveTime) -> bool {
    a.fecha == fecha && a.hora == hora && a.estado.occupies_slot()
}

#[derive(Default)]
pub struct MemoryAppointmentStore {
    appointments: RwLock<Vec<Appointment>>,
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn list(&self, filter: &AppointmentFilter) -> AppResult<Vec<Appointment>> {
        let appointments = self.appointments.read().await;
        let mut rows: Vec<Appointment> = appointments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.fecha, a.hora));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> AppResult<Appointment> {
        self.appointments
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    async fn find_at(&self, fecha: NaiveDate, hora: NaiveTime) -> AppResult<Option<Appointment>> {
        Ok(self
            .appointments
            .read()
            .await
            .iter()
            .find(|a| holds_slot(a, fecha, hora))
            .cloned())
    }

    async fn insert(&self, data: NewAppointment) -> AppResult<Appointment> {
        // Check and push under one write lock
        let mut appointments = self.appointments.write().await;
        if data.estado.occupies_slot()
            && appointments.iter().any(|a| holds_slot(a, data.fecha, data.hora))
        {
            return Err(AppError::Conflict(SLOT_TAKEN.to_string()));
        }
        let appointment = data.into_appointment(Uuid::new_v4(), Utc::now());
        appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, id: Uuid, patch: &AppointmentPatch) -> AppResult<Appointment> {
        let mut appointments = self.appointments.write().await;

        let index = appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;

        let mut updated = appointments[index].clone();
        patch.apply(&mut updated);

        if updated.estado.occupies_slot()
            && appointments
                .iter()
                .any(|a| a.id != id && holds_slot(a, updated.fecha, updated.hora))
        {
            return Err(AppError::Conflict(SLOT_TAKEN.to_string()));
        }

        appointments[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut appointments = self.appointments.write().await;
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        if appointments.len() == before {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let _guard = self.appointments.read().await;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Account> {
        self.accounts
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", id)))
    }

    async fn create(&self, data: NewAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email.eq_ignore_ascii_case(&data.email)) {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: data.email,
            nombre: data.nombre,
            role: data.role,
            password_hash: data.password_hash,
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", id)))?;
        account.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn list_barbers(&self) -> AppResult<Vec<Account>> {
        let mut barbers: Vec<Account> = self
            .accounts
            .read()
            .await
            .iter()
            .filter(|a| a.role == Role::Barbero)
            .cloned()
            .collect();
        barbers.sort_by(|a, b| a.nombre.cmp(&b.nombre));
        Ok(barbers)
    }
}
