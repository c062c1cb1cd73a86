//! Repository layer: persistence collaborators behind traits
//!
//! Services only see [`AppointmentStore`] and [`AccountStore`]; the Postgres
//! implementations back production and the in-memory ones back development
//! runs and tests.

pub mod accounts;
pub mod appointments;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        account::{Account, NewAccount},
        Appointment, AppointmentFilter, AppointmentPatch, NewAppointment,
    },
};

/// Message returned when a slot is already taken
pub const SLOT_TAKEN: &str = "The selected time slot is no longer available. Please choose another time.";

/// Appointment persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Appointments matching `filter`, ordered by (fecha, hora)
    async fn list(&self, filter: &AppointmentFilter) -> AppResult<Vec<Appointment>>;

    async fn get(&self, id: Uuid) -> AppResult<Appointment>;

    /// Non-cancelled appointment holding (fecha, hora), if any
    async fn find_at(&self, fecha: NaiveDate, hora: NaiveTime) -> AppResult<Option<Appointment>>;

    /// Insert atomically; `Conflict` if a non-cancelled appointment holds the slot
    async fn insert(&self, appointment: NewAppointment) -> AppResult<Appointment>;

    async fn update(&self, id: Uuid, patch: &AppointmentPatch) -> AppResult<Appointment>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Cheap read used by the health probe
    async fn ping(&self) -> AppResult<()>;
}

/// Staff account persistence
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Account>;

    /// `Conflict` if the e-mail is already registered
    async fn create(&self, account: NewAccount) -> AppResult<Account>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Accounts with the barber role, ordered by name
    async fn list_barbers(&self) -> AppResult<Vec<Account>>;
}

/// Main repository struct holding the stores
#[derive(Clone)]
pub struct Repository {
    pub appointments: Arc<dyn AppointmentStore>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            appointments: Arc::new(appointments::PgAppointmentStore::new(pool.clone())),
            accounts: Arc::new(accounts::PgAccountStore::new(pool)),
        }
    }

    /// Create a repository that keeps everything in process memory
    pub fn in_memory() -> Self {
        Self {
            appointments: Arc::new(memory::MemoryAppointmentStore::default()),
            accounts: Arc::new(memory::MemoryAccountStore::default()),
        }
    }
}
