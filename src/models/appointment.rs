//! Appointment models

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::hhmm;
use crate::{
    error::{AppError, AppResult},
    scheduling::{
        aggregate::{StatusCounts, TemporalBucket, TemporalCounts},
        classifier::TemporalState,
    },
};

/// Share of the service price charged as a deposit
pub const DEFAULT_DEPOSIT_PERCENT: u32 = 30;

/// Deposit for a price, rounded half up to whole currency units
pub fn deposit_for(precio: i32, percent: u32) -> i32 {
    let scaled = i64::from(precio) * i64::from(percent);
    ((scaled + 50).div_euclid(100)) as i32
}

// ---------------------------------------------------------------------------
// AppointmentStatus
// ---------------------------------------------------------------------------

/// Staff-controlled lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum AppointmentStatus {
    #[serde(rename = "reservado")]
    Requested,
    #[serde(rename = "confirmado")]
    Confirmed,
    #[serde(rename = "completado")]
    Completed,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Requested => "reservado",
            AppointmentStatus::Confirmed => "confirmado",
            AppointmentStatus::Completed => "completado",
            AppointmentStatus::Cancelled => "cancelado",
        }
    }

    /// Whether an appointment in this status holds its slot
    pub fn occupies_slot(&self) -> bool {
        match self {
            AppointmentStatus::Requested
            | AppointmentStatus::Confirmed
            | AppointmentStatus::Completed => true,
            AppointmentStatus::Cancelled => false,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reservado" => Ok(AppointmentStatus::Requested),
            "confirmado" => Ok(AppointmentStatus::Confirmed),
            "completado" => Ok(AppointmentStatus::Completed),
            "cancelado" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Appointment
// ---------------------------------------------------------------------------

/// A booked service occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub nombre_cliente: String,
    pub email: String,
    pub whatsapp: String,
    /// Local calendar date (YYYY-MM-DD)
    pub fecha: NaiveDate,
    /// Local start time (HH:MM)
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub hora: NaiveTime,
    pub servicio: String,
    pub servicio_id: String,
    pub precio: i32,
    /// Human readable duration, e.g. "1h 15min"
    pub duracion: String,
    pub estado: AppointmentStatus,
    pub barbero_id: Option<Uuid>,
    pub barbero_nombre: Option<String>,
    pub monto_sena: Option<i32>,
    pub sena_pagada: bool,
    pub fecha_pago_sena: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Stored deposit amount, or the one derived from the price
    pub fn deposit_amount(&self) -> i32 {
        self.monto_sena
            .unwrap_or_else(|| deposit_for(self.precio, DEFAULT_DEPOSIT_PERCENT))
    }
}

/// Database row for `appointments`
#[derive(Debug, Clone, FromRow)]
pub struct AppointmentRow {
    pub id: Uuid,
    pub nombre_cliente: String,
    pub email: String,
    pub whatsapp: String,
    pub fecha: NaiveDate,
    pub hora: String,
    pub servicio: String,
    pub servicio_id: String,
    pub precio: i32,
    pub duracion: String,
    pub estado: String,
    pub barbero_id: Option<Uuid>,
    pub barbero_nombre: Option<String>,
    pub monto_sena: Option<i32>,
    pub sena_pagada: Option<bool>,
    pub fecha_pago_sena: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = AppError;

    fn try_from(row: AppointmentRow) -> AppResult<Self> {
        let hora = hhmm::parse(&row.hora).ok_or_else(|| {
            AppError::Internal(format!("Appointment {} has invalid hora '{}'", row.id, row.hora))
        })?;
        let estado = row
            .estado
            .parse::<AppointmentStatus>()
            .map_err(|e| AppError::Internal(format!("Appointment {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            nombre_cliente: row.nombre_cliente,
            email: row.email,
            whatsapp: row.whatsapp,
            fecha: row.fecha,
            hora,
            servicio: row.servicio,
            servicio_id: row.servicio_id,
            precio: row.precio,
            duracion: row.duracion,
            estado,
            barbero_id: row.barbero_id,
            barbero_nombre: row.barbero_nombre,
            monto_sena: row.monto_sena,
            sena_pagada: row.sena_pagada.unwrap_or(false),
            fecha_pago_sena: row.fecha_pago_sena,
            created_at: row.created_at,
        })
    }
}

/// Appointment as handed to the store by the booking workflow
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub nombre_cliente: String,
    pub email: String,
    pub whatsapp: String,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub servicio: String,
    pub servicio_id: String,
    pub precio: i32,
    pub duracion: String,
    pub estado: AppointmentStatus,
    pub barbero_id: Option<Uuid>,
    pub barbero_nombre: Option<String>,
    pub monto_sena: Option<i32>,
}

impl NewAppointment {
    /// Materialize the record with store-assigned identity
    pub fn into_appointment(self, id: Uuid, created_at: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            nombre_cliente: self.nombre_cliente,
            email: self.email,
            whatsapp: self.whatsapp,
            fecha: self.fecha,
            hora: self.hora,
            servicio: self.servicio,
            servicio_id: self.servicio_id,
            precio: self.precio,
            duracion: self.duracion,
            estado: self.estado,
            barbero_id: self.barbero_id,
            barbero_nombre: self.barbero_nombre,
            monto_sena: self.monto_sena,
            sena_pagada: false,
            fecha_pago_sena: None,
            created_at,
        }
    }
}

/// Deposit fields written together
#[derive(Debug, Clone, PartialEq)]
pub struct DepositUpdate {
    pub monto_sena: i32,
    pub sena_pagada: bool,
    pub fecha_pago_sena: Option<DateTime<Utc>>,
}

/// Partial update of an appointment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPatch {
    pub estado: Option<AppointmentStatus>,
    /// `(barbero_id, barbero_nombre)`
    pub barbero: Option<(Uuid, String)>,
    pub deposit: Option<DepositUpdate>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self.estado.is_none() && self.barbero.is_none() && self.deposit.is_none()
    }

    pub fn apply(&self, appointment: &mut Appointment) {
        if let Some(estado) = self.estado {
            appointment.estado = estado;
        }
        if let Some((id, ref nombre)) = self.barbero {
            appointment.barbero_id = Some(id);
            appointment.barbero_nombre = Some(nombre.clone());
        }
        if let Some(ref deposit) = self.deposit {
            appointment.monto_sena = Some(deposit.monto_sena);
            appointment.sena_pagada = deposit.sena_pagada;
            appointment.fecha_pago_sena = deposit.fecha_pago_sena;
        }
    }
}

/// Store-level filter, all conditions combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub fecha: Option<NaiveDate>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
    pub barbero_id: Option<Uuid>,
    pub estado: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn on(fecha: NaiveDate) -> Self {
        Self {
            fecha: Some(fecha),
            ..Self::default()
        }
    }

    pub fn between(desde: NaiveDate, hasta: NaiveDate) -> Self {
        Self {
            desde: Some(desde),
            hasta: Some(hasta),
            ..Self::default()
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.fecha.map_or(true, |f| appointment.fecha == f)
            && self.desde.map_or(true, |d| appointment.fecha >= d)
            && self.hasta.map_or(true, |h| appointment.fecha <= h)
            && self.barbero_id.map_or(true, |b| appointment.barbero_id == Some(b))
            && self.estado.map_or(true, |e| appointment.estado == e)
    }
}

// ---------------------------------------------------------------------------
// Dashboard DTOs
// ---------------------------------------------------------------------------

/// Query parameters for the appointment dashboard
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AppointmentQuery {
    /// Temporal bucket (all, in_progress, today, upcoming, past)
    pub bucket: Option<TemporalBucket>,
    /// Exact date (YYYY-MM-DD)
    pub fecha: Option<NaiveDate>,
    /// Range start (YYYY-MM-DD, inclusive)
    pub desde: Option<NaiveDate>,
    /// Range end (YYYY-MM-DD, inclusive)
    pub hasta: Option<NaiveDate>,
    pub barbero_id: Option<Uuid>,
    pub estado: Option<AppointmentStatus>,
}

impl AppointmentQuery {
    pub fn to_filter(&self) -> AppointmentFilter {
        AppointmentFilter {
            fecha: self.fecha,
            desde: self.desde,
            hasta: self.hasta,
            barbero_id: self.barbero_id,
            estado: self.estado,
        }
    }
}

/// Appointment with its computed temporal state
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub temporal_state: TemporalState,
}

/// Dashboard header counters
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentSummary {
    pub by_status: StatusCounts,
    pub by_temporal_state: TemporalCounts,
}

/// Update status request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatus {
    pub estado: AppointmentStatus,
}

/// Update deposit request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeposit {
    pub sena_pagada: bool,
}

/// Assign staff request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignStaff {
    pub barbero_id: Uuid,
}
