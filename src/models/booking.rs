//! Booking request and outcome models

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{hhmm, Appointment};

/// Client contact fields collected on the last wizard step
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ContactDetails {
    pub nombre_cliente: String,
    pub email: String,
    pub whatsapp: String,
}

impl ContactDetails {
    /// All three fields are non-empty once trimmed
    pub fn is_complete(&self) -> bool {
        [&self.nombre_cliente, &self.email, &self.whatsapp]
            .iter()
            .all(|f| !f.trim().is_empty())
    }

    pub fn trimmed(&self) -> Self {
        Self {
            nombre_cliente: self.nombre_cliente.trim().to_string(),
            email: self.email.trim().to_string(),
            whatsapp: self.whatsapp.trim().to_string(),
        }
    }
}

/// Public booking request (the whole wizard in one call)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookingRequest {
    #[validate(length(min = 1))]
    pub servicio_id: String,
    pub fecha: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "10:00")]
    pub hora: NaiveTime,
    pub barbero_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120))]
    pub nombre_cliente: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 32))]
    pub whatsapp: String,
}

impl BookingRequest {
    pub fn contact(&self) -> ContactDetails {
        ContactDetails {
            nombre_cliente: self.nombre_cliente.clone(),
            email: self.email.clone(),
            whatsapp: self.whatsapp.clone(),
        }
    }
}

/// Result of a successful submit
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingOutcome {
    pub appointment: Appointment,
    /// User-facing success message
    pub message: String,
    /// Delay before the client navigates back to the landing page
    pub redirect_after_ms: u64,
}
