//! Public catalog endpoints (services, barbers, free slots)

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{ServiceOffering, StaffMember},
    scheduling::availability::ConflictRule,
    services::schedules::DayAvailability,
};

/// Query parameters for GET /availability
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Day to list (YYYY-MM-DD)
    pub fecha: NaiveDate,
    /// Conflict rule (exact_match, window); defaults to exact_match
    pub rule: Option<ConflictRule>,
}

/// List bookable services
#[utoipa::path(
    get,
    path = "/services",
    tag = "catalog",
    responses(
        (status = 200, description = "Service catalog", body = Vec<ServiceOffering>)
    )
)]
pub async fn list_services(State(state): State<crate::AppState>) -> Json<Vec<ServiceOffering>> {
    Json(state.services.booking.catalog().to_vec())
}

/// List barbers
#[utoipa::path(
    get,
    path = "/staff",
    tag = "catalog",
    responses(
        (status = 200, description = "Barbers", body = Vec<StaffMember>)
    )
)]
pub async fn list_staff(State(state): State<crate::AppState>) -> AppResult<Json<Vec<StaffMember>>> {
    let staff = state.services.auth.list_staff().await?;
    Ok(Json(staff))
}

/// Slots of a day with their availability
#[utoipa::path(
    get,
    path = "/availability",
    tag = "catalog",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Slots of the day", body = DayAvailability),
        (status = 400, description = "Invalid date")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<DayAvailability>> {
    let schedules = &state.services.schedules;
    let day = schedules
        .availability(query.fecha, query.rule.unwrap_or_default(), schedules.now())
        .await?;
    Ok(Json(day))
}
