//! Staff dashboard endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        appointment::{
            AppointmentQuery, AppointmentSummary, AppointmentView, AssignStaff, UpdateDeposit,
            UpdateStatus,
        },
        Appointment,
    },
};

use super::AuthenticatedUser;

/// List appointments, optionally narrowed to a temporal bucket
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Appointments ordered by date and time", body = Vec<AppointmentView>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Another barber's appointments")
    )
)]
pub async fn list_appointments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<Vec<AppointmentView>>> {
    let appointments = state.services.appointments.list(&claims, &query).await?;
    Ok(Json(appointments))
}

/// Counts by status and temporal state
#[utoipa::path(
    get,
    path = "/appointments/summary",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(AppointmentQuery),
    responses(
        (status = 200, description = "Dashboard counters", body = AppointmentSummary)
    )
)]
pub async fn summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<AppointmentSummary>> {
    let summary = state.services.appointments.summary(&claims, &query).await?;
    Ok(Json(summary))
}

/// Get one appointment
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = AppointmentView),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AppointmentView>> {
    let appointment = state.services.appointments.get(&claims, id).await?;
    Ok(Json(appointment))
}

/// Change the lifecycle status
#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateStatus,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 409, description = "Re-activation collides with another booking")
    )
)]
pub async fn update_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatus>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .appointments
        .update_status(&claims, id, request.estado)
        .await?;
    Ok(Json(appointment))
}

/// Mark the deposit paid or unpaid
#[utoipa::path(
    put,
    path = "/appointments/{id}/deposit",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateDeposit,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment)
    )
)]
pub async fn update_deposit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDeposit>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .appointments
        .set_deposit(&claims, id, request.sena_pagada)
        .await?;
    Ok(Json(appointment))
}

/// Assign a barber
#[utoipa::path(
    put,
    path = "/appointments/{id}/staff",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = AssignStaff,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn assign_staff(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignStaff>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .appointments
        .assign_staff(&claims, id, request.barbero_id)
        .await?;
    Ok(Json(appointment))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn delete_appointment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.appointments.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
