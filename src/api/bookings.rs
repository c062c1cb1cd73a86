//! Public booking endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{BookingOutcome, BookingRequest},
};

/// Book an appointment
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Appointment booked", body = BookingOutcome),
        (status = 400, description = "Invalid request or time not offered"),
        (status = 409, description = "Time slot already taken")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    Json(request): Json<BookingRequest>,
) -> AppResult<(StatusCode, Json<BookingOutcome>)> {
    let outcome = state.services.booking.book(&request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
