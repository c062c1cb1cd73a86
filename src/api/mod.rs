//! API handlers for the Barberia REST endpoints

pub mod appointments;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod openapi;
pub mod stats;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::SessionClaims, AppState};

/// Extractor for authenticated staff from JWT token
pub struct AuthenticatedUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = SessionClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Build the application router: `/health` at the root, the rest under `/api/v1`
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Public booking surface
        .route("/services", get(catalog::list_services))
        .route("/staff", get(catalog::list_staff))
        .route("/availability", get(catalog::get_availability))
        .route("/bookings", post(bookings::create_booking))
        // Authentication
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/auth/session", get(auth::session))
        .route("/auth/password", put(auth::update_password))
        // Dashboard
        .route("/appointments", get(appointments::list_appointments))
        .route("/appointments/summary", get(appointments::summary))
        .route("/appointments/:id", get(appointments::get_appointment))
        .route("/appointments/:id", delete(appointments::delete_appointment))
        .route("/appointments/:id/status", put(appointments::update_status))
        .route("/appointments/:id/deposit", put(appointments::update_deposit))
        .route("/appointments/:id/staff", put(appointments::assign_staff))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health_check))
        .with_state(state)
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
