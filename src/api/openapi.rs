//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{appointments, auth, bookings, catalog, health, stats};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Barberia API",
        version = "0.3.0",
        description = "Appointment booking and staff dashboard for a barbershop",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Catalog
        catalog::list_services,
        catalog::list_staff,
        catalog::get_availability,
        // Bookings
        bookings::create_booking,
        // Auth
        auth::sign_in,
        auth::sign_up,
        auth::sign_out,
        auth::session,
        auth::update_password,
        // Appointments
        appointments::list_appointments,
        appointments::summary,
        appointments::get_appointment,
        appointments::update_status,
        appointments::update_deposit,
        appointments::assign_staff,
        appointments::delete_appointment,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Catalog
            crate::models::ServiceOffering,
            crate::models::StaffMember,
            catalog::AvailabilityQuery,
            crate::services::schedules::DayAvailability,
            crate::scheduling::availability::SlotAvailability,
            crate::scheduling::availability::ConflictRule,
            // Bookings
            crate::models::BookingRequest,
            crate::models::BookingOutcome,
            crate::services::booking::BookingStep,
            // Auth
            crate::models::account::SignInRequest,
            crate::models::account::SignUpRequest,
            crate::models::account::UpdatePasswordRequest,
            crate::models::account::SessionResponse,
            crate::models::account::SessionInfo,
            crate::models::Role,
            // Appointments
            crate::models::Appointment,
            crate::models::AppointmentStatus,
            crate::models::appointment::AppointmentQuery,
            crate::models::appointment::AppointmentView,
            crate::models::appointment::AppointmentSummary,
            crate::models::appointment::UpdateStatus,
            crate::models::appointment::UpdateDeposit,
            crate::models::appointment::AssignStaff,
            crate::scheduling::classifier::TemporalState,
            crate::scheduling::aggregate::TemporalBucket,
            crate::scheduling::aggregate::StatusCounts,
            crate::scheduling::aggregate::TemporalCounts,
            // Stats
            stats::StatsResponse,
            stats::StatEntry,
            stats::HeatmapCell,
            stats::StatsQuery,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "catalog", description = "Services, barbers and free slots"),
        (name = "bookings", description = "Public booking"),
        (name = "auth", description = "Staff authentication"),
        (name = "appointments", description = "Staff dashboard"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
