//! Statistics endpoints

use axum::{extract::Query, extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, scheduling::aggregate::StatusCounts};

use super::AuthenticatedUser;

/// Statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// First day of the period (inclusive)
    pub desde: NaiveDate,
    /// Last day of the period (inclusive)
    pub hasta: NaiveDate,
    /// Number of appointments in the period, all statuses
    pub total: i64,
    /// Revenue attributed to the period
    pub revenue: i64,
    /// Mean revenue over appointments that produced any
    pub average_ticket: i64,
    /// Cancelled share, rounded percentage
    pub cancellation_rate: u32,
    pub by_status: StatusCounts,
    /// Revenue per service, highest first
    pub by_service: Vec<StatEntry>,
    /// Revenue per barber, highest first
    pub by_staff: Vec<StatEntry>,
    /// Revenue per day, chronological
    pub by_day: Vec<StatEntry>,
    /// Live appointments per weekday and hour
    pub heatmap: Vec<HeatmapCell>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatEntry {
    /// Label
    pub label: String,
    /// Value
    pub value: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HeatmapCell {
    /// 0 = Monday ... 6 = Sunday
    pub weekday: u32,
    pub hour: u32,
    pub count: i64,
}

/// Query parameters for GET /stats
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct StatsQuery {
    /// Start of the period (YYYY-MM-DD); defaults to 30 days before `hasta`
    pub desde: Option<NaiveDate>,
    /// End of the period (YYYY-MM-DD); defaults to today
    pub hasta: Option<NaiveDate>,
    /// Number of services and barbers to list (default 5, max 50)
    pub top: Option<usize>,
}

/// Get booking statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(StatsQuery),
    responses(
        (status = 200, description = "Booking statistics", body = StatsResponse),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats(&claims, &query).await?;
    Ok(Json(stats))
}
