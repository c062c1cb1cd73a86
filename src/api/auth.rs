//! Staff authentication endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::account::{
        SessionInfo, SessionResponse, SignInRequest, SignUpRequest, UpdatePasswordRequest,
    },
};

use super::AuthenticatedUser;

/// Sign in with e-mail and password
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Session opened", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn sign_in(
    State(state): State<crate::AppState>,
    Json(request): Json<SignInRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.services.auth.sign_in(&request).await?;
    Ok(Json(session))
}

/// Create a barber account
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Sign-up disabled"),
        (status = 409, description = "E-mail already registered")
    )
)]
pub async fn sign_up(
    State(state): State<crate::AppState>,
    Json(request): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let session = state.services.auth.sign_up(&request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Signed out")
    )
)]
pub async fn sign_out(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> StatusCode {
    state.services.auth.sign_out(&claims);
    StatusCode::NO_CONTENT
}

/// Current session, null when not signed in
#[utoipa::path(
    get,
    path = "/auth/session",
    tag = "auth",
    responses(
        (status = 200, description = "Session, or null when not signed in", body = SessionInfo)
    )
)]
pub async fn session(
    State(state): State<crate::AppState>,
    user: Option<AuthenticatedUser>,
) -> AppResult<Json<Option<SessionInfo>>> {
    let Some(AuthenticatedUser(claims)) = user else {
        return Ok(Json(None));
    };
    let session = state.services.auth.get_session(&claims).await?;
    Ok(Json(session))
}

/// Change the signed-in account's password
#[utoipa::path(
    put,
    path = "/auth/password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdatePasswordRequest,
    responses(
        (status = 204, description = "Password updated"),
        (status = 400, description = "Password too short or confirmation mismatch")
    )
)]
pub async fn update_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdatePasswordRequest>,
) -> AppResult<StatusCode> {
    state.services.auth.update_password(&claims, &request).await?;
    Ok(StatusCode::NO_CONTENT)
}
