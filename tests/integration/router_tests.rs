//! Router tests against the in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use barberia_server::{
    api,
    config::AppConfig,
    error::{AppError, AppResult},
    models::{Appointment, AppointmentFilter, AppointmentPatch, NewAppointment},
    repository::{AppointmentStore, Repository},
    scheduling::slots::BusinessHours,
    services::{notifications::LogNotifier, Services},
    AppState,
};

const ADMIN_EMAIL: &str = "admin@barberia.local";
const ADMIN_PASSWORD: &str = "admin-pass";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.bootstrap_admin_email = Some(ADMIN_EMAIL.to_string());
    config.auth.bootstrap_admin_password = Some(ADMIN_PASSWORD.to_string());
    config
}

async fn app_with(repository: Repository) -> Router {
    let config = test_config();
    let services = Services::with_notifier(repository, &config, Arc::new(LogNotifier)).unwrap();
    services.auth.bootstrap_admin().await.unwrap();
    api::router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn app() -> Router {
    app_with(Repository::in_memory()).await
}

/// An open day a week ahead
fn open_day() -> NaiveDate {
    let hours = BusinessHours::default();
    let mut day = hours.now_local().date() + Duration::days(7);
    while hours.is_closed(day) {
        day = day + Duration::days(1);
    }
    day
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn with_json(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn booking(fecha: NaiveDate, hora: &str) -> Value {
    json!({
        "servicio_id": "corte-personalizado",
        "fecha": fecha.to_string(),
        "hora": hora,
        "nombre_cliente": "Juan Pérez",
        "email": "juan@x.com",
        "whatsapp": "1122334455"
    })
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        with_json(
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_connected_store() {
    let app = app().await;
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
}

/// Store whose every call fails
struct UnreachableStore;

#[async_trait]
impl AppointmentStore for UnreachableStore {
    async fn list(&self, _: &AppointmentFilter) -> AppResult<Vec<Appointment>> {
        Err(AppError::Internal("store unreachable".into()))
    }
    async fn get(&self, _: Uuid) -> AppResult<Appointment> {
        Err(AppError::Internal("store unreachable".into()))
    }
    async fn find_at(&self, _: NaiveDate, _: NaiveTime) -> AppResult<Option<Appointment>> {
        Err(AppError::Internal("store unreachable".into()))
    }
    async fn insert(&self, _: NewAppointment) -> AppResult<Appointment> {
        Err(AppError::Internal("store unreachable".into()))
    }
    async fn update(&self, _: Uuid, _: &AppointmentPatch) -> AppResult<Appointment> {
        Err(AppError::Internal("store unreachable".into()))
    }
    async fn delete(&self, _: Uuid) -> AppResult<()> {
        Err(AppError::Internal("store unreachable".into()))
    }
    async fn ping(&self) -> AppResult<()> {
        Err(AppError::Internal("store unreachable".into()))
    }
}

#[tokio::test]
async fn health_fails_when_store_is_down() {
    let mut repository = Repository::in_memory();
    repository.appointments = Arc::new(UnreachableStore);
    let app = app_with(repository).await;

    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["database"], "disconnected");

    // booking surfaces a generic failure
    let (status, body) = send(
        &app,
        with_json(Method::POST, "/api/v1/bookings", None, booking(open_day(), "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn catalog_and_availability() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/v1/services", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let fecha = open_day();
    let (status, body) = send(&app, get(&format!("/api/v1/availability?fecha={}", fecha), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closed"], false);
    assert_eq!(body["rule"], "exact_match");
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 20);
    assert_eq!(slots[0]["hora"], "10:00");
    assert_eq!(slots[19]["hora"], "19:30");

    let (status, _) = send(&app, get("/api/v1/availability?fecha=2025-13-40", None)).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn booking_then_conflict() {
    let app = app().await;
    let fecha = open_day();

    let (status, body) = send(
        &app,
        with_json(Method::POST, "/api/v1/bookings", None, booking(fecha, "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["appointment"]["estado"], "reservado");
    assert_eq!(body["appointment"]["precio"], 28000);
    assert_eq!(body["appointment"]["duracion"], "45 min");
    assert_eq!(body["appointment"]["hora"], "10:00");
    assert_eq!(body["appointment"]["monto_sena"], 8400);
    assert_eq!(body["redirect_after_ms"], 3000);
    assert!(body["message"].as_str().unwrap().contains("booked"));

    let (status, body) = send(
        &app,
        with_json(Method::POST, "/api/v1/bookings", None, booking(fecha, "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SlotTaken");

    let (_, body) = send(&app, get(&format!("/api/v1/availability?fecha={}", fecha), None)).await;
    let taken = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["hora"] == "10:00")
        .unwrap();
    assert_eq!(taken["available"], false);
}

#[tokio::test]
async fn booking_rejects_times_not_offered() {
    let app = app().await;
    let fecha = open_day();

    for hora in ["10:15", "09:30", "20:00"] {
        let (status, body) = send(
            &app,
            with_json(Method::POST, "/api/v1/bookings", None, booking(fecha, hora)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "hora {}", hora);
        assert_eq!(body["error"], "BadValue");
    }

    let mut missing_contact = booking(fecha, "11:00");
    missing_contact["email"] = json!("not-an-email");
    let (status, _) = send(
        &app,
        with_json(Method::POST, "/api/v1/bookings", None, missing_contact),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_requires_a_session() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/v1/appointments", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "NotAuthorized");

    let (status, _) = send(&app, get("/api/v1/appointments", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/api/v1/auth/session", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn staff_manage_an_appointment() {
    let app = app().await;
    let token = admin_token(&app).await;
    let fecha = open_day();

    let (_, created) = send(
        &app,
        with_json(Method::POST, "/api/v1/bookings", None, booking(fecha, "16:30")),
    )
    .await;
    let id = created["appointment"]["id"].as_str().unwrap().to_string();

    let (status, session) = send(&app, get("/api/v1/auth/session", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["role"], "admin");

    let (status, list) = send(&app, get("/api/v1/appointments?bucket=upcoming", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["temporal_state"], "upcoming");

    let (status, updated) = send(
        &app,
        with_json(
            Method::PUT,
            &format!("/api/v1/appointments/{}/status", id),
            Some(&token),
            json!({ "estado": "confirmado" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["estado"], "confirmado");

    let (status, paid) = send(
        &app,
        with_json(
            Method::PUT,
            &format!("/api/v1/appointments/{}/deposit", id),
            Some(&token),
            json!({ "sena_pagada": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["sena_pagada"], true);

    let (status, summary) = send(&app, get("/api/v1/appointments/summary", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["by_status"]["confirmado"], 1);
    assert_eq!(summary["by_temporal_state"]["upcoming"], 1);

    let (status, stats) = send(
        &app,
        get(
            &format!("/api/v1/stats?desde={}&hasta={}", fecha, fecha),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["revenue"], 8400);

    let (status, _) = send(
        &app,
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/appointments/{}", id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/v1/appointments/{}", id), Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sign_up_is_disabled_by_default() {
    let app = app().await;
    let (status, _) = send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/auth/sign-up",
            None,
            json!({
                "email": "leo@barberia.local",
                "nombre": "Leo",
                "password": "tijeras",
                "password_confirmation": "tijeras"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
