//! Barberia booking server
//!
//! Public booking flow for a single barbershop (service catalog, free slots,
//! three-step booking wizard) plus a staff dashboard with lifecycle changes,
//! deposits and statistics, served as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
