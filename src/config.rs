//! Configuration management for Barberia server

use chrono::Weekday;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::models::service::ServiceOffering;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL. Leave empty to run on the in-memory store.
    #[serde(default)]
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Whether `POST /auth/sign-up` accepts new barber accounts
    #[serde(default)]
    pub allow_signup: bool,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

/// Opening hours policy used by the slot generator
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessConfig {
    pub name: String,
    /// First slot start hour (inclusive)
    pub open_hour: u32,
    /// Closing hour (exclusive)
    pub close_hour: u32,
    /// Weekly closed day ("sun", "mon", ...)
    pub closed_weekday: Option<String>,
    /// Offset of the shop's local time from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Deposit as a percentage of the service price
    pub deposit_percent: u32,
    /// Delay before the booking page navigates away after success
    pub redirect_after_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    /// Write notifications to the log only
    Log,
    /// Transactional e-mail API over HTTPS
    Http,
    /// Direct SMTP delivery
    Smtp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    pub backend: NotificationBackend,
    pub from_address: String,
    pub from_name: Option<String>,
    /// Address receiving a copy of every new booking
    pub admin_copy: Option<String>,
    pub timeout_secs: u64,
    // HTTP backend
    pub http_endpoint: Option<String>,
    pub http_api_key: Option<String>,
    // SMTP backend
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_use_tls: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default = "ServiceOffering::reference_catalog")]
    pub catalog: Vec<ServiceOffering>,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix BARBERIA_)
            .add_source(
                Environment::with_prefix("BARBERIA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl BusinessConfig {
    /// Parsed closed weekday, `None` when the shop opens every day
    pub fn closed_weekday(&self) -> Result<Option<Weekday>, ConfigError> {
        match self.closed_weekday.as_deref() {
            None | Some("") => Ok(None),
            Some(day) => day
                .parse::<Weekday>()
                .map(Some)
                .map_err(|_| ConfigError::Message(format!("Invalid closed_weekday: {}", day))),
        }
    }
}

fn default_min_password_length() -> usize {
    6
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            jwt_expiration_hours: 24,
            min_password_length: default_min_password_length(),
            allow_signup: false,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: "Barberia".to_string(),
            open_hour: 10,
            close_hour: 20,
            closed_weekday: Some("sun".to_string()),
            utc_offset_minutes: -180,
            deposit_percent: 30,
            redirect_after_ms: 3000,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            backend: NotificationBackend::Log,
            from_address: "turnos@barberia.local".to_string(),
            from_name: Some("Barberia".to_string()),
            admin_copy: None,
            timeout_secs: 10,
            http_endpoint: None,
            http_api_key: None,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_use_tls: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            business: BusinessConfig::default(),
            notifications: NotificationsConfig::default(),
            catalog: ServiceOffering::reference_catalog(),
        }
    }
}
