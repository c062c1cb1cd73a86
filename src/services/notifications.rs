//! Client notifications (booking confirmations and status changes)

use std::{str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use serde::Serialize;

use crate::{
    config::{NotificationBackend, NotificationsConfig},
    error::{AppError, AppResult},
    models::{hhmm, Appointment},
};

/// Which message to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Sent to the client right after booking
    BookingRequested,
    /// Copy of a new booking for the shop
    BookingAdminCopy,
    BookingConfirmed,
    BookingCancelled,
}

/// Values interpolated into the templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateData {
    pub business_name: String,
    pub nombre_cliente: String,
    pub email: String,
    pub whatsapp: String,
    pub servicio: String,
    pub fecha: NaiveDate,
    pub hora: String,
    pub precio: i32,
    pub monto_sena: Option<i32>,
    pub barbero_nombre: Option<String>,
}

impl TemplateData {
    pub fn from_appointment(business_name: &str, appointment: &Appointment) -> Self {
        Self {
            business_name: business_name.to_string(),
            nombre_cliente: appointment.nombre_cliente.clone(),
            email: appointment.email.clone(),
            whatsapp: appointment.whatsapp.clone(),
            servicio: appointment.servicio.clone(),
            fecha: appointment.fecha,
            hora: hhmm::format(&appointment.hora),
            precio: appointment.precio,
            monto_sena: appointment.monto_sena,
            barbero_nombre: appointment.barbero_nombre.clone(),
        }
    }
}

/// Render subject and plain-text body
pub fn render(kind: TemplateKind, data: &TemplateData) -> (String, String) {
    let when = format!("{} at {}", data.fecha.format("%d/%m/%Y"), data.hora);
    let barber = data
        .barbero_nombre
        .as_deref()
        .map(|b| format!("\nBarber: {}", b))
        .unwrap_or_default();

    match kind {
        TemplateKind::BookingRequested => (
            format!("{} - Booking received", data.business_name),
            format!(
                r#"
Hi {name},

We received your booking for {service} on {when}.{barber}

Price: ${price}
Deposit to confirm: ${deposit}

We will confirm your appointment shortly. Reply to this message if you need to change it.
"#,
                name = data.nombre_cliente,
                service = data.servicio,
                when = when,
                barber = barber,
                price = data.precio,
                deposit = data.monto_sena.unwrap_or(0),
            ),
        ),
        TemplateKind::BookingAdminCopy => (
            format!("New booking: {} - {}", data.servicio, when),
            format!(
                r#"
New booking for {service} on {when}.{barber}

Client: {name}
Email: {email}
WhatsApp: {whatsapp}
"#,
                service = data.servicio,
                when = when,
                barber = barber,
                name = data.nombre_cliente,
                email = data.email,
                whatsapp = data.whatsapp,
            ),
        ),
        TemplateKind::BookingConfirmed => (
            format!("{} - Appointment confirmed", data.business_name),
            format!(
                r#"
Hi {name},

Your appointment for {service} on {when} is confirmed.{barber}

See you soon!
"#,
                name = data.nombre_cliente,
                service = data.servicio,
                when = when,
                barber = barber,
            ),
        ),
        TemplateKind::BookingCancelled => (
            format!("{} - Appointment cancelled", data.business_name),
            format!(
                r#"
Hi {name},

Your appointment for {service} on {when} has been cancelled.

You can book a new time on our website whenever you like.
"#,
                name = data.nombre_cliente,
                service = data.servicio,
                when = when,
            ),
        ),
    }
}

/// Outgoing notification channel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, kind: TemplateKind, data: &TemplateData) -> AppResult<()>;
}

/// Send and swallow failures; the caller's outcome never depends on delivery
pub async fn notify_best_effort(notifier: &dyn Notifier, to: &str, kind: TemplateKind, data: &TemplateData) {
    match notifier.send(to, kind, data).await {
        Ok(()) => tracing::debug!(to, ?kind, "Notification sent"),
        Err(e) => tracing::warn!(to, ?kind, error = %e, "Notification failed"),
    }
}

/// Build the configured notifier
pub fn from_config(config: &NotificationsConfig) -> AppResult<Arc<dyn Notifier>> {
    Ok(match config.backend {
        NotificationBackend::Log => Arc::new(LogNotifier),
        NotificationBackend::Http => Arc::new(HttpNotifier::new(config.clone())?),
        NotificationBackend::Smtp => Arc::new(SmtpNotifier::new(config.clone())),
    })
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Development notifier: renders and logs
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, kind: TemplateKind, data: &TemplateData) -> AppResult<()> {
        let (subject, body) = render(kind, data);
        tracing::info!(to, subject = %subject, "Notification (log backend)\n{}", body.trim());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HttpEmailRequest<'a> {
    from: String,
    to: &'a str,
    subject: String,
    text: String,
    html: String,
    template: TemplateKind,
    data: &'a TemplateData,
}

/// Transactional e-mail API reached over HTTPS
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
    config: NotificationsConfig,
}

impl HttpNotifier {
    pub fn new(config: NotificationsConfig) -> AppResult<Self> {
        let endpoint = config
            .http_endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::Internal("notifications.http_endpoint is required".to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint, config })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, to: &str, kind: TemplateKind, data: &TemplateData) -> AppResult<()> {
        let (subject, text) = render(kind, data);
        let payload = HttpEmailRequest {
            from: sender(&self.config),
            to,
            subject,
            html: html_body(&text),
            text,
            template: kind,
            data,
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(ref key) = self.config.http_api_key {
            request = request.bearer_auth(key);
        }

        request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Notification(format!("Email API request failed: {}", e)))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SMTP
// ---------------------------------------------------------------------------

pub struct SmtpNotifier {
    config: NotificationsConfig,
}

impl SmtpNotifier {
    pub fn new(config: NotificationsConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> AppResult<Message> {
        let from_mailbox = Mailbox::from_str(&sender(&self.config))
            .map_err(|e| AppError::Notification(format!("Invalid from address: {}", e)))?;
        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Notification(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(body)),
                    ),
            )
            .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Notification(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port)
        .timeout(Some(Duration::from_secs(self.config.timeout_secs)));

        let builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, to: &str, kind: TemplateKind, data: &TemplateData) -> AppResult<()> {
        let (subject, body) = render(kind, data);
        let email = self.build_message(to, &subject, &body)?;
        let mailer = self.transport()?;

        // SmtpTransport blocks on network I/O
        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(format!("SMTP task failed: {}", e)))?
            .map_err(|e| AppError::Notification(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

fn sender(config: &NotificationsConfig) -> String {
    match config.from_name.as_deref() {
        Some(name) => format!("{} <{}>", name, config.from_address),
        None => config.from_address.clone(),
    }
}

fn html_body(text: &str) -> String {
    format!(
        r#"<html><body><p>{}</p></body></html>"#,
        text.trim().replace('\n', "<br>")
    )
}
