//! Booking workflow: the three-step wizard and its submit

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    config::{AppConfig, BusinessConfig},
    error::{AppError, AppResult},
    models::{
        appointment::deposit_for, hhmm, service::find_offering, Appointment, AppointmentStatus,
        BookingOutcome, BookingRequest, ContactDetails, NewAppointment, ServiceOffering,
        StaffMember,
    },
    repository::{Repository, SLOT_TAKEN},
    scheduling::availability::ConflictRule,
    services::{
        auth::AuthService,
        notifications::{notify_best_effort, Notifier, TemplateData, TemplateKind},
        schedules::{DayAvailability, SchedulesService},
    },
};

/// Shown once the appointment is stored
pub const BOOKING_SUCCESS: &str =
    "Your appointment has been booked! We will contact you shortly to confirm it.";

/// Wizard position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    #[default]
    SelectingService,
    SelectingDateTime,
    ConfirmingDetails,
}

/// Client-side booking state, one per session
#[derive(Debug, Clone, Default)]
pub struct BookingWizard {
    step: BookingStep,
    service: Option<ServiceOffering>,
    fecha: Option<NaiveDate>,
    hora: Option<NaiveTime>,
    barbero: Option<StaffMember>,
    contact: ContactDetails,
}

impl BookingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn service(&self) -> Option<&ServiceOffering> {
        self.service.as_ref()
    }

    pub fn selected_slot(&self) -> Option<(NaiveDate, NaiveTime)> {
        self.fecha.zip(self.hora)
    }

    fn expect_step(&self, expected: BookingStep) -> AppResult<()> {
        if self.step != expected {
            return Err(AppError::Validation(format!(
                "Booking is at step {:?}, expected {:?}",
                self.step, expected
            )));
        }
        Ok(())
    }

    /// Step 1 → 2
    pub fn select_service(&mut self, service: ServiceOffering) -> AppResult<()> {
        self.expect_step(BookingStep::SelectingService)?;
        self.service = Some(service);
        self.step = BookingStep::SelectingDateTime;
        Ok(())
    }

    /// Step 2 → 3; `day` is the availability the client was shown
    pub fn select_date_time(&mut self, day: &DayAvailability, hora: NaiveTime) -> AppResult<()> {
        self.expect_step(BookingStep::SelectingDateTime)?;

        match day.slot(hora) {
            None => Err(AppError::Validation(format!(
                "{} on {} is not a bookable time",
                hhmm::format(&hora),
                day.fecha
            ))),
            Some(slot) if !slot.available => Err(AppError::Conflict(SLOT_TAKEN.to_string())),
            Some(_) => {
                self.fecha = Some(day.fecha);
                self.hora = Some(hora);
                self.step = BookingStep::ConfirmingDetails;
                Ok(())
            }
        }
    }

    /// Optional barber preference, before or after picking the slot
    pub fn select_staff(&mut self, barbero: Option<StaffMember>) -> AppResult<()> {
        if self.step == BookingStep::SelectingService {
            return Err(AppError::Validation("Select a service first".to_string()));
        }
        self.barbero = barbero;
        Ok(())
    }

    pub fn set_contact(&mut self, contact: ContactDetails) -> AppResult<()> {
        self.expect_step(BookingStep::ConfirmingDetails)?;
        self.contact = contact;
        Ok(())
    }

    /// One step back; the slot is cleared when leaving the confirmation step
    pub fn go_back(&mut self) -> BookingStep {
        self.step = match self.step {
            BookingStep::SelectingService => BookingStep::SelectingService,
            BookingStep::SelectingDateTime => BookingStep::SelectingService,
            BookingStep::ConfirmingDetails => {
                self.hora = None;
                BookingStep::SelectingDateTime
            }
        };
        self.step
    }

    pub fn can_submit(&self) -> bool {
        self.step == BookingStep::ConfirmingDetails
            && self.service.is_some()
            && self.fecha.is_some()
            && self.hora.is_some()
            && self.contact.is_complete()
    }

    /// Appointment to insert, estado `reservado`
    pub fn draft(&self, deposit_percent: u32) -> AppResult<NewAppointment> {
        let (Some(service), Some(fecha), Some(hora)) = (&self.service, self.fecha, self.hora) else {
            return Err(AppError::Validation(
                "Select a service, date and time before submitting".to_string(),
            ));
        };
        if !self.can_submit() {
            return Err(AppError::Validation(
                "Name, email and WhatsApp are required".to_string(),
            ));
        }

        let contact = self.contact.trimmed();
        Ok(NewAppointment {
            nombre_cliente: contact.nombre_cliente,
            email: contact.email,
            whatsapp: contact.whatsapp,
            fecha,
            hora,
            servicio: service.nombre.clone(),
            servicio_id: service.id.clone(),
            precio: service.precio,
            duracion: service.duracion.clone(),
            estado: AppointmentStatus::Requested,
            barbero_id: self.barbero.as_ref().map(|b| b.id),
            barbero_nombre: self.barbero.as_ref().map(|b| b.nombre.clone()),
            monto_sena: Some(deposit_for(service.precio, deposit_percent)),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone)]
pub struct BookingService {
    repository: Repository,
    schedules: SchedulesService,
    auth: AuthService,
    notifier: Arc<dyn Notifier>,
    catalog: Arc<Vec<ServiceOffering>>,
    business: BusinessConfig,
    admin_copy: Option<String>,
}

impl BookingService {
    pub fn new(
        repository: Repository,
        schedules: SchedulesService,
        auth: AuthService,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            repository,
            schedules,
            auth,
            notifier,
            catalog: Arc::new(config.catalog.clone()),
            business: config.business.clone(),
            admin_copy: config.notifications.admin_copy.clone().filter(|a| !a.is_empty()),
        }
    }

    pub fn catalog(&self) -> &[ServiceOffering] {
        &self.catalog
    }

    pub fn find_service(&self, id: &str) -> AppResult<ServiceOffering> {
        find_offering(&self.catalog, id)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("Unknown service '{}'", id)))
    }

    /// Fetch the day's slots and move the wizard to the confirmation step
    pub async fn choose_date_time(
        &self,
        wizard: &mut BookingWizard,
        fecha: NaiveDate,
        hora: NaiveTime,
    ) -> AppResult<()> {
        let day = self
            .schedules
            .availability(fecha, ConflictRule::ExactMatch, self.schedules.now())
            .await?;
        wizard.select_date_time(&day, hora)
    }

    /// Check the slot again, insert, notify
    ///
    /// On any error the wizard is left untouched so the client can retry or
    /// go back and pick another time. Notifications are sent from a detached
    /// task, so a slow provider never delays the outcome.
    pub async fn submit(&self, wizard: &mut BookingWizard) -> AppResult<BookingOutcome> {
        let draft = wizard.draft(self.business.deposit_percent)?;

        if draft.fecha.and_time(draft.hora) <= self.schedules.now() {
            return Err(AppError::Validation(
                "The selected time has already passed".to_string(),
            ));
        }

        if let Some(existing) = self
            .repository
            .appointments
            .find_at(draft.fecha, draft.hora)
            .await?
        {
            tracing::warn!(
                fecha = %draft.fecha,
                hora = %hhmm::format(&draft.hora),
                existing = %existing.id,
                "Slot already taken"
            );
            return Err(AppError::Conflict(SLOT_TAKEN.to_string()));
        }

        // The store re-checks atomically, so a concurrent submit that passed
        // the read above still ends in Conflict here
        let appointment = self.repository.appointments.insert(draft).await?;

        tracing::info!(
            appointment_id = %appointment.id,
            fecha = %appointment.fecha,
            hora = %hhmm::format(&appointment.hora),
            servicio = %appointment.servicio_id,
            "Appointment booked"
        );

        self.notify_booked(&appointment);
        wizard.reset();

        Ok(BookingOutcome {
            appointment,
            message: BOOKING_SUCCESS.to_string(),
            redirect_after_ms: self.business.redirect_after_ms,
        })
    }

    /// Send the client confirmation and the admin copy in the background
    fn notify_booked(&self, appointment: &Appointment) {
        let notifier = Arc::clone(&self.notifier);
        let client = appointment.email.clone();
        let admin = self.admin_copy.clone();
        let data = TemplateData::from_appointment(&self.business.name, appointment);

        tokio::spawn(async move {
            notify_best_effort(notifier.as_ref(), &client, TemplateKind::BookingRequested, &data)
                .await;
            if let Some(admin) = admin {
                notify_best_effort(notifier.as_ref(), &admin, TemplateKind::BookingAdminCopy, &data)
                    .await;
            }
        });
    }

    /// Run the whole wizard for a single request
    pub async fn book(&self, request: &BookingRequest) -> AppResult<BookingOutcome> {
        request.validate()?;

        let mut wizard = BookingWizard::new();
        wizard.select_service(self.find_service(&request.servicio_id)?)?;
        if let Some(barbero_id) = request.barbero_id {
            wizard.select_staff(Some(self.auth.get_staff(barbero_id).await?))?;
        }
        self.choose_date_time(&mut wizard, request.fecha, request.hora).await?;
        wizard.set_contact(request.contact())?;

        self.submit(&mut wizard).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Duration, Weekday};

    use mockall::Sequence;
    use uuid::Uuid;

    use super::*;
    use crate::{
        models::AppointmentFilter,
        repository::{memory::MemoryAccountStore, MockAppointmentStore},
        scheduling::{
            availability::partition,
            slots::{generate_slots, BusinessHours},
        },
        services::notifications::MockNotifier,
    };

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// An open day a week ahead so no slot has elapsed
    fn open_day(hours: &BusinessHours) -> NaiveDate {
        let mut day = hours.now_local().date() + Duration::days(7);
        while hours.is_closed(day) {
            day = day + Duration::days(1);
        }
        day
    }

    /// Let the detached notification task run to completion
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn service_with(notifier: MockNotifier, config: &AppConfig) -> (BookingService, Repository) {
        service_over(Repository::in_memory(), notifier, config)
    }

    fn service_over(
        repository: Repository,
        notifier: MockNotifier,
        config: &AppConfig,
    ) -> (BookingService, Repository) {
        let hours = BusinessHours::default();
        let schedules = SchedulesService::new(repository.clone(), hours);
        let auth = AuthService::new(repository.clone(), config.auth.clone());
        let service = BookingService::new(
            repository.clone(),
            schedules,
            auth,
            Arc::new(notifier),
            config,
        );
        (service, repository)
    }

    fn juan() -> ContactDetails {
        ContactDetails {
            nombre_cliente: "Juan Pérez".into(),
            email: "juan@x.com".into(),
            whatsapp: "1122334455".into(),
        }
    }

    async fn wizard_at(service: &BookingService, fecha: NaiveDate, hora: NaiveTime) -> BookingWizard {
        let mut wizard = BookingWizard::new();
        wizard
            .select_service(service.find_service("corte-personalizado").unwrap())
            .unwrap();
        service.choose_date_time(&mut wizard, fecha, hora).await.unwrap();
        wizard.set_contact(juan()).unwrap();
        wizard
    }

    #[test]
    fn steps_cannot_be_skipped() {
        let catalog = ServiceOffering::reference_catalog();
        let day = DayAvailability {
            fecha: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            closed: false,
            rule: ConflictRule::ExactMatch,
            slots: vec![],
        };

        let mut wizard = BookingWizard::new();
        assert!(wizard.select_date_time(&day, t(10, 0)).is_err());
        assert!(wizard.set_contact(juan()).is_err());
        assert!(wizard.select_staff(None).is_err());
        assert_eq!(wizard.step(), BookingStep::SelectingService);

        wizard.select_service(catalog[0].clone()).unwrap();
        assert!(wizard.select_service(catalog[1].clone()).is_err());
        assert_eq!(wizard.go_back(), BookingStep::SelectingService);
        wizard.select_service(catalog[1].clone()).unwrap();
        assert_eq!(wizard.service().map(|s| s.id.as_str()), Some("corte-personalizado"));
    }

    #[test]
    fn slot_must_be_offered_and_free() {
        let fecha = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let day = DayAvailability {
            fecha,
            closed: false,
            rule: ConflictRule::ExactMatch,
            slots: crate::scheduling::availability::partition(
                &[t(10, 0), t(10, 30)],
                &[t(10, 30)],
                ConflictRule::ExactMatch,
            ),
        };

        let mut wizard = BookingWizard::new();
        wizard
            .select_service(ServiceOffering::reference_catalog()[0].clone())
            .unwrap();
        assert!(matches!(
            wizard.select_date_time(&day, t(10, 15)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            wizard.select_date_time(&day, t(10, 30)),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(wizard.step(), BookingStep::SelectingDateTime);

        wizard.select_date_time(&day, t(10, 0)).unwrap();
        assert_eq!(wizard.selected_slot(), Some((fecha, t(10, 0))));
        assert_eq!(wizard.go_back(), BookingStep::SelectingDateTime);
        assert_eq!(wizard.selected_slot(), None);
    }

    #[test]
    fn submit_needs_contact_fields() {
        let fecha = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let day = DayAvailability {
            fecha,
            closed: false,
            rule: ConflictRule::ExactMatch,
            slots: crate::scheduling::availability::partition(
                &[t(10, 0)],
                &[],
                ConflictRule::ExactMatch,
            ),
        };
        let mut wizard = BookingWizard::new();
        wizard
            .select_service(ServiceOffering::reference_catalog()[1].clone())
            .unwrap();
        wizard.select_date_time(&day, t(10, 0)).unwrap();
        assert!(!wizard.can_submit());

        let mut contact = juan();
        contact.email = "   ".into();
        wizard.set_contact(contact).unwrap();
        assert!(!wizard.can_submit());
        assert!(wizard.draft(30).is_err());

        wizard.set_contact(juan()).unwrap();
        let draft = wizard.draft(30).unwrap();
        assert_eq!(draft.estado, AppointmentStatus::Requested);
        assert_eq!(draft.precio, 28000);
        assert_eq!(draft.duracion, "45 min");
        assert_eq!(draft.monto_sena, Some(8400));
    }

    #[tokio::test]
    async fn end_to_end_booking_then_conflict() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|to, kind, data| {
                to.eq_ignore_ascii_case("juan@x.com")
                    && *kind == TemplateKind::BookingRequested
                    && data.hora == "10:00"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let config = AppConfig::default();
        let (service, repository) = service_with(notifier, &config);
        let fecha = open_day(&BusinessHours::default());

        // a second session picks the same slot while it is still free
        let mut first = wizard_at(&service, fecha, t(10, 0)).await;
        let mut second = wizard_at(&service, fecha, t(10, 0)).await;

        let outcome = service.submit(&mut first).await.unwrap();
        assert_eq!(outcome.appointment.estado, AppointmentStatus::Requested);
        assert_eq!(outcome.appointment.precio, 28000);
        assert_eq!(outcome.appointment.duracion, "45 min");
        assert_eq!(outcome.appointment.nombre_cliente, "Juan Pérez");
        assert_eq!(outcome.message, BOOKING_SUCCESS);
        assert_eq!(outcome.redirect_after_ms, 3000);
        assert_eq!(first.step(), BookingStep::SelectingService);

        let err = service.submit(&mut second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == SLOT_TAKEN));
        assert_eq!(second.step(), BookingStep::ConfirmingDetails);

        let stored = repository
            .appointments
            .list(&AppointmentFilter::on(fecha))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        settle().await;
    }

    #[tokio::test]
    async fn taken_slot_is_caught_before_insert() {
        let fecha = open_day(&BusinessHours::default());
        let day = DayAvailability {
            fecha,
            closed: false,
            rule: ConflictRule::ExactMatch,
            slots: partition(
                &generate_slots(fecha, &BusinessHours::default()),
                &[],
                ConflictRule::ExactMatch,
            ),
        };

        let mut store = MockAppointmentStore::new();
        let mut seq = Sequence::new();
        store
            .expect_find_at()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        store
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new| Ok(new.into_appointment(Uuid::new_v4(), chrono::Utc::now())));
        store
            .expect_find_at()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |fecha, hora| {
                let existing = ServiceOffering::reference_catalog()[1].clone();
                Ok(Some(
                    NewAppointment {
                        nombre_cliente: "Juan Pérez".into(),
                        email: "juan@x.com".into(),
                        whatsapp: "1122334455".into(),
                        fecha,
                        hora,
                        servicio: existing.nombre,
                        servicio_id: existing.id,
                        precio: existing.precio,
                        duracion: existing.duracion,
                        estado: AppointmentStatus::Requested,
                        barbero_id: None,
                        barbero_nombre: None,
                        monto_sena: None,
                    }
                    .into_appointment(Uuid::new_v4(), chrono::Utc::now()),
                ))
            });

        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(1).returning(|_, _, _| Ok(()));
        let repository = Repository {
            appointments: Arc::new(store),
            accounts: Arc::new(MemoryAccountStore::default()),
        };
        let (service, _) = service_over(repository, notifier, &AppConfig::default());

        let mut wizards = Vec::new();
        for _ in 0..2 {
            let mut wizard = BookingWizard::new();
            wizard
                .select_service(service.find_service("corte-personalizado").unwrap())
                .unwrap();
            wizard.select_date_time(&day, t(10, 0)).unwrap();
            wizard.set_contact(juan()).unwrap();
            wizards.push(wizard);
        }

        let outcome = service.submit(&mut wizards[0]).await.unwrap();
        assert_eq!(outcome.appointment.hora, t(10, 0));

        let err = service.submit(&mut wizards[1]).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m == SLOT_TAKEN));
        assert_eq!(wizards[1].step(), BookingStep::ConfirmingDetails);
        settle().await;
    }

    #[tokio::test]
    async fn notification_failure_keeps_booking() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .times(2)
            .returning(|_, _, _| Err(AppError::Notification("provider down".into())));
        let mut config = AppConfig::default();
        config.notifications.admin_copy = Some("admin@barberia.local".into());
        let (service, repository) = service_with(notifier, &config);
        let fecha = open_day(&BusinessHours::default());

        let request = BookingRequest {
            servicio_id: "corte-barba".into(),
            fecha,
            hora: t(18, 30),
            barbero_id: None,
            nombre_cliente: "Ana".into(),
            email: "ana@x.com".into(),
            whatsapp: "1133344455".into(),
        };
        let outcome = service.book(&request).await.unwrap();
        assert_eq!(outcome.appointment.monto_sena, Some(10500));
        assert!(repository.appointments.get(outcome.appointment.id).await.is_ok());
        settle().await;
    }

    #[tokio::test]
    async fn book_rejects_unknown_service_and_closed_day() {
        let (service, _) = service_with(MockNotifier::new(), &AppConfig::default());
        let hours = BusinessHours::default();
        let fecha = open_day(&hours);
        let mut request = BookingRequest {
            servicio_id: "tinte".into(),
            fecha,
            hora: t(10, 0),
            barbero_id: None,
            nombre_cliente: "Ana".into(),
            email: "ana@x.com".into(),
            whatsapp: "1133344455".into(),
        };
        assert!(matches!(service.book(&request).await, Err(AppError::Validation(_))));

        request.servicio_id = "corte-clasico".into();
        let mut sunday = fecha;
        while sunday.weekday() != Weekday::Sun {
            sunday = sunday + Duration::days(1);
        }
        request.fecha = sunday;
        assert!(matches!(service.book(&request).await, Err(AppError::Validation(_))));

        request.fecha = fecha;
        request.hora = t(20, 0);
        assert!(matches!(service.book(&request).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn concurrent_submits_book_once() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(1).returning(|_, _, _| Ok(()));
        let (service, repository) = service_with(notifier, &AppConfig::default());
        let fecha = open_day(&BusinessHours::default());

        let mut a = wizard_at(&service, fecha, t(12, 0)).await;
        let mut b = wizard_at(&service, fecha, t(12, 0)).await;
        let (ra, rb) = tokio::join!(service.submit(&mut a), service.submit(&mut b));

        assert_eq!([ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let stored = repository
            .appointments
            .list(&AppointmentFilter::on(fecha))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        settle().await;
    }
}
