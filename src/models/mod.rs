//! Data models for Barberia

pub mod account;
pub mod appointment;
pub mod booking;
pub mod hhmm;
pub mod service;

// Re-export commonly used types
pub use account::{Account, Role, SessionClaims, StaffMember};
pub use appointment::{Appointment, AppointmentFilter, AppointmentPatch, AppointmentStatus, NewAppointment};
pub use booking::{BookingOutcome, BookingRequest, ContactDetails};
pub use service::ServiceOffering;
