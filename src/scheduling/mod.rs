//! Pure scheduling logic: slot generation, availability, duration parsing,
//! temporal classification and aggregation.
//!
//! Nothing in here performs I/O; callers pass in "now" and the appointment
//! collections they fetched.

pub mod aggregate;
pub mod availability;
pub mod classifier;
pub mod duration;
pub mod slots;

pub use availability::{ConflictRule, SlotAvailability};
pub use classifier::{classify, TemporalState};
pub use duration::parse_duration;
pub use slots::{generate_slots, BusinessHours, SLOT_INTERVAL_MINUTES};
