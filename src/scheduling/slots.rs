//! Bookable slot generation

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc, Weekday};

use crate::{
    config::BusinessConfig,
    error::{AppError, AppResult},
};

/// Length of a slot and spacing between consecutive slot starts
pub const SLOT_INTERVAL_MINUTES: i64 = 30;

/// Opening hours policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    /// First slot starts at `open_hour:00`
    pub open_hour: u32,
    /// No slot starts at or after `close_hour:00`
    pub close_hour: u32,
    pub closed_weekday: Option<Weekday>,
    pub utc_offset: FixedOffset,
}

impl BusinessHours {
    pub fn from_config(config: &BusinessConfig) -> AppResult<Self> {
        if config.open_hour >= config.close_hour || config.close_hour > 24 {
            return Err(AppError::Internal(format!(
                "Invalid business hours {}-{}",
                config.open_hour, config.close_hour
            )));
        }
        let closed_weekday = config
            .closed_weekday()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let utc_offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::Internal(format!("Invalid utc_offset_minutes {}", config.utc_offset_minutes))
        })?;

        Ok(Self {
            open_hour: config.open_hour,
            close_hour: config.close_hour,
            closed_weekday,
            utc_offset,
        })
    }

    pub fn is_closed(&self, date: NaiveDate) -> bool {
        self.closed_weekday == Some(date.weekday())
    }

    /// Current wall-clock time at the shop
    pub fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.utc_offset).naive_local()
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open_hour: 10,
            close_hour: 20,
            closed_weekday: Some(Weekday::Sun),
            utc_offset: FixedOffset::west_opt(3 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// Ordered slot start times for `date`, earliest first. Empty on the closed day.
pub fn generate_slots(date: NaiveDate, hours: &BusinessHours) -> Vec<NaiveTime> {
    if hours.is_closed(date) {
        return Vec::new();
    }

    let open = i64::from(hours.open_hour) * 60;
    let close = i64::from(hours.close_hour.min(24)) * 60;

    (open..close)
        .step_by(SLOT_INTERVAL_MINUTES as usize)
        .filter_map(|minute| NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0))
        .collect()
}
