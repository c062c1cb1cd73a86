//! Free-text duration labels ("1h 15min", "45 min")

use once_cell::sync::Lazy;
use regex::Regex;

/// Used when a label carries no recognizable duration
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// No single service runs longer than a day
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)h").expect("valid hours pattern"));
static MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*min").expect("valid minutes pattern"));

fn capture(pattern: &Regex, label: &str) -> Option<i64> {
    pattern
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Total minutes described by `label`. Never fails.
///
/// Falls back to [`DEFAULT_DURATION_MINUTES`] when neither hours nor minutes
/// are recognized, when they add up to zero, or when the total exceeds
/// [`MAX_DURATION_MINUTES`].
pub fn parse_duration(label: &str) -> i64 {
    let hours = capture(&HOURS, label);
    let minutes = capture(&MINUTES, label);

    if hours.is_none() && minutes.is_none() {
        return DEFAULT_DURATION_MINUTES;
    }

    let total = hours
        .unwrap_or(0)
        .saturating_mul(60)
        .saturating_add(minutes.unwrap_or(0));
    if (1..=MAX_DURATION_MINUTES).contains(&total) {
        total
    } else {
        DEFAULT_DURATION_MINUTES
    }
}
