//! `HH:MM` wire format for times of day

use chrono::NaiveTime;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Parse an `HH:MM` (or `HH:MM:SS`) label
pub fn parse(label: &str) -> Option<NaiveTime> {
    let label = label.trim();
    NaiveTime::parse_from_str(label, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(label, "%H:%M:%S"))
        .ok()
}

/// Format a time as `HH:MM`
pub fn format(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(time))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_precisions() {
        let expected = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(parse("10:30"), Some(expected));
        assert_eq!(parse("10:30:00"), Some(expected));
        assert_eq!(parse(" 10:30 "), Some(expected));
        assert_eq!(parse("10h30"), None);
    }

    #[test]
    fn formats_without_seconds() {
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(format(&time), "09:00");
    }
}
