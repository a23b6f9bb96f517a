use crate::common::TIMESTAMP_FORMAT;
use chrono::{Duration, Local};
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

/// Returns the current wall-clock time formatted as a record timestamp.
#[inline]
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Returns a record timestamp `days` days in the past.
#[inline]
pub fn timestamp_days_ago(days: i64) -> String {
    (Local::now() - Duration::days(days))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[inline]
pub fn get_current_micros() -> Result<u128, SystemTimeError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
}

// Fast path: returns 0 on any error instead of double error handling
#[inline]
pub fn get_current_micros_or_zero() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_current_micros() {
        let result = get_current_micros();
        assert!(result.is_ok());
        assert!(result.unwrap() > 0);
    }

    #[test]
    fn test_now_timestamp_format() {
        let ts = now_timestamp();
        // "YYYY-MM-DD HH:MM:SS.ffffff"
        assert_eq!(ts.len(), 26);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn test_timestamp_ordering_is_lexicographic() {
        let earlier = timestamp_days_ago(7);
        let now = now_timestamp();
        assert!(earlier < now);
    }
}
