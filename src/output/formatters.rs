//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Utc};

/// Format a Unix timestamp (seconds) relative to now.
///
/// # Example output
/// `45s ago`, `12m ago`, `3h ago`, `2d ago`, `2025-01-15`
pub fn format_relative_time(timestamp: Option<i64>) -> String {
    let Some(scan_time) = timestamp.and_then(|secs| DateTime::from_timestamp(secs, 0)) else {
        return "--".to_string();
    };
    relative_to(scan_time, Utc::now())
}

fn relative_to(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(then);

    let seconds = duration.num_seconds();
    if seconds < 0 {
        return "just now".to_string();
    }
    if seconds < 60 {
        return format!("{}s ago", seconds);
    }

    let minutes = duration.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = duration.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    then.format("%Y-%m-%d").to_string()
}

/// Format a byte count for humans.
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_to(now - Duration::seconds(30), now), "30s ago");
        assert_eq!(relative_to(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_to(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_to(now - Duration::days(2), now), "2d ago");
        assert_eq!(relative_to(now + Duration::minutes(1), now), "just now");
    }

    #[test]
    fn test_relative_time_old_dates() {
        let then = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let now = then + Duration::days(30);
        assert_eq!(relative_to(then, now), "2023-11-14");
    }

    #[test]
    fn test_relative_time_missing() {
        assert_eq!(format_relative_time(None), "--");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}
