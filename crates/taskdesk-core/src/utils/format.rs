use chrono::{DateTime, Local, Utc};

/// Case-insensitive substring test
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a timestamp in local time, e.g. "May 01, 2024 10:00"
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%b %d, %Y %H:%M").to_string()
}

/// Render a minute count as "1h 05m" / "45m", or "-" when unknown
pub fn format_minutes(minutes: Option<u32>) -> String {
    match minutes {
        None => "-".to_string(),
        Some(m) if m < 60 => format!("{}m", m),
        Some(m) => format!("{}h {:02}m", m / 60, m % 60),
    }
}

pub fn format_flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
