//! Text helpers for the widget

use chrono::{DateTime, Utc};
use mailsift_domain::parse_timestamp;

/// Keep the first `max_chars` characters, appending "..." when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Short age label for a timestamp
///
/// "now" under an hour (or in the future), "{H}h" under a day, else the
/// date as `M/D/YYYY`. Unparsable timestamps are shown as found.
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_timestamp(timestamp) else {
        return timestamp.trim().to_string();
    };
    let age = now.signed_duration_since(at);
    if age.num_minutes() < 60 {
        "now".to_string()
    } else if age.num_hours() < 24 {
        format!("{}h", age.num_hours())
    } else {
        at.format("%-m/%-d/%Y").to_string()
    }
}
