use time::macros::format_description;
use time::{Duration, OffsetDateTime};

/// Relative label for a post timestamp: `now`, `5m`, `3h`, `Mar 4`, or
/// `Mar 4, 2023` for earlier years. Future timestamps read as `now`.
pub fn format_post_date(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - created_at;

    if elapsed < Duration::minutes(1) {
        return "now".to_string();
    }
    if elapsed < Duration::hours(1) {
        return format!("{}m", elapsed.whole_minutes());
    }
    if elapsed < Duration::days(1) {
        return format!("{}h", elapsed.whole_hours());
    }

    let result = if created_at.year() == now.year() {
        created_at.format(format_description!("[month repr:short] [day padding:none]"))
    } else {
        created_at.format(format_description!(
            "[month repr:short] [day padding:none], [year]"
        ))
    };
    result.unwrap_or_else(|_| created_at.date().to_string())
}
