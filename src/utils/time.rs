use chrono::{NaiveTime, Timelike};

/// Amount of seconds between midnight and `time`.
pub fn seconds_since_midnight(time: NaiveTime) -> i64 {
    time.hour() as i64 * 3600 + time.minute() as i64 * 60 + time.second() as i64
}

/// Signed amount of seconds between two times of day. Negative if `end` precedes `start`.
pub fn interval(start: NaiveTime, end: NaiveTime) -> i64 {
    seconds_since_midnight(end) - seconds_since_midnight(start)
}

/// Formats seconds as `XhYmZs`, omitting leading zero units. Negative durations get a `-` prefix.
pub fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();
    let hours = seconds / 3600;
    let minutes = seconds / 60;
    if hours > 0 {
        format!("{sign}{}h{}m{}s", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{sign}{}m{}s", minutes % 60, seconds % 60)
    } else {
        format!("{sign}{}s", seconds % 60)
    }
}

/// Formats seconds since midnight as `HH:MM:SS`.
pub fn format_time_of_day(seconds: i64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}
