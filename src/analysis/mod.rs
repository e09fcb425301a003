//! Aggregation of presence data by weekday. Everything here is a pure function over
//! [UserPresenceMap], so calling it twice with the same input yields the same output.

pub mod stats;

use chrono::Datelike;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::AnalyzerError,
    storage::entities::{PresenceData, UserId, UserPresenceMap},
    utils::time::{interval, seconds_since_midnight},
};

use stats::mean_seconds;

/// Labels of weekdays, Monday first. Monday is 0.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One bucket per weekday, Monday first.
pub type WeekdayBuckets<T> = [Vec<T>; 7];

fn weekday_index(date: &impl Datelike) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Groups presence durations (in seconds) by weekday.
pub fn group_by_weekday(user_map: &UserPresenceMap) -> WeekdayBuckets<i64> {
    let mut buckets: WeekdayBuckets<i64> = Default::default();
    for (date, record) in user_map {
        buckets[weekday_index(date)].push(interval(record.start, record.end));
    }
    buckets
}

/// Groups start and end times (in seconds since midnight) by weekday.
pub fn group_by_start_end_time(user_map: &UserPresenceMap) -> WeekdayBuckets<(i64, i64)> {
    let mut buckets: WeekdayBuckets<(i64, i64)> = Default::default();
    for (date, record) in user_map {
        buckets[weekday_index(date)].push((
            seconds_since_midnight(record.start),
            seconds_since_midnight(record.end),
        ));
    }
    buckets
}

/// Collapses every bucket into the mean start and the mean end, truncated to whole seconds.
/// Empty buckets give `(0, 0)`.
pub fn mean_start_end(buckets: &WeekdayBuckets<(i64, i64)>) -> [(i64, i64); 7] {
    buckets.each_ref().map(|pairs| {
        let starts = pairs.iter().map(|v| v.0).collect::<Vec<_>>();
        let ends = pairs.iter().map(|v| v.1).collect::<Vec<_>>();
        (mean_seconds(&starts) as i64, mean_seconds(&ends) as i64)
    })
}

fn user_presence(data: &PresenceData, user_id: UserId) -> Result<&UserPresenceMap, AnalyzerError> {
    data.get(&user_id).ok_or_else(|| {
        debug!("User {user_id} not found!");
        AnalyzerError::UserNotFound(user_id)
    })
}

/// Mean presence time of a user for each weekday.
pub fn mean_by_weekday(
    data: &PresenceData,
    user_id: UserId,
) -> Result<Vec<(&'static str, f64)>, AnalyzerError> {
    let weekdays = group_by_weekday(user_presence(data, user_id)?);
    Ok(WEEKDAY_LABELS
        .into_iter()
        .zip(weekdays.iter().map(|v| mean_seconds(v)))
        .collect())
}

/// Total presence time of a user for each weekday.
pub fn total_by_weekday(
    data: &PresenceData,
    user_id: UserId,
) -> Result<Vec<(&'static str, i64)>, AnalyzerError> {
    let weekdays = group_by_weekday(user_presence(data, user_id)?);
    Ok(WEEKDAY_LABELS
        .into_iter()
        .zip(weekdays.iter().map(|v| v.iter().sum::<i64>()))
        .collect())
}

/// Typical start and end of a user's day for each weekday.
pub fn start_end_by_weekday(
    data: &PresenceData,
    user_id: UserId,
) -> Result<Vec<(&'static str, i64, i64)>, AnalyzerError> {
    let weekdays = mean_start_end(&group_by_start_end_time(user_presence(data, user_id)?));
    Ok(WEEKDAY_LABELS
        .into_iter()
        .zip(weekdays)
        .map(|(label, (start, end))| (label, start, end))
        .collect())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserEntry {
    pub user_id: UserId,
    pub name: String,
}

pub fn list_users(data: &PresenceData) -> Vec<UserEntry> {
    data.keys()
        .map(|user_id| UserEntry {
            user_id: *user_id,
            name: format!("User {user_id}"),
        })
        .collect()
}
