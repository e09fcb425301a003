use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

pub type UserId = u32;

/// Presence of a single user on a single day.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct PresenceRecord {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// All days a user was present. Ordered by date so that aggregation is reproducible.
pub type UserPresenceMap = BTreeMap<NaiveDate, PresenceRecord>;

/// Presence of every user found in the source, ordered by user id.
pub type PresenceData = BTreeMap<UserId, UserPresenceMap>;
