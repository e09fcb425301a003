//!  Presence data is read from a CSV file through [presence_source::PresenceSource].
//!  The basic idea is:
//!   - Every row of the file is `user_id,date,start,end`.
//!   - Rows that can't be parsed are skipped.
//!   - The parsed data is read-only and shared behind an `Arc`.

pub mod entities;
pub mod presence_source;
