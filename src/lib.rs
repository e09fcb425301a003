//! Small web service for analyzing employee presence. Presence is read from a CSV file,
//! grouped by weekday and exposed through a JSON API, a few HTML pages and a cli report.
//!

pub mod analysis;
pub mod cli;
pub mod error;
pub mod server;
pub mod storage;
pub mod utils;
