use thiserror::Error;

use crate::storage::entities::UserId;

/// Errors produced by the aggregation entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("User {0} not found")]
    UserNotFound(UserId),
}
