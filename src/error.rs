use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a filter update can fail
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KalmanError {
    #[error("observation has nan or inf values")]
    InvalidObservation,

    #[error("command has nan or inf values")]
    InvalidCommand,

    #[error("could not invert innovation covariance S")]
    SingularInnovationCovariance,

    #[error("estimated vector has nan or inf values")]
    InvalidEstimate,
}

/// Result type for filter operations
pub type KalmanResult<T> = Result<T, KalmanError>;

/// Outcome of the most recent update, kept for polling-style callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterStatus {
    #[default]
    Ok,
    Failed(KalmanError),
}

impl FilterStatus {
    /// Numeric status: 0 on success, 1 on any failure
    pub fn code(&self) -> i32 {
        match self {
            FilterStatus::Ok => 0,
            FilterStatus::Failed(_) => 1,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FilterStatus::Ok)
    }

    pub fn error(&self) -> Option<KalmanError> {
        match self {
            FilterStatus::Ok => None,
            FilterStatus::Failed(e) => Some(*e),
        }
    }

    /// Short label used in snapshots and demo output
    pub fn label(&self) -> &'static str {
        match self {
            FilterStatus::Ok => "ok",
            FilterStatus::Failed(KalmanError::InvalidObservation) => "invalid_observation",
            FilterStatus::Failed(KalmanError::InvalidCommand) => "invalid_command",
            FilterStatus::Failed(KalmanError::SingularInnovationCovariance) => "singular_innovation",
            FilterStatus::Failed(KalmanError::InvalidEstimate) => "invalid_estimate",
        }
    }
}

impl<T> From<&KalmanResult<T>> for FilterStatus {
    fn from(result: &KalmanResult<T>) -> Self {
        match result {
            Ok(_) => FilterStatus::Ok,
            Err(e) => FilterStatus::Failed(*e),
        }
    }
}
