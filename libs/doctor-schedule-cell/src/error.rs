use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid time format '{0}', expected zero-padded HH:MM")]
    InvalidTimeFormat(String),

    #[error("No schedule for doctor {0} and no schedule defaults configured")]
    MissingSchedule(Uuid),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidSchedule(_) | ScheduleError::InvalidTimeFormat(_) => {
                AppError::ValidationError(err.to_string())
            }
            ScheduleError::MissingSchedule(_) => AppError::NotFound(err.to_string()),
        }
    }
}
