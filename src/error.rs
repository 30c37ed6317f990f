use thiserror::Error;

/// Terminal failures of a mileage recognition run.
///
/// None of these are retried inside the pipeline; the caller decides whether
/// to fall back to manual entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MileageError {
    #[error("image could not be processed: {0}")]
    ImageProcessingFailed(String),

    #[error("no text found in any image variant")]
    NoTextFound,

    #[error("no valid mileage found in recognized text")]
    NoValidMileageFound,

    #[error("invalid mileage: {0}")]
    InvalidMileage(String),

    #[error("recognition cancelled")]
    Cancelled,
}

pub type MileageResult<T> = Result<T, MileageError>;
