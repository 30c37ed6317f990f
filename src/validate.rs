use crate::error::{MileageError, MileageResult};

/// Largest mileage the pipeline will report.
pub const MAX_MILEAGE: i64 = 1_000_000;

/// Last bounds check before a value leaves the pipeline.
///
/// Upstream range filtering should already guarantee this; it is re-checked
/// here regardless.
pub fn validate_mileage(value: i64, max_mileage: i64) -> MileageResult<i64> {
    if value < 0 {
        return Err(MileageError::InvalidMileage(format!(
            "{value} is negative"
        )));
    }
    if value > max_mileage {
        return Err(MileageError::InvalidMileage(format!(
            "{value} exceeds maximum of {max_mileage}"
        )));
    }
    Ok(value)
}
