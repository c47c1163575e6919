#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid time range on day {day}: {start} must be before {end}")]
    InvalidTimeRange {
        day: u8,
        start: String,
        end: String,
    },
}

impl CoreError {
    /// Returns `true` for the `start >= end` slot failure.
    pub fn is_invalid_time_range(&self) -> bool {
        matches!(self, CoreError::InvalidTimeRange { .. })
    }
}
