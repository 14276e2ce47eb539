use thiserror::Error;

use crate::controller::Field;

/// Reasons a countdown refuses to start or a window can't be filled.
/// Shown to the user as an alert.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter both a start time and an end time!")]
    MissingTime,

    #[error("The {field} time \"{value}\" is not a valid date (use YYYY-MM-DDTHH:MM)")]
    InvalidTime { field: Field, value: String },

    #[error("The end time must be later than the start time!")]
    EndNotAfterStart,

    #[error("+{hours}h from now is past the latest supported date")]
    WindowOutOfRange { hours: u32 },
}
