use serde::Deserialize;

use crate::modules::tickets::core::log_time::ManualDuration;
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError};

/// Upper bound for a manually entered duration, a little over eleven years.
pub const MAX_MANUAL_HOURS: i64 = 100_000;

/// Administrative override of a ticket's tracked total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EditTimeTrack {
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

impl EditTimeTrack {
    pub fn validate(self) -> Result<ManualDuration, ApplicationError> {
        let mut fields = Vec::new();
        if !(0..=MAX_MANUAL_HOURS).contains(&self.hour) {
            fields.push(FieldError::new("hour", "must be between 0 and 100000"));
        }
        if !(0..60).contains(&self.minute) {
            fields.push(FieldError::new("minute", "must be between 0 and 59"));
        }
        if !(0..60).contains(&self.second) {
            fields.push(FieldError::new("second", "must be between 0 and 59"));
        }
        if !fields.is_empty() {
            return Err(ApplicationError::Validation(fields));
        }
        Ok(ManualDuration {
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        })
    }
}
