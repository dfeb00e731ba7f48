use serde::Deserialize;

use crate::modules::tickets::core::ticket::TicketStatus;
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddComment {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attach_ids: Vec<String>,
    /// Requested ticket status. Absent means "keep the current status".
    pub status: Option<TicketStatus>,
}

impl AddComment {
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.content.trim().is_empty() && self.attach_ids.is_empty() {
            return Err(ApplicationError::Validation(vec![FieldError::new(
                "content",
                "a comment needs text or at least one attachment",
            )]));
        }
        Ok(())
    }
}
