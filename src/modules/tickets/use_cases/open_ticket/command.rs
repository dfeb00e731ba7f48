use serde::Deserialize;

use crate::modules::tickets::core::claim::{Claim, Role};
use crate::modules::tickets::core::ticket::{Priority, TicketDraft};
use crate::modules::tickets::use_cases::errors::{ApplicationError, FieldError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenTicket {
    /// Defaults to the actor when a customer opens their own ticket.
    pub customer_id: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    pub project_id: Option<String>,
    pub category_id: Option<String>,
    pub parent_id: Option<String>,
}

impl OpenTicket {
    pub fn into_draft(self, actor: &Claim) -> Result<TicketDraft, ApplicationError> {
        let mut fields = Vec::new();
        let customer_id = match (self.customer_id, actor.role) {
            (Some(customer_id), _) if !customer_id.trim().is_empty() => customer_id,
            (_, Role::Customer) => actor.user_id.clone(),
            _ => {
                fields.push(FieldError::new("customer_id", "is required"));
                String::new()
            }
        };
        if self.subject.trim().is_empty() {
            fields.push(FieldError::new("subject", "is required"));
        }
        if !fields.is_empty() {
            return Err(ApplicationError::Validation(fields));
        }
        Ok(TicketDraft {
            company_id: actor.company_id.clone(),
            customer_id,
            subject: self.subject.trim().to_string(),
            content: self.content,
            priority: self.priority,
            project_id: self.project_id,
            category_id: self.category_id,
            parent_id: self.parent_id,
        })
    }
}
