// Customer, prepaid time balance, and the balance ledger.

use serde::{Deserialize, Serialize};

use crate::shared::core::primitives::{EpochMillis, new_id};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBalance {
    pub total: i64,
    /// Only grows through settlement. An external expiry job resets it.
    pub used: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub time: TimeBalance,
}

/// `total - used`, split for display. Components share the sign of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub total_seconds: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
}

impl RemainingTime {
    pub fn from_seconds(total_seconds: i64) -> Self {
        Self {
            total_seconds,
            hour: total_seconds / 3600,
            minute: (total_seconds % 3600) / 60,
            second: total_seconds % 60,
        }
    }
}

impl Balance {
    pub fn remaining(&self) -> RemainingTime {
        RemainingTime::from_seconds(self.time.total - self.time.used)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSubscription {
    pub is_active: bool,
    pub expires_at: Option<EpochMillis>,
    pub balance: Balance,
}

impl CustomerSubscription {
    pub fn is_usable(&self, now: EpochMillis) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub email: String,
    pub is_need_balance: bool,
    pub subscription: Option<CustomerSubscription>,
}

impl Customer {
    pub fn balance(&self) -> Balance {
        self.subscription
            .as_ref()
            .map(|subscription| subscription.balance)
            .unwrap_or_default()
    }

    /// Remaining seconds on a subscription that can still be drawn from, if any.
    pub fn usable_remaining_seconds(&self, now: EpochMillis) -> Option<i64> {
        self.subscription
            .as_ref()
            .filter(|subscription| subscription.is_usable(now))
            .map(|subscription| subscription.balance.remaining().total_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Ticket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReference {
    pub unique_id: String,
    #[serde(rename = "type")]
    pub reference_type: ReferenceType,
    /// Audit record whose interval this row settles.
    pub time_log_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerBalanceHistory {
    pub id: String,
    pub customer_id: String,
    #[serde(rename = "in")]
    pub credit: i64,
    #[serde(rename = "out")]
    pub debit: i64,
    pub reference: BalanceReference,
    pub created_at: EpochMillis,
}

impl CustomerBalanceHistory {
    pub fn ticket_debit(
        customer_id: &str,
        ticket_id: &str,
        time_log_id: Option<String>,
        seconds: i64,
        now: EpochMillis,
    ) -> Self {
        Self {
            id: new_id(),
            customer_id: customer_id.to_string(),
            credit: 0,
            debit: seconds,
            reference: BalanceReference {
                unique_id: ticket_id.to_string(),
                reference_type: ReferenceType::Ticket,
                time_log_id,
            },
            created_at: now,
        }
    }
}
