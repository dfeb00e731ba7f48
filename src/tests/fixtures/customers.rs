use crate::modules::tickets::core::customer::{Balance, Customer, CustomerSubscription, TimeBalance};
use crate::shared::core::primitives::EpochMillis;

pub const CUSTOMER_ID: &str = "customer-0001";
pub const COMPANY_ID: &str = "company-0001";

pub struct CustomerBuilder {
    inner: Customer,
}

impl CustomerBuilder {
    /// Active subscription with one hour of prepaid time, nothing used, no expiry.
    pub fn new() -> Self {
        Self {
            inner: Customer {
                id: CUSTOMER_ID.into(),
                company_id: COMPANY_ID.into(),
                name: "Casey Customer".into(),
                email: "casey@customer.test".into(),
                is_need_balance: false,
                subscription: Some(CustomerSubscription {
                    is_active: true,
                    expires_at: None,
                    balance: Balance {
                        time: TimeBalance { total: 3600, used: 0 },
                    },
                }),
            },
        }
    }

    pub fn need_balance(mut self, v: bool) -> Self {
        self.inner.is_need_balance = v;
        self
    }

    pub fn subscription(
        mut self,
        is_active: bool,
        expires_at: Option<EpochMillis>,
        total: i64,
        used: i64,
    ) -> Self {
        self.inner.subscription = Some(CustomerSubscription {
            is_active,
            expires_at,
            balance: Balance {
                time: TimeBalance { total, used },
            },
        });
        self
    }

    pub fn build(self) -> Customer {
        self.inner
    }
}
