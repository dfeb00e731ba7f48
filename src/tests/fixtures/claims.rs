use crate::modules::tickets::core::claim::{Claim, Role};
use crate::tests::fixtures::customers::{COMPANY_ID, CUSTOMER_ID};

fn claim(user_id: &str, name: &str, role: Role) -> Claim {
    Claim {
        user_id: user_id.into(),
        role,
        name: name.into(),
        company_id: COMPANY_ID.into(),
    }
}

pub fn agent() -> Claim {
    claim("agent-0001", "Ada Agent", Role::Agent)
}

pub fn admin() -> Claim {
    claim("admin-0001", "Alex Admin", Role::Admin)
}

pub fn customer_claim() -> Claim {
    claim(CUSTOMER_ID, "Casey Customer", Role::Customer)
}
