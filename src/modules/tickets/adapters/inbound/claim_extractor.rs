// Resolves the acting identity from headers set by the upstream auth gateway.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::modules::tickets::core::claim::{Claim, Role, UnknownRole};
use crate::modules::tickets::use_cases::errors::ApplicationError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const COMPANY_ID_HEADER: &str = "x-company-id";

fn required<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApplicationError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApplicationError::Unauthenticated(format!("missing {name} header")))
}

pub fn claim_from_headers(headers: &HeaderMap) -> Result<Claim, ApplicationError> {
    let user_id = required(headers, ACTOR_ID_HEADER)?;
    let role: Role = required(headers, ACTOR_ROLE_HEADER)?
        .parse()
        .map_err(|error: UnknownRole| {
            ApplicationError::Unauthenticated(error.to_string())
        })?;
    let company_id = required(headers, COMPANY_ID_HEADER)?;
    let name = headers
        .get(ACTOR_NAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(user_id);
    Ok(Claim {
        user_id: user_id.to_string(),
        role,
        name: name.to_string(),
        company_id: company_id.to_string(),
    })
}

impl<S> FromRequestParts<S> for Claim
where
    S: Send + Sync,
{
    type Rejection = ApplicationError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        claim_from_headers(&parts.headers)
    }
}
