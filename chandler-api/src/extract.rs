use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chandler_core::{Actor, ActorRole};
use uuid::Uuid;

use crate::error::ApiError;

pub const ORGANIZATION_HEADER: &str = "x-organization-id";
pub const ROLE_HEADER: &str = "x-actor-role";

/// Actor identity from the gateway-verified headers `x-organization-id` and
/// `x-actor-role`. Session verification happens upstream; these headers are
/// trusted here.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub Actor);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let organization_id = parts
            .headers
            .get(ORGANIZATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or_else(|| {
                ApiError::Authorization(format!("missing or invalid {ORGANIZATION_HEADER} header"))
            })?;
        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(ActorRole::parse)
            .ok_or_else(|| {
                ApiError::Authorization(format!("missing or invalid {ROLE_HEADER} header"))
            })?;
        Ok(Identity(Actor::new(organization_id, role)))
    }
}
