use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Role of the acting principal. Session issuance is external; the gateway
/// hands us a verified organization id plus role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Buyer,
    Supplier,
    Reviewer,
    System,
}

impl ActorRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "BUYER" => Some(ActorRole::Buyer),
            "SUPPLIER" => Some(ActorRole::Supplier),
            "REVIEWER" => Some(ActorRole::Reviewer),
            "SYSTEM" => Some(ActorRole::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub organization_id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(organization_id: Uuid, role: ActorRole) -> Self {
        Self {
            organization_id,
            role,
        }
    }

    pub fn ensure_buyer(&self) -> Result<(), DomainError> {
        if self.role != ActorRole::Buyer && self.role != ActorRole::System {
            return Err(DomainError::authorization(
                "this operation requires a buyer organization actor",
            ));
        }
        Ok(())
    }

    pub fn ensure_supplier(&self) -> Result<(), DomainError> {
        if self.role != ActorRole::Supplier && self.role != ActorRole::System {
            return Err(DomainError::authorization(
                "this operation requires a supplier organization actor",
            ));
        }
        Ok(())
    }

    pub fn ensure_reviewer(&self) -> Result<(), DomainError> {
        if self.role != ActorRole::Reviewer && self.role != ActorRole::System {
            return Err(DomainError::authorization(
                "this operation requires a reviewer actor",
            ));
        }
        Ok(())
    }

    /// Check that the actor belongs to the organization that owns the target
    /// entity.
    pub fn ensure_owns(&self, owner_organization_id: Uuid) -> Result<(), DomainError> {
        if self.role == ActorRole::System {
            return Ok(());
        }
        if self.organization_id != owner_organization_id {
            return Err(DomainError::authorization(
                "actor organization does not own the target entity",
            ));
        }
        Ok(())
    }
}
