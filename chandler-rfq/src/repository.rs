use async_trait::async_trait;
use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::Transition;
use crate::invitation::Invitation;
use crate::models::{Rfq, RfqStatus};

/// Repository trait for RFQ aggregate access. Implementations enforce the
/// line-item CAS version check and make the cancellation cascade atomic.
#[async_trait]
pub trait RfqRepository: Send + Sync {
    async fn create_rfq(&self, rfq: Rfq) -> Result<Rfq, DomainError>;

    async fn get_rfq(&self, id: Uuid) -> Result<Option<Rfq>, DomainError>;

    /// Whole-aggregate swap; used by transition handlers after the engine has
    /// validated and mutated a fetched copy.
    async fn update_rfq(&self, rfq: Rfq) -> Result<Rfq, DomainError>;

    async fn delete_rfq(&self, id: Uuid) -> Result<(), DomainError>;

    async fn list_rfqs(
        &self,
        buyer_organization_id: Option<Uuid>,
        status: Option<RfqStatus>,
    ) -> Result<Vec<Rfq>, DomainError>;

    async fn append_transition(&self, transition: Transition) -> Result<(), DomainError>;

    async fn list_transitions(&self, rfq_id: Uuid) -> Result<Vec<Transition>, DomainError>;

    async fn save_invitation(&self, invitation: Invitation) -> Result<Invitation, DomainError>;

    async fn get_invitation(
        &self,
        rfq_id: Uuid,
        supplier_organization_id: Uuid,
    ) -> Result<Option<Invitation>, DomainError>;

    async fn list_invitations(&self, rfq_id: Uuid) -> Result<Vec<Invitation>, DomainError>;

    /// Persist a cancelled RFQ and, in the same atomic mutation, expire its
    /// pending invitations and its non-terminal quotes. Returns
    /// (expired invitations, expired quotes).
    async fn cancel_cascade(
        &self,
        rfq: Rfq,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<(usize, usize), DomainError>;
}
