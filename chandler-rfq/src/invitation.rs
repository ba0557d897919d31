use chandler_core::supplier::SupplierProfile;
use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Rfq, RfqStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

/// A supplier organization's authorization to bid on one RFQ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub supplier_organization_id: Uuid,
    pub status: InvitationStatus,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Invite a supplier. The RFQ must already be visible to suppliers and
    /// the supplier's tier must allow bidding.
    pub fn issue(
        rfq: &Rfq,
        profile: &SupplierProfile,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !matches!(rfq.status, RfqStatus::Published | RfqStatus::BiddingOpen) {
            return Err(DomainError::conflict(format!(
                "invitations can only be sent while the RFQ is PUBLISHED or BIDDING_OPEN (current status {})",
                rfq.status
            )));
        }
        profile.ensure_can_bid()?;
        Ok(Self {
            id: Uuid::new_v4(),
            rfq_id: rfq.id,
            supplier_organization_id: profile.organization_id,
            status: InvitationStatus::Pending,
            invited_at: now,
            responded_at: None,
        })
    }

    pub fn respond(&mut self, accept: bool, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != InvitationStatus::Pending {
            return Err(DomainError::conflict(format!(
                "invitation has already been responded to ({:?})",
                self.status
            )));
        }
        self.status = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Declined
        };
        self.responded_at = Some(now);
        Ok(())
    }

    /// Cascade from RFQ cancellation: open invitations expire.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        if self.status == InvitationStatus::Pending {
            self.status = InvitationStatus::Expired;
            self.responded_at = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chandler_core::supplier::{OnboardingStatus, SupplierTier};
    use chandler_core::{Actor, ActorRole};

    fn profile(tier: SupplierTier) -> SupplierProfile {
        SupplierProfile {
            organization_id: Uuid::new_v4(),
            legal_name: "Horizon Marine Supplies".to_string(),
            tier,
            onboarding_status: OnboardingStatus::Approved,
            kyc_documents: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn published_rfq() -> Rfq {
        let actor = Actor::new(Uuid::new_v4(), ActorRole::Buyer);
        let mut rfq = Rfq::new(
            actor.organization_id,
            "Galley provisions".to_string(),
            "USD".to_string(),
            None,
            "SGSIN".to_string(),
            None,
            Some(Utc::now() + chrono::Duration::days(2)),
            true,
            true,
            false,
        )
        .unwrap();
        let item = crate::models::RfqLineItem::new(
            rfq.id,
            1,
            "Rice".to_string(),
            rust_decimal::Decimal::from(50),
            "kg".to_string(),
            None,
        )
        .unwrap();
        rfq.line_items.push(item);
        rfq.publish(&actor, Utc::now()).unwrap();
        rfq
    }

    #[test]
    fn test_invite_requires_published_rfq() {
        let rfq = Rfq::new(
            Uuid::new_v4(),
            "Draft only".to_string(),
            "USD".to_string(),
            None,
            "NLRTM".to_string(),
            None,
            None,
            true,
            true,
            false,
        )
        .unwrap();
        let err = Invitation::issue(&rfq, &profile(SupplierTier::Verified), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn test_invite_is_tier_gated() {
        let rfq = published_rfq();
        let err = Invitation::issue(&rfq, &profile(SupplierTier::Pending), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
        assert!(Invitation::issue(&rfq, &profile(SupplierTier::Basic), Utc::now()).is_ok());
    }

    #[test]
    fn test_respond_only_once() {
        let rfq = published_rfq();
        let mut invitation =
            Invitation::issue(&rfq, &profile(SupplierTier::Verified), Utc::now()).unwrap();
        invitation.respond(true, Utc::now()).unwrap();
        assert_eq!(invitation.status, InvitationStatus::Accepted);
        assert!(invitation.respond(false, Utc::now()).is_err());
    }

    #[test]
    fn test_expire_only_touches_pending() {
        let rfq = published_rfq();
        let mut accepted =
            Invitation::issue(&rfq, &profile(SupplierTier::Verified), Utc::now()).unwrap();
        accepted.respond(true, Utc::now()).unwrap();
        accepted.expire(Utc::now());
        assert_eq!(accepted.status, InvitationStatus::Accepted);

        let mut pending =
            Invitation::issue(&rfq, &profile(SupplierTier::Verified), Utc::now()).unwrap();
        pending.expire(Utc::now());
        assert_eq!(pending.status, InvitationStatus::Expired);
    }
}
