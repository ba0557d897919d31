use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Supplier tier as assigned by the external onboarding/review workflow.
/// This core only reads tiers; it never mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierTier {
    Pending,
    Basic,
    Verified,
    Preferred,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStatus {
    Started,
    DocumentsSubmitted,
    UnderReview,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycDocument {
    pub document_type: String,
    pub file_reference: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierProfile {
    pub organization_id: Uuid,
    pub legal_name: String,
    pub tier: SupplierTier,
    pub onboarding_status: OnboardingStatus,
    pub kyc_documents: Vec<KycDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Capabilities derived from the tier. Computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCapabilities {
    pub can_bid: bool,
    /// Cap on concurrently open (non-terminal) quotes, None = uncapped.
    pub max_open_quotes: Option<u32>,
    pub financing_eligible: bool,
}

impl SupplierTier {
    pub fn capabilities(self) -> TierCapabilities {
        match self {
            SupplierTier::Pending => TierCapabilities {
                can_bid: false,
                max_open_quotes: Some(0),
                financing_eligible: false,
            },
            SupplierTier::Basic => TierCapabilities {
                can_bid: true,
                max_open_quotes: Some(5),
                financing_eligible: false,
            },
            SupplierTier::Verified => TierCapabilities {
                can_bid: true,
                max_open_quotes: Some(25),
                financing_eligible: false,
            },
            SupplierTier::Preferred => TierCapabilities {
                can_bid: true,
                max_open_quotes: Some(100),
                financing_eligible: true,
            },
            SupplierTier::Premium => TierCapabilities {
                can_bid: true,
                max_open_quotes: None,
                financing_eligible: true,
            },
        }
    }
}

impl SupplierProfile {
    pub fn capabilities(&self) -> TierCapabilities {
        self.tier.capabilities()
    }

    /// Gate used by the invitation manager and the quote ledger.
    pub fn ensure_can_bid(&self) -> Result<(), DomainError> {
        if !self.capabilities().can_bid {
            return Err(DomainError::authorization(format!(
                "supplier tier {:?} is not eligible to bid",
                self.tier
            )));
        }
        Ok(())
    }
}

/// Read-mostly lookup; mutation belongs to the external onboarding workflow.
/// `save_profile` exists for seeding and for that workflow's ingestion path.
#[async_trait]
pub trait SupplierProfileRepository: Send + Sync {
    async fn get_profile(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<SupplierProfile>, DomainError>;

    async fn save_profile(&self, profile: SupplierProfile) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(tier: SupplierTier) -> SupplierProfile {
        SupplierProfile {
            organization_id: Uuid::new_v4(),
            legal_name: "Mar del Norte Chandlery S.A.".to_string(),
            tier,
            onboarding_status: OnboardingStatus::Approved,
            kyc_documents: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_tier_cannot_bid() {
        assert!(profile(SupplierTier::Pending).ensure_can_bid().is_err());
        assert!(profile(SupplierTier::Basic).ensure_can_bid().is_ok());
    }

    #[test]
    fn test_financing_starts_at_preferred() {
        assert!(!SupplierTier::Verified.capabilities().financing_eligible);
        assert!(SupplierTier::Preferred.capabilities().financing_eligible);
        assert!(SupplierTier::Premium.capabilities().financing_eligible);
    }

    #[test]
    fn test_premium_is_uncapped() {
        assert_eq!(SupplierTier::Premium.capabilities().max_open_quotes, None);
        assert_eq!(SupplierTier::Basic.capabilities().max_open_quotes, Some(5));
    }
}
