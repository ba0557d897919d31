use async_trait::async_trait;
use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use chandler_rfq::engine::Transition;
use chandler_rfq::invitation::Invitation;
use chandler_rfq::models::{Rfq, RfqStatus};
use chandler_rfq::repository::RfqRepository;

use crate::database::Database;

pub struct StoreRfqRepository {
    db: Arc<Database>,
}

impl StoreRfqRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RfqRepository for StoreRfqRepository {
    async fn create_rfq(&self, rfq: Rfq) -> Result<Rfq, DomainError> {
        let mut rfqs = self.db.rfqs.write().await;
        rfqs.insert(rfq.id, rfq.clone());
        Ok(rfq)
    }

    async fn get_rfq(&self, id: Uuid) -> Result<Option<Rfq>, DomainError> {
        Ok(self.db.rfqs.read().await.get(&id).cloned())
    }

    async fn update_rfq(&self, rfq: Rfq) -> Result<Rfq, DomainError> {
        let mut rfqs = self.db.rfqs.write().await;
        if !rfqs.contains_key(&rfq.id) {
            return Err(DomainError::not_found(format!("RFQ {}", rfq.id)));
        }
        rfqs.insert(rfq.id, rfq.clone());
        Ok(rfq)
    }

    async fn delete_rfq(&self, id: Uuid) -> Result<(), DomainError> {
        let mut rfqs = self.db.rfqs.write().await;
        let rfq = rfqs
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("RFQ {id}")))?;
        // Hard delete only for drafts; anything later is cancelled instead.
        if rfq.status != RfqStatus::Draft {
            return Err(DomainError::conflict(format!(
                "only DRAFT RFQs can be deleted (current status {})",
                rfq.status
            )));
        }
        rfqs.remove(&id);
        Ok(())
    }

    async fn list_rfqs(
        &self,
        buyer_organization_id: Option<Uuid>,
        status: Option<RfqStatus>,
    ) -> Result<Vec<Rfq>, DomainError> {
        let rfqs = self.db.rfqs.read().await;
        let mut matched: Vec<Rfq> = rfqs
            .values()
            .filter(|rfq| {
                buyer_organization_id.map_or(true, |org| rfq.buyer_organization_id == org)
                    && status.map_or(true, |s| rfq.status == s)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn append_transition(&self, transition: Transition) -> Result<(), DomainError> {
        let mut transitions = self.db.transitions.write().await;
        transitions.entry(transition.rfq_id).or_default().push(transition);
        Ok(())
    }

    async fn list_transitions(&self, rfq_id: Uuid) -> Result<Vec<Transition>, DomainError> {
        let transitions = self.db.transitions.read().await;
        Ok(transitions.get(&rfq_id).cloned().unwrap_or_default())
    }

    async fn save_invitation(&self, invitation: Invitation) -> Result<Invitation, DomainError> {
        let mut invitations = self.db.invitations.write().await;
        let for_rfq = invitations.entry(invitation.rfq_id).or_default();
        if let Some(existing) = for_rfq
            .iter_mut()
            .find(|i| i.supplier_organization_id == invitation.supplier_organization_id)
        {
            *existing = invitation.clone();
        } else {
            for_rfq.push(invitation.clone());
        }
        Ok(invitation)
    }

    async fn get_invitation(
        &self,
        rfq_id: Uuid,
        supplier_organization_id: Uuid,
    ) -> Result<Option<Invitation>, DomainError> {
        let invitations = self.db.invitations.read().await;
        Ok(invitations.get(&rfq_id).and_then(|for_rfq| {
            for_rfq
                .iter()
                .find(|i| i.supplier_organization_id == supplier_organization_id)
                .cloned()
        }))
    }

    async fn list_invitations(&self, rfq_id: Uuid) -> Result<Vec<Invitation>, DomainError> {
        let invitations = self.db.invitations.read().await;
        Ok(invitations.get(&rfq_id).cloned().unwrap_or_default())
    }

    async fn cancel_cascade(
        &self,
        rfq: Rfq,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<(usize, usize), DomainError> {
        // All four write locks are held for the whole cascade so no reader
        // sees a cancelled RFQ with live invitations or quotes.
        let mut rfqs = self.db.rfqs.write().await;
        let mut transitions = self.db.transitions.write().await;
        let mut invitations = self.db.invitations.write().await;
        let mut quotes = self.db.quotes.write().await;

        if !rfqs.contains_key(&rfq.id) {
            return Err(DomainError::not_found(format!("RFQ {}", rfq.id)));
        }
        let rfq_id = rfq.id;
        rfqs.insert(rfq_id, rfq);
        transitions.entry(rfq_id).or_default().push(transition);

        let mut expired_invitations = 0;
        if let Some(for_rfq) = invitations.get_mut(&rfq_id) {
            for invitation in for_rfq.iter_mut() {
                let before = invitation.status;
                invitation.expire(now);
                if invitation.status != before {
                    expired_invitations += 1;
                }
            }
        }

        let mut expired_quotes = 0;
        for quote in quotes.values_mut().filter(|q| q.rfq_id == rfq_id) {
            let before = quote.status;
            quote.expire(now);
            if quote.status != before {
                expired_quotes += 1;
            }
        }

        Ok((expired_invitations, expired_quotes))
    }
}
