use async_trait::async_trait;
use chandler_core::DomainError;
use uuid::Uuid;

use crate::models::Quote;

/// Repository trait for quote ledger access.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create_quote(&self, quote: Quote) -> Result<Quote, DomainError>;

    async fn get_quote(&self, id: Uuid) -> Result<Option<Quote>, DomainError>;

    /// Replace a quote after the ledger validated and mutated a fetched
    /// copy; the store closes the CAS window on `version`.
    async fn update_quote(&self, quote: Quote) -> Result<Quote, DomainError>;

    async fn list_quotes_for_rfq(&self, rfq_id: Uuid) -> Result<Vec<Quote>, DomainError>;

    async fn list_quotes_for_supplier(
        &self,
        supplier_organization_id: Uuid,
    ) -> Result<Vec<Quote>, DomainError>;

    /// Persist a full quote set for one RFQ in a single atomic mutation
    /// (used after rank recomputation and by the award rejection sweep).
    async fn replace_quotes_for_rfq(
        &self,
        rfq_id: Uuid,
        quotes: Vec<Quote>,
    ) -> Result<(), DomainError>;
}
