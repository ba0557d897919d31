use async_trait::async_trait;
use chandler_core::DomainError;
use std::sync::Arc;
use uuid::Uuid;

use chandler_quote::models::Quote;
use chandler_quote::repository::QuoteRepository;

use crate::database::Database;

pub struct StoreQuoteRepository {
    db: Arc<Database>,
}

impl StoreQuoteRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuoteRepository for StoreQuoteRepository {
    async fn create_quote(&self, quote: Quote) -> Result<Quote, DomainError> {
        let mut quotes = self.db.quotes.write().await;
        if quotes
            .values()
            .any(|q| q.rfq_id == quote.rfq_id
                && q.supplier_organization_id == quote.supplier_organization_id)
        {
            return Err(DomainError::conflict(
                "supplier already has a quote on this RFQ; revise it instead",
            ));
        }
        quotes.insert(quote.id, quote.clone());
        Ok(quote)
    }

    async fn get_quote(&self, id: Uuid) -> Result<Option<Quote>, DomainError> {
        Ok(self.db.quotes.read().await.get(&id).cloned())
    }

    async fn update_quote(&self, quote: Quote) -> Result<Quote, DomainError> {
        let mut quotes = self.db.quotes.write().await;
        let stored = quotes
            .get(&quote.id)
            .ok_or_else(|| DomainError::not_found(format!("quote {}", quote.id)))?;
        // Closes the window between the handler's fetch and this write: a
        // concurrent mutation bumped the stored version past ours.
        if quote.version < stored.version {
            return Err(DomainError::VersionConflict {
                expected: quote.version,
                found: stored.version,
            });
        }
        quotes.insert(quote.id, quote.clone());
        Ok(quote)
    }

    async fn list_quotes_for_rfq(&self, rfq_id: Uuid) -> Result<Vec<Quote>, DomainError> {
        let quotes = self.db.quotes.read().await;
        let mut matched: Vec<Quote> = quotes.values().filter(|q| q.rfq_id == rfq_id).cloned().collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }

    async fn list_quotes_for_supplier(
        &self,
        supplier_organization_id: Uuid,
    ) -> Result<Vec<Quote>, DomainError> {
        let quotes = self.db.quotes.read().await;
        let mut matched: Vec<Quote> = quotes
            .values()
            .filter(|q| q.supplier_organization_id == supplier_organization_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn replace_quotes_for_rfq(
        &self,
        rfq_id: Uuid,
        updated: Vec<Quote>,
    ) -> Result<(), DomainError> {
        let mut quotes = self.db.quotes.write().await;
        for quote in updated {
            if quote.rfq_id != rfq_id {
                return Err(DomainError::conflict(format!(
                    "quote {} does not belong to RFQ {rfq_id}",
                    quote.id
                )));
            }
            quotes.insert(quote.id, quote);
        }
        Ok(())
    }
}
