use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Draft,
    Submitted,
    Revised,
    Withdrawn,
    Awarded,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QuoteStatus::Withdrawn | QuoteStatus::Awarded | QuoteStatus::Rejected | QuoteStatus::Expired
        )
    }

    /// A quote counts toward price ranking unless the supplier pulled it or
    /// it lapsed.
    pub fn is_ranked(self) -> bool {
        !matches!(self, QuoteStatus::Withdrawn | QuoteStatus::Expired)
    }

    pub fn is_awardable(self) -> bool {
        matches!(self, QuoteStatus::Submitted | QuoteStatus::Revised)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Submitted => "SUBMITTED",
            QuoteStatus::Revised => "REVISED",
            QuoteStatus::Withdrawn => "WITHDRAWN",
            QuoteStatus::Awarded => "AWARDED",
            QuoteStatus::Rejected => "REJECTED",
            QuoteStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One priced line answering exactly one RFQ line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteLineItem {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub rfq_line_item_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// A supplier's sealed bid against one RFQ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub supplier_organization_id: Uuid,
    pub status: QuoteStatus,
    /// Monotonically increasing; bumped on every submission/revision and
    /// checked (CAS) on every mutating request.
    pub version: i64,
    pub currency: String,
    pub total_amount: Decimal,
    /// Advisory rank across the RFQ's non-withdrawn quotes; never triggers
    /// an award by itself.
    pub price_rank: Option<u32>,
    pub is_complete: bool,
    pub line_items: Vec<QuoteLineItem>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(rfq_id: Uuid, supplier_organization_id: Uuid, currency: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            rfq_id,
            supplier_organization_id,
            status: QuoteStatus::Draft,
            version: 1,
            currency,
            total_amount: Decimal::ZERO,
            price_rank: None,
            is_complete: false,
            line_items: Vec::new(),
            submitted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn withdraw(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !matches!(self.status, QuoteStatus::Submitted | QuoteStatus::Revised) {
            return Err(DomainError::invalid_transition("quote", self.status, QuoteStatus::Withdrawn));
        }
        self.status = QuoteStatus::Withdrawn;
        self.price_rank = None;
        self.updated_at = now;
        Ok(())
    }

    /// Cascade from RFQ cancellation: non-terminal quotes expire.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        if !self.status.is_terminal() {
            self.status = QuoteStatus::Expired;
            self.price_rank = None;
            self.updated_at = now;
        }
    }

    pub fn mark_awarded(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.is_awardable() {
            return Err(DomainError::invalid_transition("quote", self.status, QuoteStatus::Awarded));
        }
        self.status = QuoteStatus::Awarded;
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_rejected(&mut self, now: DateTime<Utc>) {
        if !self.status.is_terminal() {
            self.status = QuoteStatus::Rejected;
            self.updated_at = now;
        }
    }
}
