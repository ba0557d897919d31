use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// RFQ lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfqStatus {
    Draft,
    Published,
    BiddingOpen,
    BiddingClosed,
    Evaluation,
    Awarded,
    Completed,
    Cancelled,
}

impl RfqStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RfqStatus::Completed | RfqStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RfqStatus::Draft => "DRAFT",
            RfqStatus::Published => "PUBLISHED",
            RfqStatus::BiddingOpen => "BIDDING_OPEN",
            RfqStatus::BiddingClosed => "BIDDING_CLOSED",
            RfqStatus::Evaluation => "EVALUATION",
            RfqStatus::Awarded => "AWARDED",
            RfqStatus::Completed => "COMPLETED",
            RfqStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RfqStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only sealed-bid auctions are supported; the field exists so the wire
/// format is explicit about it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionType {
    SealedBid,
}

/// A requested line: quantity in a unit of measure, optionally referencing a
/// catalog product. Versioned for optimistic concurrency between buyer
/// agents editing the same line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqLineItem {
    pub id: Uuid,
    pub rfq_id: Uuid,
    pub line_number: u32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_of_measure: String,
    pub product_id: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RfqLineItem {
    pub fn new(
        rfq_id: Uuid,
        line_number: u32,
        description: String,
        quantity: Decimal,
        unit_of_measure: String,
        product_id: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        if quantity <= Decimal::ZERO {
            return Err(DomainError::validation("quantity", "quantity must be positive"));
        }
        if unit_of_measure.trim().is_empty() {
            return Err(DomainError::validation(
                "unit_of_measure",
                "unit of measure must not be empty",
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            rfq_id,
            line_number,
            description,
            quantity,
            unit_of_measure,
            product_id,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update read at `expected_version`.
    pub fn apply_update(
        &mut self,
        expected_version: i64,
        description: Option<String>,
        quantity: Option<Decimal>,
        unit_of_measure: Option<String>,
        product_id: Option<Option<Uuid>>,
    ) -> Result<(), DomainError> {
        chandler_core::version::ensure_version(expected_version, self.version)?;
        if let Some(quantity) = quantity {
            if quantity <= Decimal::ZERO {
                return Err(DomainError::validation("quantity", "quantity must be positive"));
            }
            self.quantity = quantity;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(unit) = unit_of_measure {
            if unit.trim().is_empty() {
                return Err(DomainError::validation(
                    "unit_of_measure",
                    "unit of measure must not be empty",
                ));
            }
            self.unit_of_measure = unit;
        }
        if let Some(product_id) = product_id {
            self.product_id = product_id;
        }
        self.version += 1;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// The RFQ aggregate: buyer-owned metadata plus its ordered line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rfq {
    pub id: Uuid,
    pub buyer_organization_id: Uuid,
    pub title: String,
    pub status: RfqStatus,
    pub auction_type: AuctionType,
    pub currency: String,
    pub vessel_name: Option<String>,
    pub delivery_port: String,
    pub delivery_date: Option<DateTime<Utc>>,
    pub bidding_start: Option<DateTime<Utc>>,
    pub bidding_deadline: Option<DateTime<Utc>>,
    pub allow_partial_quotes: bool,
    pub allow_quote_revision: bool,
    pub require_all_line_items: bool,
    pub line_items: Vec<RfqLineItem>,
    pub awarded_quote_id: Option<Uuid>,
    pub awarded_supplier_id: Option<Uuid>,
    pub awarded_at: Option<DateTime<Utc>>,
    pub cancelled_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[allow(clippy::too_many_arguments)]
impl Rfq {
    pub fn new(
        buyer_organization_id: Uuid,
        title: String,
        currency: String,
        vessel_name: Option<String>,
        delivery_port: String,
        delivery_date: Option<DateTime<Utc>>,
        bidding_deadline: Option<DateTime<Utc>>,
        allow_partial_quotes: bool,
        allow_quote_revision: bool,
        require_all_line_items: bool,
    ) -> Result<Self, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "title must not be empty"));
        }
        if delivery_port.trim().is_empty() {
            return Err(DomainError::validation(
                "delivery_port",
                "delivery port must not be empty",
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            buyer_organization_id,
            title,
            status: RfqStatus::Draft,
            auction_type: AuctionType::SealedBid,
            currency,
            vessel_name,
            delivery_port,
            delivery_date,
            bidding_start: None,
            bidding_deadline,
            allow_partial_quotes,
            allow_quote_revision,
            require_all_line_items,
            line_items: Vec::new(),
            awarded_quote_id: None,
            awarded_supplier_id: None,
            awarded_at: None,
            cancelled_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn next_line_number(&self) -> u32 {
        self.line_items
            .iter()
            .map(|item| item.line_number)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn line_item(&self, item_id: Uuid) -> Option<&RfqLineItem> {
        self.line_items.iter().find(|item| item.id == item_id)
    }

    /// Line items are editable only while the solicitation is a draft; once
    /// published the requested scope is frozen for invited suppliers.
    pub fn ensure_lines_editable(&self) -> Result<(), DomainError> {
        if self.status != RfqStatus::Draft {
            return Err(DomainError::conflict(format!(
                "line items can only be edited while the RFQ is DRAFT (current status {})",
                self.status
            )));
        }
        Ok(())
    }

    pub fn ensure_metadata_editable(&self) -> Result<(), DomainError> {
        if self.status != RfqStatus::Draft {
            return Err(DomainError::conflict(format!(
                "RFQ metadata can only be edited while DRAFT (current status {})",
                self.status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfq() -> Rfq {
        Rfq::new(
            Uuid::new_v4(),
            "Deck stores, MV Aurora".to_string(),
            "USD".to_string(),
            Some("MV Aurora".to_string()),
            "SGSIN".to_string(),
            None,
            None,
            false,
            true,
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_new_rfq_starts_draft_with_no_award() {
        let rfq = rfq();
        assert_eq!(rfq.status, RfqStatus::Draft);
        assert!(rfq.awarded_quote_id.is_none());
        assert!(rfq.line_items.is_empty());
    }

    #[test]
    fn test_line_numbers_are_sequential() {
        let mut rfq = rfq();
        assert_eq!(rfq.next_line_number(), 1);
        let item = RfqLineItem::new(
            rfq.id,
            rfq.next_line_number(),
            "Fresh water".to_string(),
            Decimal::from(10),
            "t".to_string(),
            None,
        )
        .unwrap();
        rfq.line_items.push(item);
        assert_eq!(rfq.next_line_number(), 2);
    }

    #[test]
    fn test_line_item_rejects_zero_quantity() {
        let err = RfqLineItem::new(
            Uuid::new_v4(),
            1,
            "Rope".to_string(),
            Decimal::ZERO,
            "m".to_string(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_stale_line_item_update_conflicts() {
        let mut item = RfqLineItem::new(
            Uuid::new_v4(),
            1,
            "Rope".to_string(),
            Decimal::from(5),
            "m".to_string(),
            None,
        )
        .unwrap();
        item.apply_update(1, None, Some(Decimal::from(6)), None, None).unwrap();
        let err = item
            .apply_update(1, None, Some(Decimal::from(7)), None, None)
            .unwrap_err();
        assert!(matches!(err, DomainError::VersionConflict { .. }));
    }
}
