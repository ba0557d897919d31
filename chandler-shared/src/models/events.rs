use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RfqTransitionedEvent {
    pub rfq_id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub transition_type: String,
    pub triggered_by: Uuid,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct QuoteSubmittedEvent {
    pub quote_id: Uuid,
    pub rfq_id: Uuid,
    pub supplier_organization_id: Uuid,
    pub total_amount: Decimal,
    pub version: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct QuoteWithdrawnEvent {
    pub quote_id: Uuid,
    pub rfq_id: Uuid,
    pub supplier_organization_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RfqAwardedEvent {
    pub rfq_id: Uuid,
    pub quote_id: Uuid,
    pub supplier_organization_id: Uuid,
    pub order_id: Uuid,
    pub total_amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct DeliveryRecordedEvent {
    pub delivery_id: Uuid,
    pub order_id: Uuid,
    pub vendor_order_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct DeliveryReviewedEvent {
    pub delivery_id: Uuid,
    pub order_id: Uuid,
    pub vendor_order_id: Uuid,
    pub outcome: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct DisputeOpenedEvent {
    pub dispute_id: Uuid,
    pub order_id: Uuid,
    pub delivery_id: Option<Uuid>,
    pub dispute_type: String,
    pub raised_by: Uuid,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct DisputeResolvedEvent {
    pub dispute_id: Uuid,
    pub order_id: Uuid,
    pub resolution: String,
    pub occurred_at: DateTime<Utc>,
}

/// Envelope published on the outbound event bus. Consumers (notification
/// dispatch, analytics) subscribe to the whole stream and filter by type.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    RfqTransitioned(RfqTransitionedEvent),
    QuoteSubmitted(QuoteSubmittedEvent),
    QuoteWithdrawn(QuoteWithdrawnEvent),
    RfqAwarded(RfqAwardedEvent),
    DeliveryRecorded(DeliveryRecordedEvent),
    DeliveryReviewed(DeliveryReviewedEvent),
    DisputeOpened(DisputeOpenedEvent),
    DisputeResolved(DisputeResolvedEvent),
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::RfqTransitioned(_) => "rfq.transitioned",
            DomainEvent::QuoteSubmitted(_) => "quote.submitted",
            DomainEvent::QuoteWithdrawn(_) => "quote.withdrawn",
            DomainEvent::RfqAwarded(_) => "rfq.awarded",
            DomainEvent::DeliveryRecorded(_) => "delivery.recorded",
            DomainEvent::DeliveryReviewed(_) => "delivery.reviewed",
            DomainEvent::DisputeOpened(_) => "dispute.opened",
            DomainEvent::DisputeResolved(_) => "dispute.resolved",
        }
    }
}
