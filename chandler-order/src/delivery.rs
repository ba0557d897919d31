use chandler_core::DomainError;
use chandler_shared::pii::Masked;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{OrderLineItem, VendorOrder};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Dispatched,
    InTransit,
    Delivered,
    Accepted,
    Disputed,
    Rejected,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "PENDING",
            DeliveryStatus::Dispatched => "DISPATCHED",
            DeliveryStatus::InTransit => "IN_TRANSIT",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Accepted => "ACCEPTED",
            DeliveryStatus::Disputed => "DISPUTED",
            DeliveryStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-line delivered/accepted quantities against the ordered quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryItem {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub order_line_item_id: Uuid,
    pub quantity_ordered: Decimal,
    pub quantity_delivered: Option<Decimal>,
    pub quantity_accepted: Option<Decimal>,
}

/// Evidence captured at the quay when the goods change hands. Receiver name
/// is masked in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofOfDelivery {
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    pub gps_accuracy_meters: Option<f64>,
    pub receiver_name: Masked<String>,
    pub receiver_designation: Option<String>,
    pub signature_ref: Option<String>,
    pub photo_refs: Vec<String>,
    pub delivered_at: DateTime<Utc>,
}

/// One delivery leg against a vendor order. A vendor order can have several
/// legs (split shipments), each reviewed independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub order_id: Uuid,
    pub vendor_order_id: Uuid,
    pub fulfillment_id: Option<Uuid>,
    pub status: DeliveryStatus,
    pub items: Vec<DeliveryItem>,
    pub proof_of_delivery: Option<ProofOfDelivery>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recorded quantities for one line, keyed by the order line it fulfils.
#[derive(Debug, Clone)]
pub struct RecordedQuantity {
    pub order_line_item_id: Uuid,
    pub quantity_delivered: Decimal,
}

impl Delivery {
    /// Create a pending delivery covering every line of the vendor order.
    pub fn new(vendor_order: &VendorOrder, now: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        let items = vendor_order
            .line_items
            .iter()
            .map(|line: &OrderLineItem| DeliveryItem {
                id: Uuid::new_v4(),
                delivery_id: id,
                order_line_item_id: line.id,
                quantity_ordered: line.quantity,
                quantity_delivered: None,
                quantity_accepted: None,
            })
            .collect();
        Self {
            id,
            order_id: vendor_order.order_id,
            vendor_order_id: vendor_order.id,
            fulfillment_id: None,
            status: DeliveryStatus::Pending,
            items,
            proof_of_delivery: None,
            dispatched_at: None,
            delivered_at: None,
            reviewed_at: None,
            review_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn guard(&self, expected: DeliveryStatus, target: DeliveryStatus) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::invalid_transition("delivery", self.status, target));
        }
        Ok(())
    }

    /// PENDING -> DISPATCHED.
    pub fn dispatch(
        &mut self,
        fulfillment_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.guard(DeliveryStatus::Pending, DeliveryStatus::Dispatched)?;
        self.status = DeliveryStatus::Dispatched;
        self.fulfillment_id = fulfillment_id;
        self.dispatched_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// DISPATCHED -> IN_TRANSIT.
    pub fn mark_in_transit(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard(DeliveryStatus::Dispatched, DeliveryStatus::InTransit)?;
        self.status = DeliveryStatus::InTransit;
        self.updated_at = now;
        Ok(())
    }

    /// DISPATCHED | IN_TRANSIT -> DELIVERED. Records the delivered quantity
    /// for every line plus the proof of delivery. Each delivered quantity
    /// must satisfy `0 <= delivered <= ordered`.
    pub fn record(
        &mut self,
        quantities: &[RecordedQuantity],
        proof: ProofOfDelivery,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !matches!(self.status, DeliveryStatus::Dispatched | DeliveryStatus::InTransit) {
            return Err(DomainError::invalid_transition(
                "delivery",
                self.status,
                DeliveryStatus::Delivered,
            ));
        }
        for (index, item) in self.items.iter().enumerate() {
            let recorded = quantities
                .iter()
                .find(|q| q.order_line_item_id == item.order_line_item_id)
                .ok_or_else(|| {
                    DomainError::validation(
                        format!("items[{index}].quantity_delivered"),
                        "delivered quantity is required for every line",
                    )
                })?;
            if recorded.quantity_delivered < Decimal::ZERO
                || recorded.quantity_delivered > item.quantity_ordered
            {
                return Err(DomainError::validation(
                    format!("items[{index}].quantity_delivered"),
                    format!(
                        "delivered quantity must be between 0 and the ordered {}",
                        item.quantity_ordered
                    ),
                ));
            }
        }
        for item in self.items.iter_mut() {
            let recorded = quantities
                .iter()
                .find(|q| q.order_line_item_id == item.order_line_item_id)
                .expect("validated above");
            item.quantity_delivered = Some(recorded.quantity_delivered);
        }
        self.status = DeliveryStatus::Delivered;
        self.proof_of_delivery = Some(proof);
        self.delivered_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// DELIVERED -> ACCEPTED. The buyer sets the accepted quantity per line;
    /// every line must be reviewed and `accepted <= delivered`.
    pub fn accept(
        &mut self,
        accepted: &[(Uuid, Decimal)],
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.guard(DeliveryStatus::Delivered, DeliveryStatus::Accepted)?;
        for (index, item) in self.items.iter().enumerate() {
            let delivered = item.quantity_delivered.ok_or_else(|| {
                DomainError::conflict("delivery has unrecorded lines and cannot be accepted")
            })?;
            let (_, quantity_accepted) = accepted
                .iter()
                .find(|(line_id, _)| *line_id == item.order_line_item_id)
                .ok_or_else(|| {
                    DomainError::validation(
                        format!("items[{index}].quantity_accepted"),
                        "accepted quantity is required for every line",
                    )
                })?;
            if *quantity_accepted < Decimal::ZERO || *quantity_accepted > delivered {
                return Err(DomainError::validation(
                    format!("items[{index}].quantity_accepted"),
                    "accepted quantity must be between 0 and the delivered quantity",
                ));
            }
        }
        for item in self.items.iter_mut() {
            let (_, quantity_accepted) = accepted
                .iter()
                .find(|(line_id, _)| *line_id == item.order_line_item_id)
                .expect("validated above");
            item.quantity_accepted = Some(*quantity_accepted);
        }
        self.status = DeliveryStatus::Accepted;
        self.review_note = note;
        self.reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// DELIVERED -> DISPUTED. A reason is required; the dispute record itself
    /// is opened by the caller.
    pub fn dispute(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard(DeliveryStatus::Delivered, DeliveryStatus::Disputed)?;
        if reason.trim().is_empty() {
            return Err(DomainError::validation("reason", "dispute reason is required"));
        }
        self.status = DeliveryStatus::Disputed;
        self.review_note = Some(reason.to_string());
        self.reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// DELIVERED -> REJECTED. Whole-delivery refusal; accepted quantities
    /// are zeroed.
    pub fn reject(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard(DeliveryStatus::Delivered, DeliveryStatus::Rejected)?;
        if reason.trim().is_empty() {
            return Err(DomainError::validation("reason", "rejection reason is required"));
        }
        for item in self.items.iter_mut() {
            item.quantity_accepted = Some(Decimal::ZERO);
        }
        self.status = DeliveryStatus::Rejected;
        self.review_note = Some(reason.to_string());
        self.reviewed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}
