use chandler_core::DomainError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order status in the lifecycle. Derived from its vendor orders; the order
/// itself is a frozen snapshot of the awarded quote.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorOrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

impl VendorOrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, VendorOrderStatus::Completed | VendorOrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VendorOrderStatus::Pending => "PENDING",
            VendorOrderStatus::Confirmed => "CONFIRMED",
            VendorOrderStatus::Processing => "PROCESSING",
            VendorOrderStatus::Shipped => "SHIPPED",
            VendorOrderStatus::Delivered => "DELIVERED",
            VendorOrderStatus::Completed => "COMPLETED",
            VendorOrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for VendorOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single source of truth for a procurement purchase, created exactly
/// once from the awarded quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub reference_number: String,
    pub rfq_id: Uuid,
    pub quote_id: Uuid,
    pub buyer_organization_id: Uuid,
    pub vessel_name: Option<String>,
    pub delivery_port: String,
    pub delivery_date: Option<DateTime<Utc>>,
    pub currency: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Derive the order status from its vendor orders. Returns true if the
    /// status changed.
    pub fn refresh_status(&mut self, vendor_orders: &[VendorOrder], now: DateTime<Utc>) -> bool {
        if matches!(self.status, OrderStatus::Completed | OrderStatus::Cancelled) {
            return false;
        }
        let next = if vendor_orders
            .iter()
            .all(|vo| vo.status == VendorOrderStatus::Completed)
        {
            OrderStatus::Completed
        } else if vendor_orders
            .iter()
            .all(|vo| vo.status == VendorOrderStatus::Cancelled)
        {
            OrderStatus::Cancelled
        } else if vendor_orders
            .iter()
            .any(|vo| vo.status != VendorOrderStatus::Pending)
        {
            OrderStatus::InProgress
        } else {
            OrderStatus::Pending
        };
        if next != self.status {
            self.status = next;
            self.updated_at = now;
            return true;
        }
        false
    }
}

/// The supplier-scoped subset of an order. Line items are snapshots taken at
/// award time, never re-derived from the live quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorOrder {
    pub id: Uuid,
    pub order_id: Uuid,
    pub supplier_organization_id: Uuid,
    pub status: VendorOrderStatus,
    pub subtotal: Decimal,
    pub line_items: Vec<OrderLineItem>,
    pub fulfillments: Vec<Fulfillment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VendorOrder {
    fn guard(&self, expected: VendorOrderStatus, target: VendorOrderStatus) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::invalid_transition("vendor_order", self.status, target));
        }
        Ok(())
    }

    /// PENDING -> CONFIRMED (supplier acknowledges the order).
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard(VendorOrderStatus::Pending, VendorOrderStatus::Confirmed)?;
        self.status = VendorOrderStatus::Confirmed;
        self.updated_at = now;
        Ok(())
    }

    /// CONFIRMED -> PROCESSING.
    pub fn start_processing(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard(VendorOrderStatus::Confirmed, VendorOrderStatus::Processing)?;
        self.status = VendorOrderStatus::Processing;
        self.updated_at = now;
        Ok(())
    }

    /// PROCESSING -> SHIPPED. Creates the fulfillment record for this leg.
    pub fn ship(&mut self, now: DateTime<Utc>) -> Result<Fulfillment, DomainError> {
        self.guard(VendorOrderStatus::Processing, VendorOrderStatus::Shipped)?;
        self.status = VendorOrderStatus::Shipped;
        self.updated_at = now;
        let fulfillment = Fulfillment::new(self.id, now);
        self.fulfillments.push(fulfillment.clone());
        Ok(fulfillment)
    }

    /// SHIPPED -> DELIVERED. Set when a delivery against this vendor order
    /// is recorded.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard(VendorOrderStatus::Shipped, VendorOrderStatus::Delivered)?;
        self.status = VendorOrderStatus::Delivered;
        self.updated_at = now;
        Ok(())
    }

    /// DELIVERED -> COMPLETED.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.guard(VendorOrderStatus::Delivered, VendorOrderStatus::Completed)?;
        self.status = VendorOrderStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    /// Any non-terminal status -> CANCELLED.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_transition(
                "vendor_order",
                self.status,
                VendorOrderStatus::Cancelled,
            ));
        }
        self.status = VendorOrderStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    pub fn line_item(&self, id: Uuid) -> Option<&OrderLineItem> {
        self.line_items.iter().find(|item| item.id == id)
    }
}

/// Frozen copy of an awarded quote line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: Uuid,
    pub vendor_order_id: Uuid,
    pub rfq_line_item_id: Uuid,
    pub quote_line_item_id: Uuid,
    pub line_number: u32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_of_measure: String,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Fulfillment record created when a vendor order ships; each delivery leg
/// references one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fulfillment {
    pub id: Uuid,
    pub vendor_order_id: Uuid,
    pub reference: String,
    pub shipped_at: DateTime<Utc>,
}

impl Fulfillment {
    pub fn new(vendor_order_id: Uuid, shipped_at: DateTime<Utc>) -> Self {
        let id = Uuid::new_v4();
        // Format: FLF-{timestamp}-{short id}, human-quotable on the quay.
        let short = id.simple().to_string()[..8].to_uppercase();
        Self {
            id,
            vendor_order_id,
            reference: format!("FLF-{}-{}", shipped_at.timestamp(), short),
            shipped_at,
        }
    }
}

/// Generate an order reference number: PO-{yyyymmdd}-{short id}.
pub fn generate_reference_number(now: DateTime<Utc>) -> String {
    let short = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("PO-{}-{}", now.format("%Y%m%d"), short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendor_order() -> VendorOrder {
        VendorOrder {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            supplier_organization_id: Uuid::new_v4(),
            status: VendorOrderStatus::Pending,
            subtotal: Decimal::new(10000, 2),
            line_items: vec![],
            fulfillments: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_vendor_order_lifecycle() {
        let mut vo = vendor_order();
        let now = Utc::now();
        vo.confirm(now).unwrap();
        vo.start_processing(now).unwrap();
        let fulfillment = vo.ship(now).unwrap();
        assert!(fulfillment.reference.starts_with("FLF-"));
        assert_eq!(vo.fulfillments.len(), 1);
        vo.mark_delivered(now).unwrap();
        vo.complete(now).unwrap();
        assert_eq!(vo.status, VendorOrderStatus::Completed);
    }

    #[test]
    fn test_invalid_transition() {
        let mut vo = vendor_order();
        // Cannot go directly from Pending to Shipped.
        let err = vo.ship(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(vo.status, VendorOrderStatus::Pending);
    }

    #[test]
    fn test_cancel_blocked_after_completion() {
        let mut vo = vendor_order();
        let now = Utc::now();
        vo.confirm(now).unwrap();
        vo.start_processing(now).unwrap();
        vo.ship(now).unwrap();
        vo.mark_delivered(now).unwrap();
        vo.complete(now).unwrap();
        assert!(vo.cancel(now).is_err());
    }

    #[test]
    fn test_order_status_follows_vendor_orders() {
        let mut order = Order {
            id: Uuid::new_v4(),
            reference_number: generate_reference_number(Utc::now()),
            rfq_id: Uuid::new_v4(),
            quote_id: Uuid::new_v4(),
            buyer_organization_id: Uuid::new_v4(),
            vessel_name: None,
            delivery_port: "SGSIN".to_string(),
            delivery_date: None,
            currency: "USD".to_string(),
            total_amount: Decimal::new(10000, 2),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut vo = vendor_order();
        let now = Utc::now();

        assert!(!order.refresh_status(std::slice::from_ref(&vo), now));

        vo.confirm(now).unwrap();
        assert!(order.refresh_status(std::slice::from_ref(&vo), now));
        assert_eq!(order.status, OrderStatus::InProgress);

        vo.start_processing(now).unwrap();
        vo.ship(now).unwrap();
        vo.mark_delivered(now).unwrap();
        vo.complete(now).unwrap();
        assert!(order.refresh_status(std::slice::from_ref(&vo), now));
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[test]
    fn test_reference_number_format() {
        let reference = generate_reference_number(Utc::now());
        assert!(reference.starts_with("PO-"));
        assert_eq!(reference.split('-').count(), 3);
    }
}
