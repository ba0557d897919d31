use async_trait::async_trait;
use chandler_core::DomainError;
use uuid::Uuid;

use crate::delivery::Delivery;
use crate::dispute::Dispute;
use crate::models::{Order, VendorOrder};

/// Repository trait for the order graph. `create_order_graph` persists the
/// order and all its vendor orders in one atomic mutation so a half-written
/// award is never observable.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order_graph(
        &self,
        order: Order,
        vendor_orders: Vec<VendorOrder>,
    ) -> Result<Order, DomainError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    async fn find_order_by_rfq(&self, rfq_id: Uuid) -> Result<Option<Order>, DomainError>;

    async fn list_orders(
        &self,
        buyer_organization_id: Option<Uuid>,
    ) -> Result<Vec<Order>, DomainError>;

    async fn update_order(&self, order: Order) -> Result<Order, DomainError>;

    async fn get_vendor_order(&self, id: Uuid) -> Result<Option<VendorOrder>, DomainError>;

    async fn list_vendor_orders(
        &self,
        order_id: Option<Uuid>,
        supplier_organization_id: Option<Uuid>,
    ) -> Result<Vec<VendorOrder>, DomainError>;

    async fn update_vendor_order(&self, vendor_order: VendorOrder)
        -> Result<VendorOrder, DomainError>;
}

#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    async fn create_delivery(&self, delivery: Delivery) -> Result<Delivery, DomainError>;

    async fn get_delivery(&self, id: Uuid) -> Result<Option<Delivery>, DomainError>;

    async fn update_delivery(&self, delivery: Delivery) -> Result<Delivery, DomainError>;

    async fn list_deliveries(
        &self,
        vendor_order_id: Option<Uuid>,
    ) -> Result<Vec<Delivery>, DomainError>;
}

#[async_trait]
pub trait DisputeRepository: Send + Sync {
    async fn create_dispute(&self, dispute: Dispute) -> Result<Dispute, DomainError>;

    async fn get_dispute(&self, id: Uuid) -> Result<Option<Dispute>, DomainError>;

    async fn update_dispute(&self, dispute: Dispute) -> Result<Dispute, DomainError>;

    async fn list_disputes(
        &self,
        order_id: Option<Uuid>,
        delivery_id: Option<Uuid>,
    ) -> Result<Vec<Dispute>, DomainError>;
}
