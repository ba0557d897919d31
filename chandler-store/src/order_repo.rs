use async_trait::async_trait;
use chandler_core::DomainError;
use std::sync::Arc;
use uuid::Uuid;

use chandler_order::delivery::Delivery;
use chandler_order::dispute::Dispute;
use chandler_order::models::{Order, VendorOrder};
use chandler_order::repository::{DeliveryRepository, DisputeRepository, OrderRepository};

use crate::database::Database;

pub struct StoreOrderRepository {
    db: Arc<Database>,
}

impl StoreOrderRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create_order_graph(
        &self,
        order: Order,
        new_vendor_orders: Vec<VendorOrder>,
    ) -> Result<Order, DomainError> {
        // Both write locks are held so the order never appears without its
        // vendor orders.
        let mut orders = self.db.orders.write().await;
        let mut vendor_orders = self.db.vendor_orders.write().await;

        if orders.values().any(|o| o.rfq_id == order.rfq_id) {
            return Err(DomainError::conflict(format!(
                "RFQ {} already has a materialized order",
                order.rfq_id
            )));
        }
        for vendor_order in new_vendor_orders {
            vendor_orders.insert(vendor_order.id, vendor_order);
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.db.orders.read().await.get(&id).cloned())
    }

    async fn find_order_by_rfq(&self, rfq_id: Uuid) -> Result<Option<Order>, DomainError> {
        let orders = self.db.orders.read().await;
        Ok(orders.values().find(|o| o.rfq_id == rfq_id).cloned())
    }

    async fn list_orders(
        &self,
        buyer_organization_id: Option<Uuid>,
    ) -> Result<Vec<Order>, DomainError> {
        let orders = self.db.orders.read().await;
        let mut matched: Vec<Order> = orders
            .values()
            .filter(|o| buyer_organization_id.map_or(true, |org| o.buyer_organization_id == org))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn update_order(&self, order: Order) -> Result<Order, DomainError> {
        let mut orders = self.db.orders.write().await;
        if !orders.contains_key(&order.id) {
            return Err(DomainError::not_found(format!("order {}", order.id)));
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_vendor_order(&self, id: Uuid) -> Result<Option<VendorOrder>, DomainError> {
        Ok(self.db.vendor_orders.read().await.get(&id).cloned())
    }

    async fn list_vendor_orders(
        &self,
        order_id: Option<Uuid>,
        supplier_organization_id: Option<Uuid>,
    ) -> Result<Vec<VendorOrder>, DomainError> {
        let vendor_orders = self.db.vendor_orders.read().await;
        let mut matched: Vec<VendorOrder> = vendor_orders
            .values()
            .filter(|vo| {
                order_id.map_or(true, |id| vo.order_id == id)
                    && supplier_organization_id
                        .map_or(true, |org| vo.supplier_organization_id == org)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }

    async fn update_vendor_order(
        &self,
        vendor_order: VendorOrder,
    ) -> Result<VendorOrder, DomainError> {
        let mut vendor_orders = self.db.vendor_orders.write().await;
        if !vendor_orders.contains_key(&vendor_order.id) {
            return Err(DomainError::not_found(format!("vendor order {}", vendor_order.id)));
        }
        vendor_orders.insert(vendor_order.id, vendor_order.clone());
        Ok(vendor_order)
    }
}

pub struct StoreDeliveryRepository {
    db: Arc<Database>,
}

impl StoreDeliveryRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeliveryRepository for StoreDeliveryRepository {
    async fn create_delivery(&self, delivery: Delivery) -> Result<Delivery, DomainError> {
        let mut deliveries = self.db.deliveries.write().await;
        deliveries.insert(delivery.id, delivery.clone());
        Ok(delivery)
    }

    async fn get_delivery(&self, id: Uuid) -> Result<Option<Delivery>, DomainError> {
        Ok(self.db.deliveries.read().await.get(&id).cloned())
    }

    async fn update_delivery(&self, delivery: Delivery) -> Result<Delivery, DomainError> {
        let mut deliveries = self.db.deliveries.write().await;
        if !deliveries.contains_key(&delivery.id) {
            return Err(DomainError::not_found(format!("delivery {}", delivery.id)));
        }
        deliveries.insert(delivery.id, delivery.clone());
        Ok(delivery)
    }

    async fn list_deliveries(
        &self,
        vendor_order_id: Option<Uuid>,
    ) -> Result<Vec<Delivery>, DomainError> {
        let deliveries = self.db.deliveries.read().await;
        let mut matched: Vec<Delivery> = deliveries
            .values()
            .filter(|d| vendor_order_id.map_or(true, |id| d.vendor_order_id == id))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }
}

pub struct StoreDisputeRepository {
    db: Arc<Database>,
}

impl StoreDisputeRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DisputeRepository for StoreDisputeRepository {
    async fn create_dispute(&self, dispute: Dispute) -> Result<Dispute, DomainError> {
        let mut disputes = self.db.disputes.write().await;
        disputes.insert(dispute.id, dispute.clone());
        Ok(dispute)
    }

    async fn get_dispute(&self, id: Uuid) -> Result<Option<Dispute>, DomainError> {
        Ok(self.db.disputes.read().await.get(&id).cloned())
    }

    async fn update_dispute(&self, dispute: Dispute) -> Result<Dispute, DomainError> {
        let mut disputes = self.db.disputes.write().await;
        if !disputes.contains_key(&dispute.id) {
            return Err(DomainError::not_found(format!("dispute {}", dispute.id)));
        }
        disputes.insert(dispute.id, dispute.clone());
        Ok(dispute)
    }

    async fn list_disputes(
        &self,
        order_id: Option<Uuid>,
        delivery_id: Option<Uuid>,
    ) -> Result<Vec<Dispute>, DomainError> {
        let disputes = self.db.disputes.read().await;
        let mut matched: Vec<Dispute> = disputes
            .values()
            .filter(|d| {
                order_id.map_or(true, |id| d.order_id == id)
                    && delivery_id.map_or(true, |id| d.delivery_id == Some(id))
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }
}
