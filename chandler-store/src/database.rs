use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use chandler_catalog::product::{Product, SupplierProduct};
use chandler_core::supplier::SupplierProfile;
use chandler_order::delivery::Delivery;
use chandler_order::dispute::Dispute;
use chandler_order::models::{Order, VendorOrder};
use chandler_quote::models::Quote;
use chandler_rfq::engine::Transition;
use chandler_rfq::invitation::Invitation;
use chandler_rfq::models::Rfq;

/// In-memory backing store. One table per aggregate; repositories take the
/// locks they need per call, multi-table mutations (award, cancel cascade)
/// hold every involved write lock for the duration of the mutation.
#[derive(Default)]
pub struct Database {
    pub rfqs: RwLock<HashMap<Uuid, Rfq>>,
    /// Append-only, keyed by RFQ.
    pub transitions: RwLock<HashMap<Uuid, Vec<Transition>>>,
    /// Keyed by RFQ; at most one invitation per (rfq, supplier).
    pub invitations: RwLock<HashMap<Uuid, Vec<Invitation>>>,
    pub quotes: RwLock<HashMap<Uuid, Quote>>,
    pub orders: RwLock<HashMap<Uuid, Order>>,
    pub vendor_orders: RwLock<HashMap<Uuid, VendorOrder>>,
    pub deliveries: RwLock<HashMap<Uuid, Delivery>>,
    pub disputes: RwLock<HashMap<Uuid, Dispute>>,
    pub products: RwLock<HashMap<Uuid, Product>>,
    pub supplier_products: RwLock<HashMap<Uuid, SupplierProduct>>,
    pub supplier_profiles: RwLock<HashMap<Uuid, SupplierProfile>>,
}

impl Database {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}
