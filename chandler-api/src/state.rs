use std::sync::Arc;

use chandler_catalog::repository::CatalogRepository;
use chandler_core::supplier::SupplierProfileRepository;
use chandler_order::award::AwardService;
use chandler_order::repository::{DeliveryRepository, DisputeRepository, OrderRepository};
use chandler_quote::repository::QuoteRepository;
use chandler_rfq::repository::RfqRepository;
use chandler_shared::bus::EventBus;
use chandler_store::{
    BusinessRules, Database, StoreCatalogRepository, StoreDeliveryRepository,
    StoreDisputeRepository, StoreOrderRepository, StoreQuoteRepository, StoreRfqRepository,
    StoreSupplierRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub rfqs: Arc<dyn RfqRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub deliveries: Arc<dyn DeliveryRepository>,
    pub disputes: Arc<dyn DisputeRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub suppliers: Arc<dyn SupplierProfileRepository>,
    pub award: Arc<AwardService>,
    pub bus: EventBus,
    pub business_rules: BusinessRules,
}

impl AppState {
    /// Wire every repository against one in-memory database.
    pub fn in_memory(business_rules: BusinessRules) -> Self {
        let db = Database::new();
        let bus = EventBus::default();
        let rfqs: Arc<dyn RfqRepository> = Arc::new(StoreRfqRepository::new(db.clone()));
        let quotes: Arc<dyn QuoteRepository> = Arc::new(StoreQuoteRepository::new(db.clone()));
        let orders: Arc<dyn OrderRepository> = Arc::new(StoreOrderRepository::new(db.clone()));
        let award = Arc::new(AwardService::new(
            rfqs.clone(),
            quotes.clone(),
            orders.clone(),
            bus.clone(),
        ));
        Self {
            rfqs,
            quotes,
            orders,
            deliveries: Arc::new(StoreDeliveryRepository::new(db.clone())),
            disputes: Arc::new(StoreDisputeRepository::new(db.clone())),
            catalog: Arc::new(StoreCatalogRepository::new(db.clone())),
            suppliers: Arc::new(StoreSupplierRepository::new(db)),
            award,
            bus,
            business_rules,
        }
    }
}
