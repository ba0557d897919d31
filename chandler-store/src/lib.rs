pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod order_repo;
pub mod quote_repo;
pub mod rfq_repo;
pub mod supplier_repo;

pub use app_config::{BusinessRules, Config};
pub use catalog_repo::StoreCatalogRepository;
pub use database::Database;
pub use order_repo::{StoreDeliveryRepository, StoreDisputeRepository, StoreOrderRepository};
pub use quote_repo::StoreQuoteRepository;
pub use rfq_repo::StoreRfqRepository;
pub use supplier_repo::StoreSupplierRepository;
