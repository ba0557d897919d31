pub mod award;
pub mod delivery;
pub mod dispute;
pub mod models;
pub mod repository;
pub mod settlement;

pub use award::{AwardLocks, AwardService};
pub use delivery::{Delivery, DeliveryItem, DeliveryStatus, ProofOfDelivery, RecordedQuantity};
pub use dispute::{Dispute, DisputeComment, DisputeStatus, DisputeType};
pub use models::{Fulfillment, Order, OrderLineItem, OrderStatus, VendorOrder, VendorOrderStatus};
pub use repository::{DeliveryRepository, DisputeRepository, OrderRepository};
pub use settlement::{reconcile, CreditAdjustment, SettlementLine, SettlementStatement};
