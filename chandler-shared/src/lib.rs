pub mod bus;
pub mod models;
pub mod pii;

pub use bus::EventBus;
pub use models::events::DomainEvent;
