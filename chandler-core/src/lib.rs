pub mod error;
pub mod identity;
pub mod pagination;
pub mod supplier;
pub mod version;

pub use error::DomainError;
pub use identity::{Actor, ActorRole};
pub use pagination::{Page, PageParams};
