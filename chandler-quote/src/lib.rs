pub mod ledger;
pub mod models;
pub mod ranking;
pub mod repository;

pub use models::{Quote, QuoteLineItem, QuoteStatus};
pub use repository::QuoteRepository;
