pub mod engine;
pub mod invitation;
pub mod models;
pub mod repository;

pub use engine::{replay_status, Transition, TransitionType};
pub use invitation::{Invitation, InvitationStatus};
pub use models::{AuctionType, Rfq, RfqLineItem, RfqStatus};
pub use repository::RfqRepository;
