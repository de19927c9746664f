//! Core Data Model
//!
//! Typed records for the escrow settlement core. `Account` and `Listing`
//! are narrow views of collaborator-owned entities; `EscrowTransaction`
//! and `ReferralEdge` are owned and exclusively mutated by this crate.

pub mod account;
pub mod common;
pub mod listing;
pub mod referral;
pub mod transaction;

pub use account::{Account, AccountCounter};
pub use common::{AccountId, ListingId, PaymentMethod, TransactionId};
pub use listing::{Listing, ListingStatus};
pub use referral::{
    EdgeStatus, ReferralAggregate, ReferralEdge, ReferralEdgeDetail, ReferralLevel,
};
pub use transaction::{EscrowTransaction, ReferralPayout, TransactionStatus};
