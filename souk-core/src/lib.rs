//! Souk Core - Escrow Ledger and Referral Graph Resolver
//!
//! This crate implements the settlement core of the Souk marketplace
//! backend: holding a purchase in escrow from creation until the buyer
//! confirms delivery, computing the platform commission and the two-level
//! referral payouts frozen into each transaction, and crediting the
//! referral ledger when escrow is released.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 souk-core                    │
//! │  ┌──────────────┐      ┌──────────────────┐  │
//! │  │ EscrowLedger │─────►│ ReferralResolver │  │
//! │  └──────────────┘      └──────────────────┘  │
//! │          │                      │            │
//! │          ▼                      ▼            │
//! │  ┌────────────────────────────────────────┐  │
//! │  │  store traits (listings, accounts,     │  │
//! │  │  transactions, referral edges)         │  │
//! │  └────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The store is an injected capability: the ledger and resolver are
//! constructed over the `store` traits and never hold mutable state of
//! their own, so tests (and the API crate) can run against the bundled
//! `MemoryStore` while production wires in a real document store.

pub mod constants;
pub mod error;
pub mod escrow;
pub mod referral;
pub mod store;
pub mod types;

// Re-export main types
pub use error::{MarketError, MarketResult};
pub use escrow::{CreatedEscrow, EscrowLedger, PaymentGateway};
pub use referral::{ReferralChain, ReferralResolver};
pub use store::{
    AccountStore, ListingStore, MemoryStore, ReferralEdgeStore, StoreStats, TransactionStore,
};
pub use types::*;

/// Core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
