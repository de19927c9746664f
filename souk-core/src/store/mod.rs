//! Store Interfaces
//!
//! The document store is an external collaborator; these traits are the
//! narrow read/write surface the settlement core consumes. Every
//! conditional update (`compare_and_set_status`, `transition`) and every
//! counter/earnings increment is a single atomic operation on the store —
//! the core never does read-modify-write across a call boundary, which is
//! what closes the double-release and double-purchase races.
//!
//! Implementations return `Ok(false)` when a conditional update loses its
//! precondition (record missing or not in the expected state) and reserve
//! `Err` for infrastructure failures (`MarketError::Unavailable`).

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::MarketResult;
use crate::types::{
    Account, AccountCounter, AccountId, EscrowTransaction, Listing, ListingId, ListingStatus,
    ReferralEdge, ReferralLevel, TransactionId, TransactionStatus,
};

/// Listing catalog surface
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetch a listing
    async fn get(&self, id: &ListingId) -> MarketResult<Option<Listing>>;

    /// Insert a listing (catalog collaborator / seeding)
    async fn insert(&self, listing: Listing) -> MarketResult<()>;

    /// Atomically move a listing from `expected` to `new` status.
    /// Returns false when the listing is missing or not in `expected`.
    async fn compare_and_set_status(
        &self,
        id: &ListingId,
        expected: ListingStatus,
        new: ListingStatus,
    ) -> MarketResult<bool>;
}

/// Account identity surface
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch an account
    async fn get(&self, id: &AccountId) -> MarketResult<Option<Account>>;

    /// Insert an account (identity collaborator / seeding)
    async fn insert(&self, account: Account) -> MarketResult<()>;

    /// Atomically add `delta` to one of the account's stat counters.
    /// Returns false when the account is missing.
    async fn increment_counter(
        &self,
        id: &AccountId,
        counter: AccountCounter,
        delta: u64,
    ) -> MarketResult<bool>;
}

/// Escrow transaction surface
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist a new transaction
    async fn insert(&self, transaction: EscrowTransaction) -> MarketResult<()>;

    /// Fetch a transaction
    async fn find(&self, id: &TransactionId) -> MarketResult<Option<EscrowTransaction>>;

    /// All transactions where the account is buyer or seller, newest first
    async fn find_by_participant(
        &self,
        account_id: &AccountId,
    ) -> MarketResult<Vec<EscrowTransaction>>;

    /// Atomically move a transaction from `expected` to `new` status,
    /// updating `updated_at`. Completing also sets `released` and stamps
    /// `completed_at` in the same critical section — this is the single
    /// commit point of a settlement. Returns false when the transaction is
    /// missing, not in `expected`, or already released.
    async fn transition(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> MarketResult<bool>;
}

/// Referral ledger surface
#[async_trait]
pub trait ReferralEdgeStore: Send + Sync {
    /// Fetch the edge for a (referrer, referred, level) triple
    async fn find_one(
        &self,
        referrer_id: &AccountId,
        referred_id: &AccountId,
        level: ReferralLevel,
    ) -> MarketResult<Option<ReferralEdge>>;

    /// Insert an edge unless its triple already exists.
    /// Returns false (leaving the existing edge untouched) on a duplicate.
    async fn insert_if_absent(&self, edge: ReferralEdge) -> MarketResult<bool>;

    /// Atomically add `earnings_delta` to the edge's earnings and bump its
    /// transaction count by one. Returns false when no edge matches.
    async fn credit(
        &self,
        referrer_id: &AccountId,
        referred_id: &AccountId,
        level: ReferralLevel,
        earnings_delta: Decimal,
    ) -> MarketResult<bool>;

    /// All edges where the account is the referrer
    async fn find_all_by_referrer(
        &self,
        referrer_id: &AccountId,
    ) -> MarketResult<Vec<ReferralEdge>>;
}

/// Object counts for the stats endpoint
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Accounts on record
    pub total_accounts: u64,
    /// Listings on record
    pub total_listings: u64,
    /// All transactions
    pub total_transactions: u64,
    /// Transactions still in escrow
    pub open_transactions: u64,
    /// Referral edges on record
    pub total_edges: u64,
}

pub use memory::MemoryStore;
