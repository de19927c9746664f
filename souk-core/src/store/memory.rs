//! In-Memory Store
//!
//! Thread-safe in-memory implementation of the store interfaces, used by
//! tests and the development server. Conditional updates and increments
//! run inside a single write-lock critical section, matching the atomic
//! conditional-update guarantee the production document store provides.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AccountStore, ListingStore, ReferralEdgeStore, StoreStats, TransactionStore};
use crate::error::MarketResult;
use crate::types::{
    Account, AccountCounter, AccountId, EscrowTransaction, Listing, ListingId, ListingStatus,
    ReferralEdge, ReferralLevel, TransactionId, TransactionStatus,
};

/// Key of the referral-edge uniqueness invariant
type EdgeKey = (AccountId, AccountId, ReferralLevel);

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
    listings: Arc<RwLock<HashMap<ListingId, Listing>>>,
    transactions: Arc<RwLock<HashMap<TransactionId, EscrowTransaction>>>,
    // Keyed by triple, so the uniqueness invariant holds by construction.
    edges: Arc<RwLock<HashMap<EdgeKey, ReferralEdge>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data
    pub async fn clear(&self) {
        self.accounts.write().await.clear();
        self.listings.write().await.clear();
        self.transactions.write().await.clear();
        self.edges.write().await.clear();
    }

    /// Object counts for the stats endpoint
    pub async fn stats(&self) -> StoreStats {
        let transactions = self.transactions.read().await;
        let open_transactions = transactions
            .values()
            .filter(|t| t.status == TransactionStatus::InEscrow)
            .count() as u64;

        StoreStats {
            total_accounts: self.accounts.read().await.len() as u64,
            total_listings: self.listings.read().await.len() as u64,
            total_transactions: transactions.len() as u64,
            open_transactions,
            total_edges: self.edges.read().await.len() as u64,
        }
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn get(&self, id: &ListingId) -> MarketResult<Option<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings.get(id).cloned())
    }

    async fn insert(&self, listing: Listing) -> MarketResult<()> {
        let mut listings = self.listings.write().await;
        listings.insert(listing.id.clone(), listing);
        Ok(())
    }

    async fn compare_and_set_status(
        &self,
        id: &ListingId,
        expected: ListingStatus,
        new: ListingStatus,
    ) -> MarketResult<bool> {
        let mut listings = self.listings.write().await;
        match listings.get_mut(id) {
            Some(listing) if listing.status == expected => {
                listing.status = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(&self, id: &AccountId) -> MarketResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn insert(&self, account: Account) -> MarketResult<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn increment_counter(
        &self,
        id: &AccountId,
        counter: AccountCounter,
        delta: u64,
    ) -> MarketResult<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(id) {
            Some(account) => {
                match counter {
                    AccountCounter::TotalSales => account.total_sales += delta,
                    AccountCounter::TotalPurchases => account.total_purchases += delta,
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert(&self, transaction: EscrowTransaction) -> MarketResult<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.id.clone(), transaction);
        Ok(())
    }

    async fn find(&self, id: &TransactionId) -> MarketResult<Option<EscrowTransaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(id).cloned())
    }

    async fn find_by_participant(
        &self,
        account_id: &AccountId,
    ) -> MarketResult<Vec<EscrowTransaction>> {
        let transactions = self.transactions.read().await;
        let mut matches: Vec<EscrowTransaction> = transactions
            .values()
            .filter(|t| t.buyer_id == *account_id || t.seller_id == *account_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn transition(
        &self,
        id: &TransactionId,
        expected: TransactionStatus,
        new: TransactionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> MarketResult<bool> {
        let mut transactions = self.transactions.write().await;
        match transactions.get_mut(id) {
            Some(tx) if tx.status == expected && tx.status.can_transition_to(new) => {
                // Double-release guard, independent of the status check.
                if new == TransactionStatus::Completed && tx.released {
                    return Ok(false);
                }
                tx.status = new;
                tx.updated_at = Utc::now();
                if new == TransactionStatus::Completed {
                    tx.released = true;
                    tx.completed_at = completed_at.or_else(|| Some(Utc::now()));
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ReferralEdgeStore for MemoryStore {
    async fn find_one(
        &self,
        referrer_id: &AccountId,
        referred_id: &AccountId,
        level: ReferralLevel,
    ) -> MarketResult<Option<ReferralEdge>> {
        let edges = self.edges.read().await;
        Ok(edges
            .get(&(referrer_id.clone(), referred_id.clone(), level))
            .cloned())
    }

    async fn insert_if_absent(&self, edge: ReferralEdge) -> MarketResult<bool> {
        let mut edges = self.edges.write().await;
        let key = (edge.referrer_id.clone(), edge.referred_id.clone(), edge.level);
        if edges.contains_key(&key) {
            return Ok(false);
        }
        edges.insert(key, edge);
        Ok(true)
    }

    async fn credit(
        &self,
        referrer_id: &AccountId,
        referred_id: &AccountId,
        level: ReferralLevel,
        earnings_delta: Decimal,
    ) -> MarketResult<bool> {
        let mut edges = self.edges.write().await;
        match edges.get_mut(&(referrer_id.clone(), referred_id.clone(), level)) {
            Some(edge) => {
                edge.total_earnings += earnings_delta;
                edge.transaction_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_all_by_referrer(
        &self,
        referrer_id: &AccountId,
    ) -> MarketResult<Vec<ReferralEdge>> {
        let edges = self.edges.read().await;
        let mut matches: Vec<ReferralEdge> = edges
            .values()
            .filter(|e| e.referrer_id == *referrer_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn test_listing(id: &str, seller: &str, price: i64) -> Listing {
        Listing::new(
            ListingId::new(id),
            AccountId::new(seller),
            "Test listing",
            Decimal::new(price, 0),
        )
    }

    fn test_transaction(listing: &str, buyer: &str, seller: &str) -> EscrowTransaction {
        EscrowTransaction::open(
            ListingId::new(listing),
            AccountId::new(buyer),
            AccountId::new(seller),
            Decimal::new(1_000, 0),
            PaymentMethod::Cib,
            None,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_listing_cas_happy_path() {
        let store = MemoryStore::new();
        let listing = test_listing("listing:1", "account:s", 500);
        ListingStore::insert(&store, listing).await.unwrap();

        let claimed = store
            .compare_and_set_status(
                &ListingId::new("listing:1"),
                ListingStatus::Available,
                ListingStatus::Pending,
            )
            .await
            .unwrap();
        assert!(claimed);

        let listing = ListingStore::get(&store, &ListingId::new("listing:1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn test_listing_cas_loses_on_wrong_state() {
        let store = MemoryStore::new();
        let mut listing = test_listing("listing:1", "account:s", 500);
        listing.status = ListingStatus::Sold;
        ListingStore::insert(&store, listing).await.unwrap();

        let claimed = store
            .compare_and_set_status(
                &ListingId::new("listing:1"),
                ListingStatus::Available,
                ListingStatus::Pending,
            )
            .await
            .unwrap();
        assert!(!claimed);
    }

    #[tokio::test]
    async fn test_listing_cas_missing_listing() {
        let store = MemoryStore::new();
        let claimed = store
            .compare_and_set_status(
                &ListingId::new("listing:none"),
                ListingStatus::Available,
                ListingStatus::Pending,
            )
            .await
            .unwrap();
        assert!(!claimed);
    }

    #[tokio::test]
    async fn test_transaction_transition_completes_once() {
        let store = MemoryStore::new();
        let tx = test_transaction("listing:1", "account:b", "account:s");
        let id = tx.id.clone();
        TransactionStore::insert(&store, tx).await.unwrap();

        let first = store
            .transition(
                &id,
                TransactionStatus::InEscrow,
                TransactionStatus::Completed,
                None,
            )
            .await
            .unwrap();
        assert!(first);

        let second = store
            .transition(
                &id,
                TransactionStatus::InEscrow,
                TransactionStatus::Completed,
                None,
            )
            .await
            .unwrap();
        assert!(!second);

        let stored = store.find(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Completed);
        assert!(stored.released);
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_transaction_invalid_transition_rejected() {
        let store = MemoryStore::new();
        let tx = test_transaction("listing:1", "account:b", "account:s");
        let id = tx.id.clone();
        TransactionStore::insert(&store, tx).await.unwrap();

        store
            .transition(
                &id,
                TransactionStatus::InEscrow,
                TransactionStatus::Cancelled,
                None,
            )
            .await
            .unwrap();

        // Terminal states admit no further transitions.
        let reopened = store
            .transition(
                &id,
                TransactionStatus::Cancelled,
                TransactionStatus::Completed,
                None,
            )
            .await
            .unwrap();
        assert!(!reopened);
    }

    #[tokio::test]
    async fn test_find_by_participant_both_sides_newest_first() {
        let store = MemoryStore::new();
        let as_buyer = test_transaction("listing:1", "account:x", "account:s");
        let as_seller = test_transaction("listing:2", "account:b", "account:x");
        let unrelated = test_transaction("listing:3", "account:b", "account:s");
        TransactionStore::insert(&store, as_buyer).await.unwrap();
        TransactionStore::insert(&store, as_seller).await.unwrap();
        TransactionStore::insert(&store, unrelated).await.unwrap();

        let history = store
            .find_by_participant(&AccountId::new("account:x"))
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].created_at >= history[1].created_at);
    }

    #[tokio::test]
    async fn test_edge_uniqueness() {
        let store = MemoryStore::new();
        let edge = ReferralEdge::new(
            AccountId::new("account:r"),
            AccountId::new("account:b"),
            ReferralLevel::Level1,
        );
        assert!(store.insert_if_absent(edge.clone()).await.unwrap());
        assert!(!store.insert_if_absent(edge).await.unwrap());
    }

    #[tokio::test]
    async fn test_edge_credit_accumulates() {
        let store = MemoryStore::new();
        let referrer = AccountId::new("account:r");
        let referred = AccountId::new("account:b");
        let edge = ReferralEdge::new(referrer.clone(), referred.clone(), ReferralLevel::Level1);
        store.insert_if_absent(edge).await.unwrap();

        for _ in 0..3 {
            let credited = store
                .credit(&referrer, &referred, ReferralLevel::Level1, Decimal::new(250, 0))
                .await
                .unwrap();
            assert!(credited);
        }

        let edge = store
            .find_one(&referrer, &referred, ReferralLevel::Level1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edge.total_earnings, Decimal::new(750, 0));
        assert_eq!(edge.transaction_count, 3);
    }

    #[tokio::test]
    async fn test_edge_credit_missing_edge() {
        let store = MemoryStore::new();
        let credited = store
            .credit(
                &AccountId::new("account:r"),
                &AccountId::new("account:b"),
                ReferralLevel::Level2,
                Decimal::new(250, 0),
            )
            .await
            .unwrap();
        assert!(!credited);
    }

    #[tokio::test]
    async fn test_concurrent_credits_accumulate_exactly() {
        let store = Arc::new(MemoryStore::new());
        let referrer = AccountId::new("account:r");
        let referred = AccountId::new("account:b");
        let edge = ReferralEdge::new(referrer.clone(), referred.clone(), ReferralLevel::Level1);
        store.insert_if_absent(edge).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let referrer = referrer.clone();
            let referred = referred.clone();
            handles.push(tokio::spawn(async move {
                store
                    .credit(&referrer, &referred, ReferralLevel::Level1, Decimal::new(10, 0))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        let edge = store
            .find_one(&referrer, &referred, ReferralLevel::Level1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edge.total_earnings, Decimal::new(160, 0));
        assert_eq!(edge.transaction_count, 16);
    }

    #[tokio::test]
    async fn test_stats_counts() {
        let store = MemoryStore::new();
        AccountStore::insert(
            &store,
            Account::new(AccountId::new("account:a"), "A", "AAAA"),
        )
        .await
        .unwrap();
        ListingStore::insert(&store, test_listing("listing:1", "account:a", 100))
            .await
            .unwrap();
        TransactionStore::insert(&store, test_transaction("listing:1", "account:b", "account:a"))
            .await
            .unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.total_accounts, 1);
        assert_eq!(stats.total_listings, 1);
        assert_eq!(stats.total_transactions, 1);
        assert_eq!(stats.open_transactions, 1);
        assert_eq!(stats.total_edges, 0);
    }
}
