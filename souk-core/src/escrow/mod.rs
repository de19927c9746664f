//! Escrow Ledger
//!
//! Owns the lifecycle of a purchase transaction from creation through
//! release or cancellation. Amounts are computed once at creation and
//! frozen; release is guarded by a single atomic status transition, so
//! concurrent confirmations settle exactly once.
//!
//! Settlement ordering: the transaction's in_escrow→completed transition
//! is the commit point. Listing, counter, and referral-edge writes happen
//! after it; a failure there is logged (and, for a missing referral edge,
//! surfaced as `Inconsistency`) rather than rolled back — the store offers
//! no cross-record transaction. A durable replay log keyed by transaction
//! id would hang off the commit point if one is ever needed.

pub mod gateway;

use chrono::Utc;
use std::sync::Arc;

use crate::constants::MAX_TRANSACTION_HISTORY;
use crate::error::{MarketError, MarketResult};
use crate::referral::ReferralResolver;
use crate::store::{AccountStore, ListingStore, TransactionStore};
use crate::types::{
    AccountCounter, AccountId, EscrowTransaction, ListingId, ListingStatus, PaymentMethod,
    ReferralLevel, TransactionId, TransactionStatus,
};

pub use gateway::PaymentGateway;

/// Result of opening an escrow transaction: the persisted record plus the
/// opaque payment-initiation reference for the external gateway.
#[derive(Debug, Clone)]
pub struct CreatedEscrow {
    /// The persisted transaction
    pub transaction: EscrowTransaction,
    /// Gateway redirect URL; not consumed by the core afterwards
    pub payment_url: String,
}

/// Escrow ledger over the injected stores and referral resolver.
pub struct EscrowLedger {
    listings: Arc<dyn ListingStore>,
    accounts: Arc<dyn AccountStore>,
    transactions: Arc<dyn TransactionStore>,
    resolver: Arc<ReferralResolver>,
    gateway: PaymentGateway,
}

impl EscrowLedger {
    /// Create a ledger over the given stores
    pub fn new(
        listings: Arc<dyn ListingStore>,
        accounts: Arc<dyn AccountStore>,
        transactions: Arc<dyn TransactionStore>,
        resolver: Arc<ReferralResolver>,
    ) -> Self {
        Self {
            listings,
            accounts,
            transactions,
            resolver,
            gateway: PaymentGateway::default(),
        }
    }

    /// Use a custom payment gateway
    pub fn with_gateway(mut self, gateway: PaymentGateway) -> Self {
        self.gateway = gateway;
        self
    }

    /// Open an escrow transaction for a purchase.
    ///
    /// Preconditions, first failure wins: the listing must exist, must be
    /// available, and must not belong to the buyer. All validation happens
    /// before any write; a precondition failure leaves no record behind.
    ///
    /// The listing is claimed with an atomic available→pending
    /// check-and-set before the transaction is inserted, so concurrent
    /// purchases of the same listing produce at most one transition — the
    /// loser fails the claim and writes nothing.
    pub async fn create_escrow(
        &self,
        buyer_id: &AccountId,
        listing_id: &ListingId,
        payment_method: PaymentMethod,
    ) -> MarketResult<CreatedEscrow> {
        let listing = self
            .listings
            .get(listing_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Listing", listing_id.as_str()))?;

        if listing.status != ListingStatus::Available {
            return Err(MarketError::invalid_state("listing is not available"));
        }
        if listing.seller_id == *buyer_id {
            return Err(MarketError::forbidden("cannot purchase your own listing"));
        }

        // Reports NotFound for a missing buyer before anything is written.
        let chain = self.resolver.resolve_chain(buyer_id).await?;

        let transaction = EscrowTransaction::open(
            listing.id.clone(),
            buyer_id.clone(),
            listing.seller_id.clone(),
            listing.price,
            payment_method,
            chain.level1,
            chain.level2,
        )?;

        let claimed = self
            .listings
            .compare_and_set_status(listing_id, ListingStatus::Available, ListingStatus::Pending)
            .await?;
        if !claimed {
            // Lost the claim to a concurrent purchase.
            return Err(MarketError::invalid_state("listing is not available"));
        }

        if let Err(e) = self.transactions.insert(transaction.clone()).await {
            // Give the listing back; the claim must not outlive the record.
            let restored = self
                .listings
                .compare_and_set_status(listing_id, ListingStatus::Pending, ListingStatus::Available)
                .await
                .unwrap_or(false);
            if !restored {
                tracing::warn!(
                    listing_id = %listing_id,
                    "failed to restore listing after aborted escrow creation"
                );
            }
            return Err(e);
        }

        tracing::info!(
            transaction_id = %transaction.id,
            listing_id = %listing_id,
            buyer_id = %buyer_id,
            seller_id = %transaction.seller_id,
            amount = %transaction.amount,
            referral_levels = chain_len(&transaction),
            "escrow transaction opened"
        );

        Ok(CreatedEscrow {
            payment_url: self.gateway.payment_url(&transaction),
            transaction,
        })
    }

    /// Release escrow after the buyer confirms delivery.
    ///
    /// Only the transaction's buyer may confirm, and only while the
    /// transaction is in escrow and unreleased. The in_escrow→completed
    /// transition is a single atomic check-and-set; when N confirmations
    /// race, exactly one passes it and performs the settlement, and the
    /// rest fail with no further writes.
    pub async fn confirm_delivery(
        &self,
        caller_id: &AccountId,
        transaction_id: &TransactionId,
    ) -> MarketResult<()> {
        let transaction = self
            .transactions
            .find(transaction_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Transaction", transaction_id.as_str()))?;

        if transaction.buyer_id != *caller_id {
            return Err(MarketError::forbidden("only the buyer may confirm delivery"));
        }
        if transaction.status != TransactionStatus::InEscrow {
            return Err(MarketError::invalid_state("transaction is not in escrow"));
        }
        if transaction.released {
            return Err(MarketError::invalid_state("escrow already released"));
        }

        // Commit point. Everything before this is validation; everything
        // after propagates a release that has already happened.
        let committed = self
            .transactions
            .transition(
                transaction_id,
                TransactionStatus::InEscrow,
                TransactionStatus::Completed,
                Some(Utc::now()),
            )
            .await?;
        if !committed {
            // A concurrent confirmation won the transition.
            return Err(MarketError::invalid_state("escrow already released"));
        }

        let listing_sold = self
            .listings
            .compare_and_set_status(
                &transaction.listing_id,
                ListingStatus::Pending,
                ListingStatus::Sold,
            )
            .await?;
        if !listing_sold {
            tracing::warn!(
                transaction_id = %transaction_id,
                listing_id = %transaction.listing_id,
                "listing was not pending at release"
            );
        }

        self.bump_counter(&transaction.seller_id, AccountCounter::TotalSales)
            .await?;
        self.bump_counter(&transaction.buyer_id, AccountCounter::TotalPurchases)
            .await?;

        if let Some(payout) = &transaction.referral_l1 {
            self.resolver
                .settle(
                    &payout.referrer_id,
                    &transaction.buyer_id,
                    ReferralLevel::Level1,
                    payout.amount,
                )
                .await?;
        }
        if let Some(payout) = &transaction.referral_l2 {
            self.resolver
                .settle(
                    &payout.referrer_id,
                    &transaction.buyer_id,
                    ReferralLevel::Level2,
                    payout.amount,
                )
                .await?;
        }

        tracing::info!(
            transaction_id = %transaction_id,
            buyer_id = %caller_id,
            seller_id = %transaction.seller_id,
            amount = %transaction.amount,
            seller_proceeds = %transaction.seller_proceeds(),
            "escrow released"
        );

        Ok(())
    }

    /// Abort an open escrow transaction, returning the listing to the
    /// catalog. Reserved for dispute handling; no route exposes it yet.
    pub async fn cancel_escrow(
        &self,
        caller_id: &AccountId,
        transaction_id: &TransactionId,
    ) -> MarketResult<()> {
        let transaction = self
            .transactions
            .find(transaction_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Transaction", transaction_id.as_str()))?;

        if transaction.buyer_id != *caller_id {
            return Err(MarketError::forbidden("only the buyer may cancel"));
        }
        if transaction.status != TransactionStatus::InEscrow {
            return Err(MarketError::invalid_state("transaction is not in escrow"));
        }

        let cancelled = self
            .transactions
            .transition(
                transaction_id,
                TransactionStatus::InEscrow,
                TransactionStatus::Cancelled,
                None,
            )
            .await?;
        if !cancelled {
            return Err(MarketError::invalid_state("transaction is not in escrow"));
        }

        let restored = self
            .listings
            .compare_and_set_status(
                &transaction.listing_id,
                ListingStatus::Pending,
                ListingStatus::Available,
            )
            .await?;
        if !restored {
            tracing::warn!(
                transaction_id = %transaction_id,
                listing_id = %transaction.listing_id,
                "listing was not pending at cancellation"
            );
        }

        tracing::info!(
            transaction_id = %transaction_id,
            listing_id = %transaction.listing_id,
            "escrow cancelled"
        );

        Ok(())
    }

    /// Transaction history for an account, buyer or seller side, newest
    /// first.
    pub async fn transactions_for(
        &self,
        account_id: &AccountId,
    ) -> MarketResult<Vec<EscrowTransaction>> {
        let mut transactions = self.transactions.find_by_participant(account_id).await?;
        transactions.truncate(MAX_TRANSACTION_HISTORY);
        Ok(transactions)
    }

    async fn bump_counter(&self, id: &AccountId, counter: AccountCounter) -> MarketResult<()> {
        let bumped = self.accounts.increment_counter(id, counter, 1).await?;
        if !bumped {
            tracing::warn!(
                account_id = %id,
                field = counter.field(),
                "account missing while updating stats"
            );
        }
        Ok(())
    }
}

fn chain_len(transaction: &EscrowTransaction) -> usize {
    transaction.referral_l1.iter().count() + transaction.referral_l2.iter().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, ReferralEdgeStore};
    use crate::types::{Account, Listing};
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<MemoryStore>,
        ledger: EscrowLedger,
        resolver: Arc<ReferralResolver>,
    }

    /// Seeds: seller with a 100000-priced listing, buyer referred by r1,
    /// r1 referred by r2, and both referral edges recorded.
    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let resolver = Arc::new(ReferralResolver::new(store.clone(), store.clone()));
        let ledger = EscrowLedger::new(
            store.clone(),
            store.clone(),
            store.clone(),
            resolver.clone(),
        );

        let accounts = [
            ("account:seller", None),
            ("account:r2", None),
            ("account:r1", Some("account:r2")),
            ("account:buyer", Some("account:r1")),
        ];
        for (id, referred_by) in accounts {
            let mut account = Account::new(AccountId::new(id), id, id.to_uppercase());
            if let Some(referrer) = referred_by {
                account = account.with_referrer(AccountId::new(referrer));
            }
            AccountStore::insert(store.as_ref(), account).await.unwrap();
        }

        resolver
            .record_edge(
                AccountId::new("account:r1"),
                AccountId::new("account:buyer"),
                ReferralLevel::Level1,
            )
            .await
            .unwrap();
        resolver
            .record_edge(
                AccountId::new("account:r2"),
                AccountId::new("account:buyer"),
                ReferralLevel::Level2,
            )
            .await
            .unwrap();

        ListingStore::insert(
            store.as_ref(),
            Listing::new(
                ListingId::new("listing:phone"),
                AccountId::new("account:seller"),
                "Samsung Galaxy S24 Ultra",
                Decimal::new(100_000, 0),
            ),
        )
        .await
        .unwrap();

        Fixture {
            store,
            ledger,
            resolver,
        }
    }

    fn buyer() -> AccountId {
        AccountId::new("account:buyer")
    }

    fn listing() -> ListingId {
        ListingId::new("listing:phone")
    }

    #[tokio::test]
    async fn test_create_escrow_snapshots_price_and_claims_listing() {
        let f = fixture().await;
        let created = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap();

        assert_eq!(created.transaction.amount, Decimal::new(100_000, 0));
        assert_eq!(created.transaction.status, TransactionStatus::InEscrow);
        assert!(!created.transaction.released);
        assert!(created.payment_url.contains(created.transaction.id.as_str()));

        let listing = ListingStore::get(f.store.as_ref(), &listing())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_escrow_worked_scenario() {
        // commission 2%, L1 0.25%, L2 0.25% on 100000
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        assert_eq!(tx.commission_amount, Decimal::new(2_000, 0));
        let l1 = tx.referral_l1.as_ref().unwrap();
        let l2 = tx.referral_l2.as_ref().unwrap();
        assert_eq!(l1.referrer_id, AccountId::new("account:r1"));
        assert_eq!(l1.amount, Decimal::new(250, 0));
        assert_eq!(l2.referrer_id, AccountId::new("account:r2"));
        assert_eq!(l2.amount, Decimal::new(250, 0));
    }

    #[tokio::test]
    async fn test_create_escrow_missing_listing() {
        let f = fixture().await;
        let result = f
            .ledger
            .create_escrow(&buyer(), &ListingId::new("listing:ghost"), PaymentMethod::Cib)
            .await;
        assert!(matches!(result, Err(MarketError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_escrow_unavailable_listing_writes_nothing() {
        let f = fixture().await;
        f.store
            .compare_and_set_status(&listing(), ListingStatus::Available, ListingStatus::Sold)
            .await
            .unwrap();

        let result = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await;
        assert!(matches!(result, Err(MarketError::InvalidState { .. })));

        // No transaction record, no listing mutation.
        assert!(f
            .ledger
            .transactions_for(&buyer())
            .await
            .unwrap()
            .is_empty());
        let listing = ListingStore::get(f.store.as_ref(), &listing())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.status, ListingStatus::Sold);
    }

    #[tokio::test]
    async fn test_create_escrow_own_listing_forbidden() {
        let f = fixture().await;
        let result = f
            .ledger
            .create_escrow(&AccountId::new("account:seller"), &listing(), PaymentMethod::Cib)
            .await;
        assert!(matches!(result, Err(MarketError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_create_escrow_unknown_buyer() {
        let f = fixture().await;
        let result = f
            .ledger
            .create_escrow(&AccountId::new("account:ghost"), &listing(), PaymentMethod::Cib)
            .await;
        assert!(matches!(result, Err(MarketError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_escrow_no_referrer_zero_payouts() {
        let f = fixture().await;
        ListingStore::insert(
            f.store.as_ref(),
            Listing::new(
                ListingId::new("listing:2"),
                AccountId::new("account:buyer"),
                "Bike",
                Decimal::new(40_000, 0),
            ),
        )
        .await
        .unwrap();

        // The seller has no referrer; buy as the seller's own customer.
        let tx = f
            .ledger
            .create_escrow(
                &AccountId::new("account:seller"),
                &ListingId::new("listing:2"),
                PaymentMethod::Edahabia,
            )
            .await
            .unwrap()
            .transaction;
        assert!(tx.referral_l1.is_none());
        assert!(tx.referral_l2.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_purchases_claim_listing_once() {
        let f = fixture().await;
        let ledger = Arc::new(f.ledger);

        // A second buyer with no referral chain.
        AccountStore::insert(
            f.store.as_ref(),
            Account::new(AccountId::new("account:buyer2"), "Second", "BUY2"),
        )
        .await
        .unwrap();

        let mut handles = Vec::new();
        for id in ["account:buyer", "account:buyer2"] {
            let ledger = ledger.clone();
            let buyer = AccountId::new(id);
            handles.push(tokio::spawn(async move {
                ledger
                    .create_escrow(&buyer, &listing(), PaymentMethod::Cib)
                    .await
            }));
        }

        let mut successes = 0;
        let mut invalid_state = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(MarketError::InvalidState { .. }) => invalid_state += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(invalid_state, 1);

        let listing = ListingStore::get(f.store.as_ref(), &listing())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.status, ListingStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_delivery_settles_everything_once() {
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        f.ledger.confirm_delivery(&buyer(), &tx.id).await.unwrap();

        let stored = f.store.find(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Completed);
        assert!(stored.released);
        assert!(stored.completed_at.is_some());

        let listing = ListingStore::get(f.store.as_ref(), &listing())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.status, ListingStatus::Sold);

        let seller = AccountStore::get(f.store.as_ref(), &AccountId::new("account:seller"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seller.total_sales, 1);
        let buyer_account = AccountStore::get(f.store.as_ref(), &buyer())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(buyer_account.total_purchases, 1);

        let r1 = f
            .resolver
            .aggregate(&AccountId::new("account:r1"))
            .await
            .unwrap();
        assert_eq!(r1.level1_earnings, Decimal::new(250, 0));
        let r2 = f
            .resolver
            .aggregate(&AccountId::new("account:r2"))
            .await
            .unwrap();
        assert_eq!(r2.level2_earnings, Decimal::new(250, 0));
    }

    #[tokio::test]
    async fn test_confirm_delivery_twice_applies_once() {
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        f.ledger.confirm_delivery(&buyer(), &tx.id).await.unwrap();
        let second = f.ledger.confirm_delivery(&buyer(), &tx.id).await;
        assert!(matches!(second, Err(MarketError::InvalidState { .. })));

        // Counters and edges unchanged after the failed second call.
        let seller = AccountStore::get(f.store.as_ref(), &AccountId::new("account:seller"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seller.total_sales, 1);
        let r1 = f
            .resolver
            .aggregate(&AccountId::new("account:r1"))
            .await
            .unwrap();
        assert_eq!(r1.level1_earnings, Decimal::new(250, 0));
        assert_eq!(r1.edges[0].transaction_count, 1);
    }

    #[tokio::test]
    async fn test_confirm_delivery_wrong_caller_forbidden() {
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        let result = f
            .ledger
            .confirm_delivery(&AccountId::new("account:seller"), &tx.id)
            .await;
        assert!(matches!(result, Err(MarketError::Forbidden { .. })));

        // Forbidden regardless of state: also after completion.
        f.ledger.confirm_delivery(&buyer(), &tx.id).await.unwrap();
        let result = f
            .ledger
            .confirm_delivery(&AccountId::new("account:r1"), &tx.id)
            .await;
        assert!(matches!(result, Err(MarketError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_confirm_delivery_missing_transaction() {
        let f = fixture().await;
        let result = f
            .ledger
            .confirm_delivery(&buyer(), &TransactionId::new("tx:ghost"))
            .await;
        assert!(matches!(result, Err(MarketError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_confirmations_release_exactly_once() {
        let f = fixture().await;
        let ledger = Arc::new(f.ledger);
        let tx = ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let tx_id = tx.id.clone();
            handles.push(tokio::spawn(async move {
                ledger.confirm_delivery(&buyer(), &tx_id).await
            }));
        }

        let mut successes = 0;
        let mut failures = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => successes += 1,
                Err(MarketError::InvalidState { .. }) => failures += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(failures, 7);

        // Each edge credited exactly once.
        let edge = f
            .store
            .find_one(
                &AccountId::new("account:r1"),
                &buyer(),
                ReferralLevel::Level1,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edge.transaction_count, 1);
        assert_eq!(edge.total_earnings, Decimal::new(250, 0));

        let seller = AccountStore::get(f.store.as_ref(), &AccountId::new("account:seller"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seller.total_sales, 1);
    }

    #[tokio::test]
    async fn test_missing_edge_at_settlement_is_inconsistency() {
        // The registration hook never recorded the L2 edge: settlement has
        // money with no ledger entry to credit.
        let store = Arc::new(MemoryStore::new());
        let resolver = Arc::new(ReferralResolver::new(store.clone(), store.clone()));
        let ledger = EscrowLedger::new(
            store.clone(),
            store.clone(),
            store.clone(),
            resolver.clone(),
        );

        for (id, referred_by) in [
            ("account:seller", None),
            ("account:r2", None),
            ("account:r1", Some("account:r2")),
            ("account:buyer", Some("account:r1")),
        ] {
            let mut account = Account::new(AccountId::new(id), id, id.to_uppercase());
            if let Some(referrer) = referred_by {
                account = account.with_referrer(AccountId::new(referrer));
            }
            AccountStore::insert(store.as_ref(), account).await.unwrap();
        }
        resolver
            .record_edge(
                AccountId::new("account:r1"),
                AccountId::new("account:buyer"),
                ReferralLevel::Level1,
            )
            .await
            .unwrap();
        ListingStore::insert(
            store.as_ref(),
            Listing::new(
                ListingId::new("listing:phone"),
                AccountId::new("account:seller"),
                "Samsung Galaxy S24 Ultra",
                Decimal::new(100_000, 0),
            ),
        )
        .await
        .unwrap();

        let tx = ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;
        assert!(tx.referral_l2.is_some());

        let result = ledger.confirm_delivery(&buyer(), &tx.id).await;
        assert!(matches!(result, Err(MarketError::Inconsistency { .. })));

        // The release itself still committed exactly once, and the L1 edge
        // (which exists) was credited before the inconsistency surfaced.
        let stored = store.find(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Completed);
        let r1 = resolver
            .aggregate(&AccountId::new("account:r1"))
            .await
            .unwrap();
        assert_eq!(r1.level1_earnings, Decimal::new(250, 0));
    }

    #[tokio::test]
    async fn test_cancel_escrow_restores_listing() {
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        f.ledger.cancel_escrow(&buyer(), &tx.id).await.unwrap();

        let stored = f.store.find(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Cancelled);
        assert!(!stored.released);

        let listing = ListingStore::get(f.store.as_ref(), &listing())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(listing.status, ListingStatus::Available);

        // A cancelled transaction can no longer be confirmed.
        let result = f.ledger.confirm_delivery(&buyer(), &tx.id).await;
        assert!(matches!(result, Err(MarketError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_cancel_escrow_buyer_only() {
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        let result = f
            .ledger
            .cancel_escrow(&AccountId::new("account:seller"), &tx.id)
            .await;
        assert!(matches!(result, Err(MarketError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_transactions_for_lists_both_sides() {
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        let buyer_history = f.ledger.transactions_for(&buyer()).await.unwrap();
        assert_eq!(buyer_history.len(), 1);
        assert_eq!(buyer_history[0].id, tx.id);

        let seller_history = f
            .ledger
            .transactions_for(&AccountId::new("account:seller"))
            .await
            .unwrap();
        assert_eq!(seller_history.len(), 1);

        let outsider = f
            .ledger
            .transactions_for(&AccountId::new("account:r1"))
            .await
            .unwrap();
        assert!(outsider.is_empty());
    }

    #[tokio::test]
    async fn test_frozen_amounts_survive_price_change() {
        let f = fixture().await;
        let tx = f
            .ledger
            .create_escrow(&buyer(), &listing(), PaymentMethod::Cib)
            .await
            .unwrap()
            .transaction;

        // Reprice the listing while the escrow is open.
        let mut repriced = ListingStore::get(f.store.as_ref(), &listing())
            .await
            .unwrap()
            .unwrap();
        repriced.price = Decimal::new(999_999, 0);
        ListingStore::insert(f.store.as_ref(), repriced).await.unwrap();

        f.ledger.confirm_delivery(&buyer(), &tx.id).await.unwrap();

        let stored = f.store.find(&tx.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, Decimal::new(100_000, 0));
        let r1 = f
            .resolver
            .aggregate(&AccountId::new("account:r1"))
            .await
            .unwrap();
        assert_eq!(r1.level1_earnings, Decimal::new(250, 0));
    }
}
