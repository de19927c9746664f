//! Referral Graph Resolver
//!
//! Resolves a buyer's chain of up to two referring ancestors and owns the
//! referral ledger: edge creation at registration, settlement credits at
//! escrow release, and per-referrer aggregation.
//!
//! Chain resolution is a pure read and always terminates at depth 2. A
//! self-referential pointer (an account listed as its own referrer) is
//! data corruption and resolves as "no referrer" instead of recursing.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::constants::MAX_REFERRAL_EDGES;
use crate::error::{MarketError, MarketResult};
use crate::store::{AccountStore, ReferralEdgeStore};
use crate::types::{AccountId, ReferralAggregate, ReferralEdge, ReferralEdgeDetail, ReferralLevel};

/// A buyer's resolved referral ancestry.
///
/// `level2` is only ever present together with `level1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferralChain {
    /// Direct referrer of the buyer
    pub level1: Option<AccountId>,
    /// Referrer's own referrer
    pub level2: Option<AccountId>,
}

impl ReferralChain {
    /// Chain length in {0, 1, 2}
    pub fn len(&self) -> usize {
        self.level1.iter().count() + self.level2.iter().count()
    }

    /// True when the buyer has no referrer at all
    pub fn is_empty(&self) -> bool {
        self.level1.is_none()
    }
}

/// Referral graph resolver over the injected account and edge stores.
pub struct ReferralResolver {
    accounts: Arc<dyn AccountStore>,
    edges: Arc<dyn ReferralEdgeStore>,
}

impl ReferralResolver {
    /// Create a resolver over the given stores
    pub fn new(accounts: Arc<dyn AccountStore>, edges: Arc<dyn ReferralEdgeStore>) -> Self {
        Self { accounts, edges }
    }

    /// Resolve the buyer's referral chain.
    ///
    /// Level 1 is the buyer's `referred_by` pointer; level 2 is the
    /// level-1 referrer's own pointer. Either may be absent. A pointer
    /// that cycles back to the buyer is dropped — an account never earns
    /// referral commission on its own purchase.
    pub async fn resolve_chain(&self, buyer_id: &AccountId) -> MarketResult<ReferralChain> {
        let buyer = self
            .accounts
            .get(buyer_id)
            .await?
            .ok_or_else(|| MarketError::not_found("Account", buyer_id.as_str()))?;

        let level1 = buyer.effective_referrer().cloned();
        let level2 = match &level1 {
            Some(l1_id) => self
                .accounts
                .get(l1_id)
                .await?
                .and_then(|l1| l1.effective_referrer().cloned())
                .filter(|l2_id| l2_id != buyer_id),
            None => None,
        };

        Ok(ReferralChain { level1, level2 })
    }

    /// Record a referral edge at registration time.
    ///
    /// Called by the identity collaborator when an account registers under
    /// a referrer. Idempotent: returns false and leaves the ledger
    /// untouched when the (referrer, referred, level) edge already exists.
    pub async fn record_edge(
        &self,
        referrer_id: AccountId,
        referred_id: AccountId,
        level: ReferralLevel,
    ) -> MarketResult<bool> {
        if referrer_id == referred_id {
            return Err(MarketError::invalid_state(
                "an account cannot refer itself",
            ));
        }
        let inserted = self
            .edges
            .insert_if_absent(ReferralEdge::new(referrer_id.clone(), referred_id.clone(), level))
            .await?;
        if inserted {
            tracing::debug!(
                referrer_id = %referrer_id,
                referred_id = %referred_id,
                level = %level,
                "referral edge recorded"
            );
        }
        Ok(inserted)
    }

    /// Credit a referral edge with a settled payout.
    ///
    /// The increment is atomic in the store. A missing edge means referral
    /// money has nowhere to go; that is surfaced as an `Inconsistency`
    /// (and logged at ERROR), never silently dropped.
    pub async fn settle(
        &self,
        referrer_id: &AccountId,
        referred_id: &AccountId,
        level: ReferralLevel,
        amount: Decimal,
    ) -> MarketResult<()> {
        let credited = self
            .edges
            .credit(referrer_id, referred_id, level, amount)
            .await?;
        if !credited {
            tracing::error!(
                referrer_id = %referrer_id,
                referred_id = %referred_id,
                level = %level,
                amount = %amount,
                "referral edge missing at settlement; payout has no ledger entry"
            );
            return Err(MarketError::inconsistency(format!(
                "no level-{level} referral edge from {referrer_id} to {referred_id}; {amount} unsettled"
            )));
        }
        tracing::info!(
            referrer_id = %referrer_id,
            referred_id = %referred_id,
            level = %level,
            amount = %amount,
            "referral payout settled"
        );
        Ok(())
    }

    /// Aggregate earnings across all edges where the account is the
    /// referrer, split by level.
    pub async fn aggregate(&self, referrer_id: &AccountId) -> MarketResult<ReferralAggregate> {
        let mut edges = self.edges.find_all_by_referrer(referrer_id).await?;
        edges.truncate(MAX_REFERRAL_EDGES);

        let mut aggregate = ReferralAggregate {
            referrer_id: referrer_id.clone(),
            level1_count: 0,
            level2_count: 0,
            level1_earnings: Decimal::ZERO,
            level2_earnings: Decimal::ZERO,
            total_earnings: Decimal::ZERO,
            edges: Vec::with_capacity(edges.len()),
        };

        for edge in &edges {
            match edge.level {
                ReferralLevel::Level1 => {
                    aggregate.level1_count += 1;
                    aggregate.level1_earnings += edge.total_earnings;
                }
                ReferralLevel::Level2 => {
                    aggregate.level2_count += 1;
                    aggregate.level2_earnings += edge.total_earnings;
                }
            }
            aggregate.edges.push(ReferralEdgeDetail::from(edge));
        }
        aggregate.total_earnings = aggregate.level1_earnings + aggregate.level2_earnings;

        Ok(aggregate)
    }
}
