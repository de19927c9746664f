//! Account View
//!
//! The narrow slice of the identity collaborator's account record that the
//! settlement core reads and (for the two stat counters) increments. The
//! core never creates or deletes accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::AccountId;

/// Account record as seen by the settlement core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID
    pub id: AccountId,
    /// Display name
    pub name: String,
    /// Short uppercase referral code handed out to invitees
    pub referral_code: String,
    /// Direct referrer, if the account registered under one.
    /// Forms a forest; the core never follows it past depth 2.
    pub referred_by: Option<AccountId>,
    /// Completed sales as seller
    pub total_sales: u64,
    /// Completed purchases as buyer
    pub total_purchases: u64,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create an account view with zeroed counters.
    pub fn new(id: AccountId, name: impl Into<String>, referral_code: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            referral_code: referral_code.into(),
            referred_by: None,
            total_sales: 0,
            total_purchases: 0,
            created_at: Utc::now(),
        }
    }

    /// Set the direct referrer
    pub fn with_referrer(mut self, referrer: AccountId) -> Self {
        self.referred_by = Some(referrer);
        self
    }

    /// The account's referrer, ignoring a self-referential pointer
    /// (data corruption; treated as "no referrer" rather than recursing).
    pub fn effective_referrer(&self) -> Option<&AccountId> {
        self.referred_by.as_ref().filter(|r| **r != self.id)
    }
}

/// The stat counters the escrow ledger increments on release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountCounter {
    /// `total_sales`
    TotalSales,
    /// `total_purchases`
    TotalPurchases,
}

impl AccountCounter {
    /// Field name in the backing store
    pub fn field(&self) -> &'static str {
        match self {
            AccountCounter::TotalSales => "total_sales",
            AccountCounter::TotalPurchases => "total_purchases",
        }
    }
}
