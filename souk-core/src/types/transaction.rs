//! Escrow Transaction
//!
//! The escrow record freezes every monetary figure at creation time: the
//! amount is a snapshot of the listing price, and the commission and
//! referral payouts are computed once and never recomputed. Later changes
//! to the listing price cannot affect an open or completed transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{AccountId, ListingId, PaymentMethod, TransactionId};
use crate::constants::{commission_rate, referral_l1_rate, referral_l2_rate, DEFAULT_CURRENCY};
use crate::error::{MarketError, MarketResult};

/// Escrow lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Funds held pending buyer confirmation
    InEscrow,
    /// Escrow released to the seller; terminal
    Completed,
    /// Aborted before release; terminal
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::InEscrow => "in_escrow",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Cancelled)
    }

    /// Valid lifecycle transitions: in_escrow → completed | cancelled.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::InEscrow, TransactionStatus::Completed)
                | (TransactionStatus::InEscrow, TransactionStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A frozen referral payout: who gets credited at release, and how much.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferralPayout {
    /// Referrer to credit
    pub referrer_id: AccountId,
    /// Payout amount, frozen at creation
    pub amount: Decimal,
}

/// A purchase held in escrow until the buyer confirms delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscrowTransaction {
    /// Transaction ID
    pub id: TransactionId,
    /// Purchased listing
    pub listing_id: ListingId,
    /// Paying buyer
    pub buyer_id: AccountId,
    /// Listing owner
    pub seller_id: AccountId,
    /// Listing price snapshot; immutable after creation
    pub amount: Decimal,
    /// Settlement currency
    pub currency: String,
    /// Payment instrument
    pub payment_method: PaymentMethod,
    /// Lifecycle status
    pub status: TransactionStatus,
    /// Double-release guard; flips false→true exactly once
    pub released: bool,
    /// Commission rate applied at creation
    pub commission_rate: Decimal,
    /// Platform cut, frozen at creation
    pub commission_amount: Decimal,
    /// Level-1 referral payout, present iff nonzero
    pub referral_l1: Option<ReferralPayout>,
    /// Level-2 referral payout, present iff nonzero
    pub referral_l2: Option<ReferralPayout>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
    /// Release time; None until completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl EscrowTransaction {
    /// Open a new escrow transaction, computing and freezing the commission
    /// and the up-to-two referral payouts.
    ///
    /// `level1`/`level2` are the buyer's resolved referral chain; a level-2
    /// referrer without a level-1 referrer is a resolution bug and is
    /// ignored. Payouts are recorded only when their amount is nonzero.
    pub fn open(
        listing_id: ListingId,
        buyer_id: AccountId,
        seller_id: AccountId,
        amount: Decimal,
        payment_method: PaymentMethod,
        level1: Option<AccountId>,
        level2: Option<AccountId>,
    ) -> MarketResult<Self> {
        if amount.is_sign_negative() {
            return Err(MarketError::invalid_amount(format!(
                "escrow amount must be non-negative, got {amount}"
            )));
        }

        let commission_amount = amount * commission_rate();
        let referral_l1 = level1.and_then(|referrer_id| {
            let payout = amount * referral_l1_rate();
            (!payout.is_zero()).then_some(ReferralPayout {
                referrer_id,
                amount: payout,
            })
        });
        // No level-1 edge means the level-2 pointer cannot be trusted.
        let referral_l2 = referral_l1.is_some().then_some(level2).flatten().and_then(
            |referrer_id| {
                let payout = amount * referral_l2_rate();
                (!payout.is_zero()).then_some(ReferralPayout {
                    referrer_id,
                    amount: payout,
                })
            },
        );

        let payout_total = commission_amount
            + referral_l1.as_ref().map(|p| p.amount).unwrap_or(Decimal::ZERO)
            + referral_l2.as_ref().map(|p| p.amount).unwrap_or(Decimal::ZERO);
        if payout_total > amount {
            return Err(MarketError::invalid_amount(format!(
                "payouts {payout_total} exceed escrow amount {amount}"
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: TransactionId::generate(),
            listing_id,
            buyer_id,
            seller_id,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            payment_method,
            status: TransactionStatus::InEscrow,
            released: false,
            commission_rate: commission_rate(),
            commission_amount,
            referral_l1,
            referral_l2,
            created_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    /// Sum of commission and referral payouts withheld from the seller.
    pub fn payout_total(&self) -> Decimal {
        self.commission_amount
            + self.referral_l1.as_ref().map(|p| p.amount).unwrap_or(Decimal::ZERO)
            + self.referral_l2.as_ref().map(|p| p.amount).unwrap_or(Decimal::ZERO)
    }

    /// What the seller receives once escrow is released.
    pub fn seller_proceeds(&self) -> Decimal {
        self.amount - self.payout_total()
    }

    /// True while the transaction is waiting on buyer confirmation.
    pub fn is_open(&self) -> bool {
        self.status == TransactionStatus::InEscrow && !self.released
    }
}
