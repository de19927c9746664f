//! Referral Ledger Types
//!
//! A `ReferralEdge` is the cumulative earnings ledger for one
//! (referrer, referred account, level) triple. Edges are created once at
//! registration, credited by escrow release, and never deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::AccountId;

/// Referral chain depth. Commission stops at two levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralLevel {
    /// Direct referrer of the buyer
    Level1,
    /// Referrer's own referrer
    Level2,
}

impl ReferralLevel {
    /// Numeric level as stored by the original ledger (1 or 2).
    pub fn as_u8(&self) -> u8 {
        match self {
            ReferralLevel::Level1 => 1,
            ReferralLevel::Level2 => 2,
        }
    }
}

impl std::fmt::Display for ReferralLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Edge status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    Active,
    Inactive,
}

impl EdgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStatus::Active => "active",
            EdgeStatus::Inactive => "inactive",
        }
    }
}

/// Cumulative referral ledger entry.
///
/// Uniqueness invariant: at most one edge per
/// (referrer_id, referred_id, level) triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferralEdge {
    /// Edge ID
    pub id: String,
    /// The account earning the commission
    pub referrer_id: AccountId,
    /// The account whose purchases generate it
    pub referred_id: AccountId,
    /// Chain depth of this edge
    pub level: ReferralLevel,
    /// Cumulative settled earnings
    pub total_earnings: Decimal,
    /// Number of settled transactions
    pub transaction_count: u64,
    /// Edge status
    pub status: EdgeStatus,
    /// Registration time of the referred account
    pub created_at: DateTime<Utc>,
}

impl ReferralEdge {
    /// Create a fresh edge with zero earnings.
    pub fn new(referrer_id: AccountId, referred_id: AccountId, level: ReferralLevel) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            referrer_id,
            referred_id,
            level,
            total_earnings: Decimal::ZERO,
            transaction_count: 0,
            status: EdgeStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// Per-edge detail row in an aggregate report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferralEdgeDetail {
    /// Edge ID
    pub edge_id: String,
    /// Referred account
    pub referred_id: AccountId,
    /// Chain depth
    pub level: ReferralLevel,
    /// Settled transactions through this edge
    pub transaction_count: u64,
    /// Cumulative earnings through this edge
    pub total_earnings: Decimal,
    /// Edge status
    pub status: EdgeStatus,
    /// Edge creation time
    pub created_at: DateTime<Utc>,
}

impl From<&ReferralEdge> for ReferralEdgeDetail {
    fn from(edge: &ReferralEdge) -> Self {
        Self {
            edge_id: edge.id.clone(),
            referred_id: edge.referred_id.clone(),
            level: edge.level,
            transaction_count: edge.transaction_count,
            total_earnings: edge.total_earnings,
            status: edge.status,
            created_at: edge.created_at,
        }
    }
}

/// Aggregate earnings report for one referrer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferralAggregate {
    /// The referrer the report is for
    pub referrer_id: AccountId,
    /// Level-1 edge count
    pub level1_count: usize,
    /// Level-2 edge count
    pub level2_count: usize,
    /// Summed level-1 earnings
    pub level1_earnings: Decimal,
    /// Summed level-2 earnings
    pub level2_earnings: Decimal,
    /// Grand total
    pub total_earnings: Decimal,
    /// Per-edge breakdown
    pub edges: Vec<ReferralEdgeDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_edge_starts_at_zero() {
        let edge = ReferralEdge::new(
            AccountId::new("account:r"),
            AccountId::new("account:b"),
            ReferralLevel::Level1,
        );
        assert_eq!(edge.total_earnings, Decimal::ZERO);
        assert_eq!(edge.transaction_count, 0);
        assert_eq!(edge.status, EdgeStatus::Active);
    }

    #[test]
    fn test_level_numeric_mapping() {
        assert_eq!(ReferralLevel::Level1.as_u8(), 1);
        assert_eq!(ReferralLevel::Level2.as_u8(), 2);
    }

    #[test]
    fn test_detail_from_edge() {
        let mut edge = ReferralEdge::new(
            AccountId::new("account:r"),
            AccountId::new("account:b"),
            ReferralLevel::Level2,
        );
        edge.total_earnings = Decimal::new(250, 0);
        edge.transaction_count = 1;

        let detail = ReferralEdgeDetail::from(&edge);
        assert_eq!(detail.level, ReferralLevel::Level2);
        assert_eq!(detail.total_earnings, Decimal::new(250, 0));
        assert_eq!(detail.transaction_count, 1);
    }
}
