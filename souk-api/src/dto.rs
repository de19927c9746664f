//! Data Transfer Objects
//!
//! Request and response DTOs for the Souk API layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use souk_core::PaymentMethod;

// ============================================
// Escrow DTOs
// ============================================

/// Request to open an escrow payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEscrowRequest {
    /// Listing to purchase
    pub listing_id: String,
    /// Payment instrument
    pub payment_method: PaymentMethod,
}

/// Response from opening an escrow payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEscrowResponse {
    /// Escrow transaction ID
    pub escrow_id: String,
    /// Gateway redirect URL
    pub payment_url: String,
    /// Amount held in escrow
    pub amount: Decimal,
    /// Settlement currency
    pub currency: String,
    /// Transaction status
    pub status: String,
    /// Human-readable note for the buyer
    pub message: String,
}

/// Request to confirm delivery and release escrow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmDeliveryRequest {
    /// Transaction to release
    pub transaction_id: String,
}

/// Response from a successful release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmDeliveryResponse {
    /// Released transaction ID
    pub transaction_id: String,
    /// Transaction status after release
    pub status: String,
    /// Human-readable note for the buyer
    pub message: String,
}

// ============================================
// Transaction History DTOs
// ============================================

/// Which side of the transaction the caller was on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    /// Caller was the buyer
    Purchase,
    /// Caller was the seller
    Sale,
}

/// One row of the caller's transaction history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHistoryEntry {
    /// Transaction ID
    pub id: String,
    /// purchase or sale, relative to the caller
    pub direction: TransactionDirection,
    /// Listing title, or a placeholder if the listing is gone
    pub listing_title: String,
    /// Display name of the other party
    pub counterparty: String,
    /// Escrow amount
    pub amount: Decimal,
    /// Settlement currency
    pub currency: String,
    /// Transaction status
    pub status: String,
    /// Payment instrument
    pub payment_method: PaymentMethod,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Release time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ============================================
// Referral DTOs
// ============================================

/// One referred account in the earnings report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralDetailDto {
    /// Edge ID
    pub id: String,
    /// Referred account's display name
    pub name: String,
    /// Chain depth (1 or 2)
    pub level: u8,
    /// When the referred account registered
    pub join_date: DateTime<Utc>,
    /// Settled transactions through this edge
    pub transaction_count: u64,
    /// Cumulative earnings through this edge
    pub earnings: Decimal,
    /// Edge status
    pub status: String,
}

/// Referral earnings report for the calling account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralEarningsResponse {
    /// The caller's referral code to share
    pub referral_code: String,
    /// Grand total earnings
    pub total_earnings: Decimal,
    /// Level-1 referral count
    pub level1_count: usize,
    /// Level-2 referral count
    pub level2_count: usize,
    /// Level-1 earnings
    pub level1_earnings: Decimal,
    /// Level-2 earnings
    pub level2_earnings: Decimal,
    /// Per-referral breakdown
    pub referrals: Vec<ReferralDetailDto>,
}

// ============================================
// Health & Stats DTOs
// ============================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Service version
    pub version: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Component statuses
    pub components: Vec<ComponentHealth>,
}

/// Health of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Service statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Requests served since start
    pub requests_total: u64,
    /// Accounts on record
    pub accounts: u64,
    /// Listings on record
    pub listings: u64,
    /// All transactions
    pub transactions: u64,
    /// Transactions still in escrow
    pub open_transactions: u64,
    /// Referral edges on record
    pub referral_edges: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_escrow_request_parsing() {
        let request: CreateEscrowRequest =
            serde_json::from_str(r#"{"listing_id":"listing:1","payment_method":"CIB"}"#).unwrap();
        assert_eq!(request.listing_id, "listing:1");
        assert_eq!(request.payment_method, PaymentMethod::Cib);
    }

    #[test]
    fn test_unknown_payment_method_rejected() {
        let result: Result<CreateEscrowRequest, _> =
            serde_json::from_str(r#"{"listing_id":"listing:1","payment_method":"PAYPAL"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionDirection::Purchase).unwrap(),
            "\"purchase\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionDirection::Sale).unwrap(),
            "\"sale\""
        );
    }

    #[test]
    fn test_history_entry_omits_null_completed_at() {
        let entry = TransactionHistoryEntry {
            id: "tx:1".to_string(),
            direction: TransactionDirection::Purchase,
            listing_title: "Bike".to_string(),
            counterparty: "Ahmed Benali".to_string(),
            amount: Decimal::new(40_000, 0),
            currency: "DZD".to_string(),
            status: "in_escrow".to_string(),
            payment_method: PaymentMethod::Edahabia,
            created_at: Utc::now(),
            completed_at: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("completed_at"));
    }
}
