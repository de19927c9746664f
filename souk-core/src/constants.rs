//! Marketplace Constants
//!
//! Centralized rates and defaults for the escrow settlement core.
//! All commission math uses `rust_decimal::Decimal`; the rate helpers
//! below construct the exact decimal values (never floats).

use rust_decimal::Decimal;

// ============================================================================
// Commission Rates
// ============================================================================

/// Platform commission rate: 2% of the sale amount (1% buyer + 1% seller).
pub fn commission_rate() -> Decimal {
    Decimal::new(2, 2)
}

/// Level-1 referral rate: 0.25% of the sale amount, paid to the buyer's
/// direct referrer.
pub fn referral_l1_rate() -> Decimal {
    Decimal::new(25, 4)
}

/// Level-2 referral rate: 0.25% of the sale amount, paid to the referrer's
/// own referrer.
pub fn referral_l2_rate() -> Decimal {
    Decimal::new(25, 4)
}

// ============================================================================
// Defaults
// ============================================================================

/// Settlement currency. All listings and transactions are denominated in
/// Algerian dinar; currency conversion is out of scope.
pub const DEFAULT_CURRENCY: &str = "DZD";

/// Base URL of the mock payment gateway redirect.
pub const DEFAULT_GATEWAY_BASE_URL: &str = "https://payment-gateway.dz/pay";

/// Maximum transactions returned by a history query.
pub const MAX_TRANSACTION_HISTORY: usize = 100;

/// Maximum referral edges returned by an aggregate query.
pub const MAX_REFERRAL_EDGES: usize = 1000;
