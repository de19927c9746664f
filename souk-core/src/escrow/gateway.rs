//! Payment Gateway Redirect
//!
//! Builds the payment-initiation URL handed back from escrow creation.
//! The value is opaque to the core: no gateway callback is consumed and
//! nothing is validated against it. Real CIB/EDAHABIA integration would
//! need merchant credentials and callback URLs; both are out of scope.

use crate::constants::DEFAULT_GATEWAY_BASE_URL;
use crate::types::EscrowTransaction;

/// Mock payment gateway configuration
#[derive(Debug, Clone)]
pub struct PaymentGateway {
    /// Base URL of the gateway's pay endpoint
    pub base_url: String,
}

impl Default for PaymentGateway {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_BASE_URL.to_string(),
        }
    }
}

impl PaymentGateway {
    /// Create a gateway pointing at a custom base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Build the redirect URL for a freshly opened escrow transaction
    pub fn payment_url(&self, transaction: &EscrowTransaction) -> String {
        format!(
            "{}?transaction_id={}&amount={}&method={}",
            self.base_url, transaction.id, transaction.amount, transaction.payment_method
        )
    }
}
