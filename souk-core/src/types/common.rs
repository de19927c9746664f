//! Basic Identifier Types
//!
//! Naming conventions:
//! - `_id` suffix: primary key identifiers
//! - ID newtypes are non-interchangeable; a buyer id never types as a
//!   listing id

use serde::{Deserialize, Serialize};

// ============================================================
// ID Types
// ============================================================

/// Account ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listing ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Escrow transaction ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================
// Payment Method
// ============================================================

/// Supported payment instruments at the gateway.
///
/// The gateway spells these uppercase on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// CIB interbank card
    Cib,
    /// EDAHABIA postal card
    Edahabia,
}

impl PaymentMethod {
    /// Gateway spelling of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cib => "CIB",
            PaymentMethod::Edahabia => "EDAHABIA",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_creation() {
        let id = AccountId::new("account:42");
        assert_eq!(id.as_str(), "account:42");
    }

    #[test]
    fn test_generated_ids_unique() {
        let a = TransactionId::generate();
        let b = TransactionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_payment_method_wire_spelling() {
        let json = serde_json::to_string(&PaymentMethod::Edahabia).unwrap();
        assert_eq!(json, "\"EDAHABIA\"");
        let parsed: PaymentMethod = serde_json::from_str("\"CIB\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Cib);
    }
}
