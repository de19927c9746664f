//! Listing View
//!
//! The catalog collaborator owns listings; the settlement core reads the
//! price/owner and drives only the availability transitions tied to the
//! escrow lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{AccountId, ListingId};
use crate::constants::DEFAULT_CURRENCY;

/// Listing availability state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Open for purchase
    Available,
    /// Claimed by an open escrow transaction
    Pending,
    /// Escrow released, sale final
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Pending => "pending",
            ListingStatus::Sold => "sold",
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listing record as seen by the settlement core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Listing ID
    pub id: ListingId,
    /// Owning seller
    pub seller_id: AccountId,
    /// Title shown in transaction history
    pub title: String,
    /// Asking price; snapshotted into the transaction at purchase time
    pub price: Decimal,
    /// Settlement currency
    pub currency: String,
    /// Availability state
    pub status: ListingStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Create an available listing.
    pub fn new(
        id: ListingId,
        seller_id: AccountId,
        title: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id,
            seller_id,
            title: title.into(),
            price,
            currency: DEFAULT_CURRENCY.to_string(),
            status: ListingStatus::Available,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_listing_is_available() {
        let listing = Listing::new(
            ListingId::new("listing:1"),
            AccountId::new("account:seller"),
            "Samsung Galaxy S24 Ultra",
            Decimal::new(180_000, 0),
        );
        assert_eq!(listing.status, ListingStatus::Available);
        assert_eq!(listing.currency, "DZD");
    }

    #[test]
    fn test_status_serde_spelling() {
        let json = serde_json::to_string(&ListingStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
