//! Demo Seed Data
//!
//! Populates the in-memory store with a small referral chain and a few
//! listings so the purchase flow can be exercised against a fresh dev
//! server (`SOUK_SEED=1`).

use rust_decimal::Decimal;
use souk_core::{
    Account, AccountId, AccountStore, Listing, ListingId, ListingStore, MarketResult, MemoryStore,
    ReferralLevel, ReferralResolver,
};
use std::sync::Arc;

/// Account ids created by [`seed_demo_data`], also usable as
/// `X-Account-Id` values in development.
pub const DEMO_SELLER: &str = "demo-seller";
pub const DEMO_BUYER: &str = "demo-buyer";
pub const DEMO_REFERRER_L1: &str = "demo-referrer-l1";
pub const DEMO_REFERRER_L2: &str = "demo-referrer-l2";

/// Seed the store with demo accounts, referral edges, and listings.
pub async fn seed_demo_data(
    store: &Arc<MemoryStore>,
    resolver: &ReferralResolver,
) -> MarketResult<()> {
    let accounts = [
        (DEMO_SELLER, "Ahmed Benali", "AHMED2025", None),
        (DEMO_REFERRER_L2, "Karim Meziane", "KARIM2025", None),
        (DEMO_REFERRER_L1, "Yasmine Cherif", "YASMINE25", Some(DEMO_REFERRER_L2)),
        (DEMO_BUYER, "Fatima Zahra", "FATIMA25", Some(DEMO_REFERRER_L1)),
    ];
    for (id, name, code, referred_by) in accounts {
        let mut account = Account::new(AccountId::new(id), name, code);
        if let Some(referrer) = referred_by {
            account = account.with_referrer(AccountId::new(referrer));
        }
        AccountStore::insert(store.as_ref(), account).await?;
    }

    resolver
        .record_edge(
            AccountId::new(DEMO_REFERRER_L1),
            AccountId::new(DEMO_BUYER),
            ReferralLevel::Level1,
        )
        .await?;
    resolver
        .record_edge(
            AccountId::new(DEMO_REFERRER_L2),
            AccountId::new(DEMO_BUYER),
            ReferralLevel::Level2,
        )
        .await?;
    resolver
        .record_edge(
            AccountId::new(DEMO_REFERRER_L2),
            AccountId::new(DEMO_REFERRER_L1),
            ReferralLevel::Level1,
        )
        .await?;

    let listings = [
        ("demo-listing-phone", "Samsung Galaxy S24 Ultra", 180_000i64),
        ("demo-listing-laptop", "MacBook Pro 14 M3", 420_000),
        ("demo-listing-bike", "Peugeot city bike", 38_500),
    ];
    for (id, title, price) in listings {
        ListingStore::insert(
            store.as_ref(),
            Listing::new(
                ListingId::new(id),
                AccountId::new(DEMO_SELLER),
                title,
                Decimal::new(price, 0),
            ),
        )
        .await?;
    }

    tracing::info!(
        accounts = accounts.len(),
        listings = listings.len(),
        "demo data seeded"
    );

    Ok(())
}
