//! API Handlers
//!
//! HTTP handler implementations for the Souk API endpoints. Handlers
//! validate transport-level input, delegate to the escrow ledger and
//! referral resolver, and shape core results into response DTOs.

use axum::{extract::State, Json};
use souk_core::{AccountStore, ListingId, ListingStore, TransactionId};
use std::sync::Arc;

use crate::auth::CurrentAccount;
use crate::dto::*;
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_escrow_operation;
use crate::state::{AppState, ComponentHealthCheck, HealthStatus};

/// Health check handler
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut components = vec![ComponentHealthCheck::healthy("ledger")];

    // The store is reachable if it can serve its counters.
    let _ = state.store.stats().await;
    components.push(ComponentHealthCheck::healthy("store"));

    let overall_status = if components.iter().all(|c| c.status == HealthStatus::Healthy) {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: overall_status.to_string(),
        version: state.config.version.clone(),
        uptime_secs: state.uptime_secs(),
        components: components
            .into_iter()
            .map(|c| ComponentHealth {
                name: c.name,
                status: c.status.as_str().to_string(),
                message: c.message,
            })
            .collect(),
    }))
}

/// Get service statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.store.stats().await;

    Ok(Json(StatsResponse {
        requests_total: state.request_count().await,
        accounts: stats.total_accounts,
        listings: stats.total_listings,
        transactions: stats.total_transactions,
        open_transactions: stats.open_transactions,
        referral_edges: stats.total_edges,
    }))
}

/// Open an escrow payment for a listing
pub async fn create_escrow(
    State(state): State<Arc<AppState>>,
    CurrentAccount(buyer_id): CurrentAccount,
    Json(request): Json<CreateEscrowRequest>,
) -> ApiResult<Json<CreateEscrowResponse>> {
    state.increment_requests().await;

    let listing_id = ListingId::new(request.listing_id);
    let result = state
        .ledger
        .create_escrow(&buyer_id, &listing_id, request.payment_method)
        .await;
    record_escrow_operation("create_escrow", result.is_ok());
    let created = result?;

    Ok(Json(CreateEscrowResponse {
        escrow_id: created.transaction.id.as_str().to_string(),
        payment_url: created.payment_url,
        amount: created.transaction.amount,
        currency: created.transaction.currency.clone(),
        status: created.transaction.status.as_str().to_string(),
        message: "Payment is being processed. Funds will be held in escrow until you confirm \
                  delivery."
            .to_string(),
    }))
}

/// Confirm delivery and release escrow to the seller
pub async fn confirm_delivery(
    State(state): State<Arc<AppState>>,
    CurrentAccount(caller_id): CurrentAccount,
    Json(request): Json<ConfirmDeliveryRequest>,
) -> ApiResult<Json<ConfirmDeliveryResponse>> {
    state.increment_requests().await;

    let transaction_id = TransactionId::new(request.transaction_id);
    let result = state
        .ledger
        .confirm_delivery(&caller_id, &transaction_id)
        .await;
    record_escrow_operation("confirm_delivery", result.is_ok());
    result?;

    Ok(Json(ConfirmDeliveryResponse {
        transaction_id: transaction_id.as_str().to_string(),
        status: "completed".to_string(),
        message: "Payment released to seller. Thank you for confirming delivery!".to_string(),
    }))
}

/// The caller's transaction history, enriched with listing titles and
/// counterparty names
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account_id): CurrentAccount,
) -> ApiResult<Json<Vec<TransactionHistoryEntry>>> {
    state.increment_requests().await;

    let transactions = state.ledger.transactions_for(&account_id).await?;

    let mut entries = Vec::with_capacity(transactions.len());
    for tx in transactions {
        let listing_title = ListingStore::get(state.store.as_ref(), &tx.listing_id)
            .await?
            .map(|l| l.title)
            .unwrap_or_else(|| "Deleted listing".to_string());

        let (direction, counterparty_id) = if tx.buyer_id == account_id {
            (TransactionDirection::Purchase, &tx.seller_id)
        } else {
            (TransactionDirection::Sale, &tx.buyer_id)
        };
        let counterparty = AccountStore::get(state.store.as_ref(), counterparty_id)
            .await?
            .map(|a| a.name)
            .unwrap_or_else(|| "Unknown".to_string());

        entries.push(TransactionHistoryEntry {
            id: tx.id.as_str().to_string(),
            direction,
            listing_title,
            counterparty,
            amount: tx.amount,
            currency: tx.currency.clone(),
            status: tx.status.as_str().to_string(),
            payment_method: tx.payment_method,
            created_at: tx.created_at,
            completed_at: tx.completed_at,
        });
    }

    Ok(Json(entries))
}

/// The caller's referral earnings and per-referral breakdown
pub async fn referral_earnings(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account_id): CurrentAccount,
) -> ApiResult<Json<ReferralEarningsResponse>> {
    state.increment_requests().await;

    let account = AccountStore::get(state.store.as_ref(), &account_id)
        .await?
        .ok_or_else(|| {
            ApiError::from(souk_core::MarketError::not_found(
                "Account",
                account_id.as_str(),
            ))
        })?;

    let aggregate = state.resolver.aggregate(&account_id).await?;

    let mut referrals = Vec::with_capacity(aggregate.edges.len());
    for edge in &aggregate.edges {
        // Rows whose referred account no longer resolves are dropped from
        // the report; the edge itself stays on the ledger.
        let Some(referred) = AccountStore::get(state.store.as_ref(), &edge.referred_id).await?
        else {
            continue;
        };
        referrals.push(ReferralDetailDto {
            id: edge.edge_id.clone(),
            name: referred.name,
            level: edge.level.as_u8(),
            join_date: edge.created_at,
            transaction_count: edge.transaction_count,
            earnings: edge.total_earnings,
            status: edge.status.as_str().to_string(),
        });
    }

    Ok(Json(ReferralEarningsResponse {
        referral_code: account.referral_code,
        total_earnings: aggregate.total_earnings,
        level1_count: aggregate.level1_count,
        level2_count: aggregate.level2_count,
        level1_earnings: aggregate.level1_earnings,
        level2_earnings: aggregate.level2_earnings,
        referrals,
    }))
}
