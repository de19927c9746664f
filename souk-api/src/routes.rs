//! API Routes
//!
//! Route definitions for the Souk API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers::*;
use crate::metrics::metrics_middleware;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let enable_cors = state.config.enable_cors;

    let mut router = Router::new()
        // Health and status
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        // Escrow payment endpoints
        .route("/payments/create-escrow", post(create_escrow))
        .route("/payments/confirm-delivery", post(confirm_delivery))
        .route("/payments/transactions", get(list_transactions))
        .route("/payments/referral-earnings", get(referral_earnings))
        .with_state(state.clone());

    // Add metrics middleware
    router = router.layer(middleware::from_fn(metrics_middleware));

    // Identity resolution (enabled flag handled inside the middleware)
    router = router.layer(middleware::from_fn_with_state(state, auth_middleware));

    // Add CORS middleware
    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router = router.layer(TraceLayer::new_for_http());

    router
}

/// Create a router for the V1 API with /api/v1 prefix
pub fn create_v1_router(state: Arc<AppState>) -> Router {
    Router::new().nest("/api/v1", create_router(state))
}

/// Build the full application router
pub fn build_app(state: AppState) -> Router {
    let state = Arc::new(state);

    // Create a simple root handler that doesn't need state
    let root_router = Router::new().route("/", get(|| async { "Souk API Service" }));

    // Create the health check route with state
    let health_router = Router::new()
        .route("/healthz", get(health_check))
        .with_state(state.clone());

    root_router
        .merge(health_router)
        .merge(create_v1_router(state))
}
