//! Souk API - HTTP Interface Layer
//!
//! This crate provides the HTTP interface for the Souk escrow and
//! referral backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Souk API                    │
//! │  ┌─────────────────────────────────────┐    │
//! │  │           HTTP Routes               │    │
//! │  │   /payments/create-escrow           │    │
//! │  │   /payments/confirm-delivery        │    │
//! │  │   /payments/transactions            │    │
//! │  │   /payments/referral-earnings       │    │
//! │  └─────────────────────────────────────┘    │
//! │           │              │           │      │
//! │           ▼              ▼           ▼      │
//! │  ┌─────────────┐ ┌─────────────┐ ┌────────┐ │
//! │  │  Handlers   │ │    DTOs     │ │ State  │ │
//! │  └─────────────┘ └─────────────┘ └────────┘ │
//! └─────────────────────────────────────────────┘
//!            │                        │
//!            ▼                        ▼
//!      souk-core ledger        souk-core store
//! ```
//!
//! # Endpoints
//!
//! ## Health & Status
//! - `GET /health` - Service health check
//! - `GET /stats` - Service statistics
//!
//! ## Payments
//! - `POST /payments/create-escrow` - Open an escrow payment
//! - `POST /payments/confirm-delivery` - Release escrow to the seller
//! - `GET /payments/transactions` - Caller's transaction history
//! - `GET /payments/referral-earnings` - Caller's referral earnings
//!
//! # Usage Example
//!
//! ```ignore
//! use souk_api::{AppState, build_app};
//! use souk_core::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::new(Arc::new(MemoryStore::new()));
//!     let app = build_app(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod seed;
pub mod state;

// Re-export main types
pub use auth::{AuthAccount, AuthConfig, CurrentAccount};
pub use dto::*;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use metrics::{init_metrics, MetricsConfig};
pub use routes::{build_app, create_router, create_v1_router};
pub use state::{ApiConfig, AppState, ComponentHealthCheck, HealthStatus};

/// Souk API version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API port
pub const DEFAULT_PORT: u16 = 3000;

/// Start the API server with the state's configured listen address
pub async fn start_server(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.listen_addr.clone();
    let app = build_app(state);

    tracing::info!("Starting Souk API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
