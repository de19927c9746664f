//! Application State
//!
//! Shared state for the Souk API service. The ledger and resolver are
//! constructed once over the injected store and shared across handlers;
//! no request-scoped mutable state lives outside the store.

use chrono::{DateTime, Utc};
use souk_core::{EscrowLedger, MemoryStore, PaymentGateway, ReferralResolver};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::AuthConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Service name
    pub service_name: String,
    /// Service version
    pub version: String,
    /// Listen address
    pub listen_addr: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Max request body size (bytes)
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_name: "souk-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            enable_cors: true,
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ApiConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: std::env::var("SOUK_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            enable_cors: std::env::var("SOUK_ENABLE_CORS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enable_cors),
            ..defaults
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Configuration
    pub config: ApiConfig,
    /// Authentication configuration
    pub auth_config: AuthConfig,
    /// Backing store (also behind the ledger and resolver)
    pub store: Arc<MemoryStore>,
    /// Escrow ledger
    pub ledger: EscrowLedger,
    /// Referral graph resolver
    pub resolver: Arc<ReferralResolver>,
    /// Service start time
    pub started_at: DateTime<Utc>,
    /// Request counter
    request_counter: RwLock<u64>,
}

impl AppState {
    /// Create application state over a store with default config
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self::with_config(ApiConfig::default(), store)
    }

    /// Create with configuration
    pub fn with_config(config: ApiConfig, store: Arc<MemoryStore>) -> Self {
        let resolver = Arc::new(ReferralResolver::new(store.clone(), store.clone()));
        let ledger = EscrowLedger::new(
            store.clone(),
            store.clone(),
            store.clone(),
            resolver.clone(),
        );

        Self {
            config,
            auth_config: AuthConfig::default(),
            store,
            ledger,
            resolver,
            started_at: Utc::now(),
            request_counter: RwLock::new(0),
        }
    }

    /// Set authentication configuration
    pub fn with_auth(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    /// Use a custom payment gateway
    pub fn with_gateway(mut self, gateway: PaymentGateway) -> Self {
        self.ledger = self.ledger.with_gateway(gateway);
        self
    }

    /// Get service uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        let now = Utc::now();
        (now - self.started_at).num_seconds().max(0) as u64
    }

    /// Increment request counter
    pub async fn increment_requests(&self) -> u64 {
        let mut counter = self.request_counter.write().await;
        *counter += 1;
        *counter
    }

    /// Get request count
    pub async fn request_count(&self) -> u64 {
        *self.request_counter.read().await
    }
}

/// Health status of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is healthy
    Healthy,
    /// Service is degraded but functional
    Degraded,
    /// Service is unhealthy
    Unhealthy,
}

impl HealthStatus {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Component health check result
#[derive(Debug, Clone)]
pub struct ComponentHealthCheck {
    /// Component name
    pub name: String,
    /// Health status
    pub status: HealthStatus,
    /// Optional message
    pub message: Option<String>,
}

impl ComponentHealthCheck {
    /// Create a healthy result
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Healthy,
            message: None,
        }
    }

    /// Create an unhealthy result
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: HealthStatus::Unhealthy,
            message: Some(message.into()),
        }
    }
}
