//! Authentication
//!
//! Maps an already-issued credential to the account id the core receives.
//! Identity issuance (registration, login, token minting) lives with the
//! external identity collaborator; this layer only resolves a bearer token
//! through a configured token table.
//!
//! # Authentication Methods
//!
//! ## Bearer Token
//! ```text
//! Authorization: Bearer your-token-here
//! ```
//!
//! ## Development mode (auth disabled)
//! ```text
//! X-Account-Id: account-id-here
//! ```
//!
//! # Configuration
//!
//! - `SOUK_AUTH_ENABLED`: Enable/disable authentication (default: false)
//! - `SOUK_AUTH_TOKENS`: Comma-separated `token:account_id` pairs

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use souk_core::AccountId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

/// Header trusted for identity when authentication is disabled
pub const DEV_ACCOUNT_HEADER: &str = "X-Account-Id";

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Whether authentication is enabled
    pub enabled: bool,
    /// Bearer token → account id table
    pub tokens: HashMap<String, AccountId>,
    /// Paths that don't require authentication
    pub public_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tokens: HashMap::new(),
            public_paths: vec![
                "/".to_string(),
                "/health".to_string(),
                "/healthz".to_string(),
                "/api/v1/health".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let enabled = std::env::var("SOUK_AUTH_ENABLED")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let tokens = std::env::var("SOUK_AUTH_TOKENS")
            .map(|v| {
                v.split(',')
                    .filter_map(|pair| {
                        let (token, account) = pair.trim().split_once(':')?;
                        Some((token.to_string(), AccountId::new(account)))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            enabled,
            tokens,
            ..Default::default()
        }
    }

    /// Register a token → account mapping
    pub fn with_token(mut self, token: impl Into<String>, account: AccountId) -> Self {
        self.tokens.insert(token.into(), account);
        self
    }

    /// Check if a path is public (doesn't require authentication)
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path == p)
    }

    /// Resolve a bearer token to its account
    pub fn account_for_token(&self, token: &str) -> Option<&AccountId> {
        self.tokens.get(token)
    }
}

/// The validated identity of the calling account, inserted by the auth
/// middleware and read by handlers through the `CurrentAccount` extractor.
#[derive(Debug, Clone)]
pub struct AuthAccount(pub AccountId);

/// Extractor for the calling account id.
///
/// Rejects with 401 when the middleware resolved no identity.
pub struct CurrentAccount(pub AccountId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentAccount {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthAccount>()
            .map(|auth| CurrentAccount(auth.0.clone()))
            .ok_or_else(|| ApiError::unauthorized("missing credentials"))
    }
}

/// Authentication middleware
///
/// With auth enabled, a request to a non-public path must carry a bearer
/// token from the configured table; with auth disabled, the
/// `X-Account-Id` header is trusted (development and tests). Either way a
/// resolved identity is attached as an `AuthAccount` extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_config = &state.auth_config;

    if !auth_config.enabled {
        if let Some(account) = request
            .headers()
            .get(DEV_ACCOUNT_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            let account = AccountId::new(account);
            request.extensions_mut().insert(AuthAccount(account));
        }
        return next.run(request).await;
    }

    let path = request.uri().path();
    if auth_config.is_public_path(path) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token.and_then(|t| auth_config.account_for_token(t)) {
        Some(account) => {
            let account = account.clone();
            request.extensions_mut().insert(AuthAccount(account));
            next.run(request).await
        }
        None => ApiError::unauthorized("invalid or missing bearer token").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_disabled_with_public_paths() {
        let config = AuthConfig::default();
        assert!(!config.enabled);
        assert!(config.is_public_path("/health"));
        assert!(config.is_public_path("/api/v1/health"));
        assert!(!config.is_public_path("/api/v1/payments/create-escrow"));
    }

    #[test]
    fn test_token_resolution() {
        let config =
            AuthConfig::default().with_token("secret-token", AccountId::new("account:42"));
        assert_eq!(
            config.account_for_token("secret-token"),
            Some(&AccountId::new("account:42"))
        );
        assert_eq!(config.account_for_token("other"), None);
    }

    #[test]
    fn test_token_table_parsing() {
        std::env::set_var("SOUK_AUTH_TOKENS", "tok1:account:1, tok2:account:2");
        let config = AuthConfig::from_env();
        std::env::remove_var("SOUK_AUTH_TOKENS");

        assert_eq!(
            config.account_for_token("tok1"),
            Some(&AccountId::new("account:1"))
        );
        assert_eq!(
            config.account_for_token("tok2"),
            Some(&AccountId::new("account:2"))
        );
    }
}
