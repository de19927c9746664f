//! Core Error Taxonomy
//!
//! Typed failures returned by the escrow ledger and referral resolver.
//! The request layer maps each kind to a transport response; none of these
//! are retried by the core (they reflect logical or state violations, not
//! infrastructure flakiness). Store-level infrastructure failures surface
//! as `Unavailable`, which the request layer may retry at its discretion.

use thiserror::Error;

/// Core result type
pub type MarketResult<T> = Result<T, MarketError>;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Referenced listing/account/transaction absent
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Actor not authorized for the requested mutation
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    /// Operation attempted against a record not in the required state
    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    /// A referral edge expected from a prior registration is missing at
    /// settlement time. This is unpaid referral money and must reach an
    /// operator-visible channel, never be dropped.
    #[error("Referral ledger inconsistency: {details}")]
    Inconsistency { details: String },

    /// Amount failed validation at construction time
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The backing store could not serve the request
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl MarketError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        MarketError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        MarketError::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        MarketError::InvalidState {
            reason: reason.into(),
        }
    }

    /// Create an inconsistency error
    pub fn inconsistency(details: impl Into<String>) -> Self {
        MarketError::Inconsistency {
            details: details.into(),
        }
    }

    /// Create an invalid amount error
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        MarketError::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        MarketError::Unavailable {
            reason: reason.into(),
        }
    }
}
