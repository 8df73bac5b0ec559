//! Port for the one-time-code store used by password reset.
//!
//! A key-value store keyed by email with per-entry expiry. Injecting the
//! store keeps its lifetime explicit: the bundled adapter is an in-memory
//! TTL map, and a multi-instance deployment can swap in a shared store
//! without touching the handlers.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::user::Email;

/// Errors raised by OTP store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpStoreError {
    /// Store backend unavailable.
    #[error("otp store unavailable: {message}")]
    Unavailable { message: String },
}

impl OtpStoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// TTL key-value store for password-reset codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store `code` for `email`, replacing any previous code, expiring
    /// after `ttl`.
    async fn put(&self, email: &Email, code: &str, ttl: Duration) -> Result<(), OtpStoreError>;

    /// Whether `code` matches the live entry for `email`. Expired entries
    /// are treated as absent.
    async fn verify(&self, email: &Email, code: &str) -> Result<bool, OtpStoreError>;

    /// Drop the entry for `email`, if any.
    async fn clear(&self, email: &Email) -> Result<(), OtpStoreError>;
}

/// Fixture store: accepts writes, never verifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOtpStore;

#[async_trait]
impl OtpStore for FixtureOtpStore {
    async fn put(&self, _email: &Email, _code: &str, _ttl: Duration) -> Result<(), OtpStoreError> {
        Ok(())
    }

    async fn verify(&self, _email: &Email, _code: &str) -> Result<bool, OtpStoreError> {
        Ok(false)
    }

    async fn clear(&self, _email: &Email) -> Result<(), OtpStoreError> {
        Ok(())
    }
}
