//! Port for outbound user notifications.

use async_trait::async_trait;

use crate::domain::user::Email;

/// Errors raised by notifier adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifierError {
    /// Delivery to the underlying channel failed.
    #[error("notification delivery failed: {message}")]
    Delivery { message: String },
}

impl NotifierError {
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

/// Delivery channel for password-reset codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a reset code to the account's email address.
    async fn send_reset_code(&self, email: &Email, code: &str) -> Result<(), NotifierError>;
}

/// Fixture notifier that records nothing and always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn send_reset_code(&self, _email: &Email, _code: &str) -> Result<(), NotifierError> {
        Ok(())
    }
}
