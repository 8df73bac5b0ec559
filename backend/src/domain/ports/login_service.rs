//! Driving port for authentication.

use async_trait::async_trait;

use crate::domain::auth::LoginCredentials;
use crate::domain::error::Error;
use crate::domain::user::{Email, Role, UserId};

/// Session-relevant identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
    pub name: String,
    pub email: Email,
}

/// Port for credential verification and password resets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials against the user directory.
    async fn authenticate(&self, credentials: &LoginCredentials)
        -> Result<AuthenticatedUser, Error>;

    /// Replace the password for `email` after an OTP-verified reset.
    async fn reset_password(&self, email: &Email, new_password: &str) -> Result<(), Error>;
}

/// Fixture login service that rejects every credential.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(
        &self,
        _credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        Err(Error::unauthorized("invalid credentials"))
    }

    async fn reset_password(&self, _email: &Email, _new_password: &str) -> Result<(), Error> {
        Err(Error::not_found("no account for that email"))
    }
}
