//! Port for user directory persistence.

use async_trait::async_trait;

use crate::domain::user::{Email, User, UserId};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// An account with the same email already exists.
    #[error("email already registered: {email}")]
    DuplicateEmail { email: String },
}

impl UserPersistenceError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Port for storing and retrieving directory accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account by its login email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new account. Fails with [`UserPersistenceError::DuplicateEmail`]
    /// when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace the stored password digest for `email`.
    async fn update_password_digest(
        &self,
        email: &Email,
        digest: &str,
    ) -> Result<(), UserPersistenceError>;
}

/// Fixture implementation for wiring without a real database.
///
/// Lookups return `None`; writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_email(&self, _email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(None)
    }

    async fn insert(&self, _user: &User) -> Result<(), UserPersistenceError> {
        Ok(())
    }

    async fn update_password_digest(
        &self,
        _email: &Email,
        _digest: &str,
    ) -> Result<(), UserPersistenceError> {
        Ok(())
    }
}
