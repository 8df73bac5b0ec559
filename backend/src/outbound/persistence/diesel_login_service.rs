//! `LoginService` adapter over the user repository and password hasher.
//!
//! Credential verification never reveals which part of the credential
//! pair was wrong: unknown email and bad password both answer with the
//! same unauthorized error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::auth::LoginCredentials;
use crate::domain::ports::{
    AuthenticatedUser, LoginService, PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::user::Email;
use crate::domain::Error;

/// Repository-backed implementation of the `LoginService` port.
#[derive(Clone)]
pub struct DieselLoginService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl DieselLoginService {
    /// Create a login service over the given directory and hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }
}

fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email already registered: {email}"))
        }
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

        if !self
            .hasher
            .verify(credentials.password(), user.password_digest())
        {
            return Err(Error::unauthorized("invalid credentials"));
        }

        info!(user_id = %user.id(), "login succeeded");
        Ok(AuthenticatedUser {
            user_id: user.id().clone(),
            role: user.role(),
            name: user.name().to_owned(),
            email: user.email().clone(),
        })
    }

    async fn reset_password(&self, email: &Email, new_password: &str) -> Result<(), Error> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("no account for that email"))?;

        let digest = self.hasher.digest(new_password);
        self.users
            .update_password_digest(user.email(), &digest)
            .await
            .map_err(map_user_persistence_error)?;

        info!(user_id = %user.id(), "password reset applied");
        Ok(())
    }
}
