//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Thin adapter: translates between row structs and the domain `User`,
//! and maps unique-violation failures on the email column to
//! [`UserPersistenceError::DuplicateEmail`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{Email, Role, User, UserId};

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match classify_pool_error(error) {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        _ => UserPersistenceError::query("pool failure"),
    }
}

fn map_read_failure(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::NotFound => UserPersistenceError::query("record not found"),
        DbFailure::Query(message) | DbFailure::UniqueViolation { message, .. } => {
            UserPersistenceError::query(message)
        }
    }
}

fn map_insert_failure(error: diesel::result::Error, email: &Email) -> UserPersistenceError {
    let failure = classify_diesel_error(error);
    if failure.violates(EMAIL_UNIQUE_CONSTRAINT) {
        return UserPersistenceError::duplicate_email(email.as_ref());
    }
    match failure {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::NotFound => UserPersistenceError::query("record not found"),
        DbFailure::Query(message) | DbFailure::UniqueViolation { message, .. } => {
            UserPersistenceError::query(message)
        }
    }
}

/// Convert a database row to a domain [`User`]. A row that fails domain
/// validation indicates data written outside the application.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = Email::new(row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    let role = Role::parse(&row.role)
        .map_err(|err| UserPersistenceError::query(format!("stored role invalid: {err}")))?;
    User::new(
        UserId::from_uuid(row.id),
        email,
        row.name,
        row.phone,
        role,
        row.password_digest,
    )
    .map_err(|err| UserPersistenceError::query(format!("stored user invalid: {err}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_failure)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_failure)?;

        row.map(row_to_user).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            name: user.name(),
            phone: user.phone(),
            role: user.role().as_str(),
            password_digest: user.password_digest(),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_failure(err, user.email()))
    }

    async fn update_password_digest(
        &self,
        email: &Email,
        digest: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table.filter(users::email.eq(email.as_ref())))
            .set(users::password_digest.eq(digest))
            .execute(&mut conn)
            .await
            .map_err(map_read_failure)?;

        if updated == 0 {
            return Err(UserPersistenceError::query(
                "no account found for digest update",
            ));
        }
        Ok(())
    }
}
