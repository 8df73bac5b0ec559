//! Port for payment ledger persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::domain::route_schedule::RouteName;
use crate::domain::user::UserId;

/// Errors raised by payment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentStoreError {
    /// Repository connection could not be established.
    #[error("payment repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("payment repository query failed: {message}")]
    Query { message: String },
    /// The referenced payment record does not exist.
    #[error("payment record not found")]
    NotFound,
    /// Storage rejected a second PAID record for the same installment
    /// slot (partial unique index on user, route, installment).
    #[error("installment already settled for this route")]
    DuplicatePayment,
}

impl PaymentStoreError {
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
}

/// Port for the append-oriented payment ledger.
///
/// The duplicate-settlement invariant is enforced twice: the workflow's
/// read-before-write check gives a friendly failure, and the storage-level
/// partial unique index closes the race window between concurrent
/// requests, surfacing as [`PaymentStoreError::DuplicatePayment`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Append a ledger entry.
    async fn insert(&self, record: &PaymentRecord) -> Result<(), PaymentStoreError>;

    /// Every ledger entry for one user, newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, PaymentStoreError>;

    /// Every ledger entry across all users, newest first.
    async fn list_all(&self) -> Result<Vec<PaymentRecord>, PaymentStoreError>;

    /// PAID entries for one user on one route.
    async fn list_paid_for_route(
        &self,
        user_id: &UserId,
        route: &RouteName,
    ) -> Result<Vec<PaymentRecord>, PaymentStoreError>;

    /// Whether any ledger entry references `route`, for any user.
    async fn any_for_route(&self, route: &RouteName) -> Result<bool, PaymentStoreError>;

    /// Fetch one entry by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentRecord>, PaymentStoreError>;

    /// Update the status of one entry; [`PaymentStoreError::NotFound`]
    /// when no row matched.
    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<(), PaymentStoreError>;

    /// Remove one entry; [`PaymentStoreError::NotFound`] when no row
    /// matched.
    async fn delete(&self, id: Uuid) -> Result<(), PaymentStoreError>;
}

/// Fixture implementation: empty ledger, writes discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentRepository;

#[async_trait]
impl PaymentRepository for FixturePaymentRepository {
    async fn insert(&self, _record: &PaymentRecord) -> Result<(), PaymentStoreError> {
        Ok(())
    }

    async fn list_by_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        Ok(Vec::new())
    }

    async fn list_all(&self) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        Ok(Vec::new())
    }

    async fn list_paid_for_route(
        &self,
        _user_id: &UserId,
        _route: &RouteName,
    ) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        Ok(Vec::new())
    }

    async fn any_for_route(&self, _route: &RouteName) -> Result<bool, PaymentStoreError> {
        Ok(false)
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<PaymentRecord>, PaymentStoreError> {
        Ok(None)
    }

    async fn set_status(
        &self,
        _id: Uuid,
        _status: PaymentStatus,
    ) -> Result<(), PaymentStoreError> {
        Err(PaymentStoreError::NotFound)
    }

    async fn delete(&self, _id: Uuid) -> Result<(), PaymentStoreError> {
        Err(PaymentStoreError::NotFound)
    }
}
