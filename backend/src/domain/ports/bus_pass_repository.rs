//! Port for bus pass persistence.

use async_trait::async_trait;

use crate::domain::bus_pass::BusPass;
use crate::domain::route_schedule::RouteName;
use crate::domain::user::UserId;

/// Errors raised by bus pass repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PassStoreError {
    /// Repository connection could not be established.
    #[error("pass repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("pass repository query failed: {message}")]
    Query { message: String },
}

impl PassStoreError {
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

/// Port for storing and retrieving bus passes.
///
/// `save` is an upsert keyed on `user_id`, which keeps the one-pass-per-user
/// invariant in storage and makes get-or-create race-safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BusPassRepository: Send + Sync {
    /// Fetch the pass for a user, if one exists.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<BusPass>, PassStoreError>;

    /// Insert or replace the pass for `pass.user_id`.
    async fn save(&self, pass: &BusPass) -> Result<(), PassStoreError>;

    /// Whether any pass currently selects `route`.
    async fn any_selecting_route(&self, route: &RouteName) -> Result<bool, PassStoreError>;
}

/// Fixture implementation: no passes exist, writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBusPassRepository;

#[async_trait]
impl BusPassRepository for FixtureBusPassRepository {
    async fn find_by_user(&self, _user_id: &UserId) -> Result<Option<BusPass>, PassStoreError> {
        Ok(None)
    }

    async fn save(&self, _pass: &BusPass) -> Result<(), PassStoreError> {
        Ok(())
    }

    async fn any_selecting_route(&self, _route: &RouteName) -> Result<bool, PassStoreError> {
        Ok(false)
    }
}
