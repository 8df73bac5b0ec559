//! Port for route installment schedule persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::route_schedule::{RouteName, RouteSchedule};

/// Errors raised by schedule repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleStoreError {
    /// Repository connection could not be established.
    #[error("schedule repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("schedule repository query failed: {message}")]
    Query { message: String },
    /// A schedule for the same route name already exists.
    #[error("installment schedule already exists for route {route}")]
    DuplicateRoute { route: String },
}

impl ScheduleStoreError {
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

    pub fn duplicate_route(route: impl Into<String>) -> Self {
        Self::DuplicateRoute {
            route: route.into(),
        }
    }
}

/// Port for storing and retrieving route installment schedules.
///
/// The unique route-name constraint lives in storage; adapters surface a
/// violation as [`ScheduleStoreError::DuplicateRoute`] so the service's
/// pre-check cannot race with a concurrent insert.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteScheduleRepository: Send + Sync {
    /// All schedules, ordered by route name.
    async fn list(&self) -> Result<Vec<RouteSchedule>, ScheduleStoreError>;

    /// Fetch a schedule by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RouteSchedule>, ScheduleStoreError>;

    /// Fetch the schedule for a route name.
    async fn find_by_route_name(
        &self,
        route: &RouteName,
    ) -> Result<Option<RouteSchedule>, ScheduleStoreError>;

    /// Insert a new schedule.
    async fn insert(&self, schedule: &RouteSchedule) -> Result<(), ScheduleStoreError>;

    /// Replace an existing schedule in place.
    async fn update(&self, schedule: &RouteSchedule) -> Result<(), ScheduleStoreError>;

    /// Delete a schedule; returns `false` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, ScheduleStoreError>;
}

/// Fixture implementation: empty catalogue, writes discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRouteScheduleRepository;

#[async_trait]
impl RouteScheduleRepository for FixtureRouteScheduleRepository {
    async fn list(&self) -> Result<Vec<RouteSchedule>, ScheduleStoreError> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<RouteSchedule>, ScheduleStoreError> {
        Ok(None)
    }

    async fn find_by_route_name(
        &self,
        _route: &RouteName,
    ) -> Result<Option<RouteSchedule>, ScheduleStoreError> {
        Ok(None)
    }

    async fn insert(&self, _schedule: &RouteSchedule) -> Result<(), ScheduleStoreError> {
        Ok(())
    }

    async fn update(&self, _schedule: &RouteSchedule) -> Result<(), ScheduleStoreError> {
        Ok(())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, ScheduleStoreError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn fixture_repository_is_empty() {
        let repo = FixtureRouteScheduleRepository;
        assert!(repo.list().await.expect("list succeeds").is_empty());
        let route = RouteName::new("R1").expect("valid route");
        assert!(repo
            .find_by_route_name(&route)
            .await
            .expect("lookup succeeds")
            .is_none());
    }

    #[rstest]
    fn duplicate_route_error_names_the_route() {
        let err = ScheduleStoreError::duplicate_route("North Loop");
        assert!(err.to_string().contains("North Loop"));
    }
}
