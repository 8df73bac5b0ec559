//! Driving ports for route schedule administration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::route_schedule::{RouteName, RouteSchedule, RouteScheduleDraft};

/// Mutations against the route schedule catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleCommand: Send + Sync {
    /// Create a schedule for a route not yet configured.
    async fn create(&self, draft: RouteScheduleDraft) -> Result<RouteSchedule, Error>;

    /// Replace the installments of an existing schedule.
    async fn update(&self, id: Uuid, draft: RouteScheduleDraft) -> Result<RouteSchedule, Error>;

    /// Remove a schedule. Fails with Conflict while payments or passes
    /// still reference its route.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}

/// Read-only schedule queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleQuery: Send + Sync {
    /// Every configured schedule.
    async fn list(&self) -> Result<Vec<RouteSchedule>, Error>;

    /// The schedule for one route, or NotFound.
    async fn find_by_route(&self, route: &RouteName) -> Result<RouteSchedule, Error>;
}

/// Fixture command: rejects every mutation as unconfigured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureScheduleCommand;

#[async_trait]
impl ScheduleCommand for FixtureScheduleCommand {
    async fn create(&self, draft: RouteScheduleDraft) -> Result<RouteSchedule, Error> {
        draft
            .into_schedule(Uuid::nil())
            .map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn update(&self, _id: Uuid, _draft: RouteScheduleDraft) -> Result<RouteSchedule, Error> {
        Err(Error::not_found("no such schedule"))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), Error> {
        Err(Error::not_found("no such schedule"))
    }
}

/// Fixture query: an empty catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureScheduleQuery;

#[async_trait]
impl ScheduleQuery for FixtureScheduleQuery {
    async fn list(&self) -> Result<Vec<RouteSchedule>, Error> {
        Ok(Vec::new())
    }

    async fn find_by_route(&self, _route: &RouteName) -> Result<RouteSchedule, Error> {
        Err(Error::not_found("no schedule for that route"))
    }
}
