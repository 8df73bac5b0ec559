//! Route schedule administration service.
//!
//! Deletion is uniformly conservative: a schedule whose route is still
//! referenced by any ledger record or selected on any pass cannot be
//! removed. Administrators clear the references first.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::ports::{
    BusPassRepository, PassStoreError, PaymentRepository, PaymentStoreError, ScheduleCommand,
    ScheduleQuery, ScheduleStoreError, RouteScheduleRepository,
};
use crate::domain::route_schedule::{
    RouteName, RouteSchedule, RouteScheduleDraft, RouteScheduleValidationError,
};

fn map_schedule_store_error(err: ScheduleStoreError) -> Error {
    match err {
        ScheduleStoreError::Connection { .. } => {
            Error::service_unavailable("schedule store unavailable")
        }
        ScheduleStoreError::DuplicateRoute { route } => {
            Error::conflict(format!("an installment schedule already exists for route {route}"))
                .with_details(json!({ "code": "duplicate_route", "route": route }))
        }
        ScheduleStoreError::Query { message } => {
            Error::internal(format!("schedule store failure: {message}"))
        }
    }
}

fn map_payment_store_error(err: PaymentStoreError) -> Error {
    match err {
        PaymentStoreError::Connection { .. } => {
            Error::service_unavailable("payment store unavailable")
        }
        other => Error::internal(format!("payment store failure: {other}")),
    }
}

fn map_pass_store_error(err: PassStoreError) -> Error {
    match err {
        PassStoreError::Connection { .. } => Error::service_unavailable("pass store unavailable"),
        PassStoreError::Query { message } => {
            Error::internal(format!("pass store failure: {message}"))
        }
    }
}

fn map_validation_error(err: RouteScheduleValidationError) -> Error {
    let code = match err {
        RouteScheduleValidationError::BlankRouteName => "blank_route_name",
        RouteScheduleValidationError::NegativeAmount { .. } => "negative_amount",
        RouteScheduleValidationError::InvalidInstallment { .. } => "invalid_installment",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "code": code }))
}

/// Application service behind [`ScheduleCommand`] and [`ScheduleQuery`].
pub struct RouteScheduleService {
    schedules: Arc<dyn RouteScheduleRepository>,
    payments: Arc<dyn PaymentRepository>,
    passes: Arc<dyn BusPassRepository>,
}

impl RouteScheduleService {
    pub fn new(
        schedules: Arc<dyn RouteScheduleRepository>,
        payments: Arc<dyn PaymentRepository>,
        passes: Arc<dyn BusPassRepository>,
    ) -> Self {
        Self {
            schedules,
            payments,
            passes,
        }
    }

    async fn referenced(&self, route: &RouteName) -> Result<bool, Error> {
        if self
            .payments
            .any_for_route(route)
            .await
            .map_err(map_payment_store_error)?
        {
            return Ok(true);
        }
        self.passes
            .any_selecting_route(route)
            .await
            .map_err(map_pass_store_error)
    }
}

#[async_trait]
impl ScheduleCommand for RouteScheduleService {
    async fn create(&self, draft: RouteScheduleDraft) -> Result<RouteSchedule, Error> {
        let schedule = draft
            .into_schedule(Uuid::new_v4())
            .map_err(map_validation_error)?;
        // The unique index closes the race with a concurrent create; the
        // adapter surfaces it as DuplicateRoute.
        self.schedules
            .insert(&schedule)
            .await
            .map_err(map_schedule_store_error)?;
        Ok(schedule)
    }

    async fn update(&self, id: Uuid, draft: RouteScheduleDraft) -> Result<RouteSchedule, Error> {
        self.schedules
            .find_by_id(id)
            .await
            .map_err(map_schedule_store_error)?
            .ok_or_else(|| Error::not_found("no such installment schedule"))?;
        let schedule = draft.into_schedule(id).map_err(map_validation_error)?;
        self.schedules
            .update(&schedule)
            .await
            .map_err(map_schedule_store_error)?;
        Ok(schedule)
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let schedule = self
            .schedules
            .find_by_id(id)
            .await
            .map_err(map_schedule_store_error)?
            .ok_or_else(|| Error::not_found("no such installment schedule"))?;
        if self.referenced(&schedule.route_name).await? {
            return Err(Error::conflict(format!(
                "route {} is still referenced by payments or passes",
                schedule.route_name
            ))
            .with_details(json!({
                "code": "schedule_referenced",
                "route": schedule.route_name.as_ref(),
            })));
        }
        let removed = self
            .schedules
            .delete(id)
            .await
            .map_err(map_schedule_store_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("no such installment schedule"))
        }
    }
}

#[async_trait]
impl ScheduleQuery for RouteScheduleService {
    async fn list(&self) -> Result<Vec<RouteSchedule>, Error> {
        self.schedules.list().await.map_err(map_schedule_store_error)
    }

    async fn find_by_route(&self, route: &RouteName) -> Result<RouteSchedule, Error> {
        self.schedules
            .find_by_route_name(route)
            .await
            .map_err(map_schedule_store_error)?
            .ok_or_else(|| Error::not_found(format!("no installment schedule for route {route}")))
    }
}
