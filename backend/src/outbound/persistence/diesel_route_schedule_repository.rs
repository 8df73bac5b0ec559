//! PostgreSQL-backed `RouteScheduleRepository` implementation.
//!
//! Surfaces a unique violation on the route name as
//! [`ScheduleStoreError::DuplicateRoute`], closing the race between the
//! service's pre-check and a concurrent create.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RouteScheduleRepository, ScheduleStoreError};
use crate::domain::route_schedule::{Installment, RouteName, RouteSchedule};

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewRouteScheduleRow, RouteScheduleRow};
use super::pool::{DbPool, PoolError};
use super::schema::route_schedules;

const ROUTE_UNIQUE_CONSTRAINT: &str = "route_schedules_route_name_key";

/// Diesel-backed implementation of the `RouteScheduleRepository` port.
#[derive(Clone)]
pub struct DieselRouteScheduleRepository {
    pool: DbPool,
}

impl DieselRouteScheduleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ScheduleStoreError {
    match classify_pool_error(error) {
        DbFailure::Connection(message) => ScheduleStoreError::connection(message),
        _ => ScheduleStoreError::query("pool failure"),
    }
}

fn map_failure(failure: DbFailure, route: Option<&RouteName>) -> ScheduleStoreError {
    if let Some(route) = route {
        if failure.violates(ROUTE_UNIQUE_CONSTRAINT) {
            return ScheduleStoreError::duplicate_route(route.as_ref());
        }
    }
    match failure {
        DbFailure::Connection(message) => ScheduleStoreError::connection(message),
        DbFailure::NotFound => ScheduleStoreError::query("record not found"),
        DbFailure::Query(message) | DbFailure::UniqueViolation { message, .. } => {
            ScheduleStoreError::query(message)
        }
    }
}

fn map_read_failure(error: diesel::result::Error) -> ScheduleStoreError {
    map_failure(classify_diesel_error(error), None)
}

/// Convert a database row to a domain [`RouteSchedule`].
fn row_to_schedule(row: RouteScheduleRow) -> Result<RouteSchedule, ScheduleStoreError> {
    let route_name = RouteName::new(row.route_name)
        .map_err(|err| ScheduleStoreError::query(format!("stored route name invalid: {err}")))?;
    Ok(RouteSchedule {
        id: row.id,
        route_name,
        installments: [
            Installment {
                amount: row.installment1_amount,
                deadline: row.installment1_deadline,
            },
            Installment {
                amount: row.installment2_amount,
                deadline: row.installment2_deadline,
            },
            Installment {
                amount: row.installment3_amount,
                deadline: row.installment3_deadline,
            },
        ],
        total_fee: row.total_fee,
    })
}

fn schedule_to_row(schedule: &RouteSchedule) -> NewRouteScheduleRow<'_> {
    NewRouteScheduleRow {
        id: schedule.id,
        route_name: schedule.route_name.as_ref(),
        installment1_amount: schedule.installments[0].amount,
        installment1_deadline: schedule.installments[0].deadline,
        installment2_amount: schedule.installments[1].amount,
        installment2_deadline: schedule.installments[1].deadline,
        installment3_amount: schedule.installments[2].amount,
        installment3_deadline: schedule.installments[2].deadline,
        total_fee: schedule.total_fee,
    }
}

#[async_trait]
impl RouteScheduleRepository for DieselRouteScheduleRepository {
    async fn list(&self) -> Result<Vec<RouteSchedule>, ScheduleStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RouteScheduleRow> = route_schedules::table
            .select(RouteScheduleRow::as_select())
            .order_by(route_schedules::route_name.asc())
            .load(&mut conn)
            .await
            .map_err(map_read_failure)?;

        rows.into_iter().map(row_to_schedule).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RouteSchedule>, ScheduleStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RouteScheduleRow> = route_schedules::table
            .find(id)
            .select(RouteScheduleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_failure)?;

        row.map(row_to_schedule).transpose()
    }

    async fn find_by_route_name(
        &self,
        route: &RouteName,
    ) -> Result<Option<RouteSchedule>, ScheduleStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<RouteScheduleRow> = route_schedules::table
            .filter(route_schedules::route_name.eq(route.as_ref()))
            .select(RouteScheduleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_failure)?;

        row.map(row_to_schedule).transpose()
    }

    async fn insert(&self, schedule: &RouteSchedule) -> Result<(), ScheduleStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(route_schedules::table)
            .values(&schedule_to_row(schedule))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_failure(classify_diesel_error(err), Some(&schedule.route_name)))
    }

    async fn update(&self, schedule: &RouteSchedule) -> Result<(), ScheduleStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(route_schedules::table.find(schedule.id))
            .set(&schedule_to_row(schedule))
            .execute(&mut conn)
            .await
            .map_err(|err| map_failure(classify_diesel_error(err), Some(&schedule.route_name)))?;

        if updated == 0 {
            return Err(ScheduleStoreError::query("schedule not found for update"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ScheduleStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(route_schedules::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_read_failure)?;

        Ok(deleted > 0)
    }
}
