//! PostgreSQL-backed `BusPassRepository` implementation.
//!
//! `save` is an upsert keyed on the unique `user_id` column, so the
//! one-pass-per-user invariant holds even under concurrent first-touch
//! creation.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::bus_pass::{BusPass, PassStatus};
use crate::domain::ports::{BusPassRepository, PassStoreError};
use crate::domain::route_schedule::RouteName;
use crate::domain::user::UserId;

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewPassRow, PassRow};
use super::pool::{DbPool, PoolError};
use super::schema::passes;

/// Diesel-backed implementation of the `BusPassRepository` port.
#[derive(Clone)]
pub struct DieselBusPassRepository {
    pool: DbPool,
}

impl DieselBusPassRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PassStoreError {
    match classify_pool_error(error) {
        DbFailure::Connection(message) => PassStoreError::connection(message),
        _ => PassStoreError::query("pool failure"),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PassStoreError {
    match classify_diesel_error(error) {
        DbFailure::Connection(message) => PassStoreError::connection(message),
        DbFailure::NotFound => PassStoreError::query("record not found"),
        DbFailure::Query(message) | DbFailure::UniqueViolation { message, .. } => {
            PassStoreError::query(message)
        }
    }
}

/// Convert a database row to a domain [`BusPass`]. Status parsing is
/// lenient: an unrecognised value reads as inactive rather than failing
/// the lookup.
fn row_to_pass(row: PassRow) -> Result<BusPass, PassStoreError> {
    let selected_route = row
        .selected_route
        .map(RouteName::new)
        .transpose()
        .map_err(|err| PassStoreError::query(format!("stored route name invalid: {err}")))?;
    Ok(BusPass {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        selected_route,
        status: PassStatus::parse_lenient(&row.status),
    })
}

#[async_trait]
impl BusPassRepository for DieselBusPassRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<BusPass>, PassStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PassRow> = passes::table
            .filter(passes::user_id.eq(user_id.as_uuid()))
            .select(PassRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_pass).transpose()
    }

    async fn save(&self, pass: &BusPass) -> Result<(), PassStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let route = pass.selected_route.as_ref().map(AsRef::as_ref);
        let status = pass.status.as_str();
        let new_row = NewPassRow {
            id: pass.id,
            user_id: *pass.user_id.as_uuid(),
            selected_route: route,
            status,
        };

        diesel::insert_into(passes::table)
            .values(&new_row)
            .on_conflict(passes::user_id)
            .do_update()
            .set((
                passes::selected_route.eq(route),
                passes::status.eq(status),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn any_selecting_route(&self, route: &RouteName) -> Result<bool, PassStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            passes::table.filter(passes::selected_route.eq(route.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn pass_row(selected_route: Option<&str>, status: &str) -> PassRow {
        PassRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            selected_route: selected_route.map(str::to_owned),
            status: status.to_owned(),
        }
    }

    #[rstest]
    fn row_converts_to_domain_pass() {
        let pass = row_to_pass(pass_row(Some("North Loop"), "ACTIVE")).expect("valid row");
        assert!(pass.is_active());
        assert_eq!(
            pass.selected_route.as_ref().map(AsRef::as_ref),
            Some("North Loop")
        );
    }

    #[rstest]
    fn unknown_stored_status_reads_as_inactive() {
        let pass = row_to_pass(pass_row(None, "garbage")).expect("lenient status parse");
        assert!(!pass.is_active());
    }

    #[rstest]
    fn blank_stored_route_surfaces_as_query_error() {
        let err = row_to_pass(pass_row(Some("  "), "ACTIVE")).expect_err("blank route must fail");
        assert!(matches!(err, PassStoreError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::build("bad url"));
        assert!(matches!(err, PassStoreError::Connection { .. }));
    }
}
