//! PostgreSQL-backed `PaymentRepository` implementation.
//!
//! The partial unique index `payments_paid_slot_unique` rejects a second
//! PAID row for the same (user, route, installment) slot; its violation
//! surfaces as [`PaymentStoreError::DuplicatePayment`] so the workflow's
//! read-before-write check cannot race with a concurrent payment.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::domain::ports::{PaymentRepository, PaymentStoreError};
use crate::domain::route_schedule::{InstallmentNumber, RouteName};
use crate::domain::user::UserId;

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewPaymentRow, PaymentRow};
use super::pool::{DbPool, PoolError};
use super::schema::payments;

const PAID_SLOT_UNIQUE_INDEX: &str = "payments_paid_slot_unique";

/// Diesel-backed implementation of the `PaymentRepository` port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PaymentStoreError {
    match classify_pool_error(error) {
        DbFailure::Connection(message) => PaymentStoreError::connection(message),
        _ => PaymentStoreError::query("pool failure"),
    }
}

fn map_failure(failure: DbFailure) -> PaymentStoreError {
    if failure.violates(PAID_SLOT_UNIQUE_INDEX) {
        return PaymentStoreError::DuplicatePayment;
    }
    match failure {
        DbFailure::Connection(message) => PaymentStoreError::connection(message),
        DbFailure::NotFound => PaymentStoreError::NotFound,
        DbFailure::Query(message) | DbFailure::UniqueViolation { message, .. } => {
            PaymentStoreError::query(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PaymentStoreError {
    map_failure(classify_diesel_error(error))
}

/// Convert a database row to a domain [`PaymentRecord`].
fn row_to_record(row: PaymentRow) -> Result<PaymentRecord, PaymentStoreError> {
    let route_name = row
        .route_name
        .map(RouteName::new)
        .transpose()
        .map_err(|err| PaymentStoreError::query(format!("stored route name invalid: {err}")))?;
    let installment = row
        .installment_number
        .map(InstallmentNumber::from_i32)
        .transpose()
        .map_err(|err| PaymentStoreError::query(format!("stored installment invalid: {err}")))?;
    let status = PaymentStatus::parse(&row.status).ok_or_else(|| {
        PaymentStoreError::query(format!("unrecognised payment status {}", row.status))
    })?;
    Ok(PaymentRecord {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        route_name,
        installment,
        amount: row.amount,
        due_date: row.due_date,
        payment_date: row.payment_date,
        status,
        is_full_payment: row.is_full_payment,
    })
}

fn record_to_row(record: &PaymentRecord) -> NewPaymentRow<'_> {
    NewPaymentRow {
        id: record.id,
        user_id: *record.user_id.as_uuid(),
        route_name: record.route_name.as_ref().map(AsRef::as_ref),
        installment_number: record.installment.map(InstallmentNumber::as_i32),
        amount: record.amount,
        due_date: record.due_date,
        payment_date: record.payment_date,
        status: record.status.as_str(),
        is_full_payment: record.is_full_payment,
    }
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<(), PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(payments::table)
            .values(&record_to_row(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::user_id.eq(user_id.as_uuid()))
            .select(PaymentRow::as_select())
            .order_by(payments::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn list_all(&self) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PaymentRow> = payments::table
            .select(PaymentRow::as_select())
            .order_by(payments::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn list_paid_for_route(
        &self,
        user_id: &UserId,
        route: &RouteName,
    ) -> Result<Vec<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::user_id.eq(user_id.as_uuid()))
            .filter(payments::route_name.eq(route.as_ref()))
            .filter(payments::status.eq(PaymentStatus::Paid.as_str()))
            .select(PaymentRow::as_select())
            .order_by(payments::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn any_for_route(&self, route: &RouteName) -> Result<bool, PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            payments::table.filter(payments::route_name.eq(route.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentRecord>, PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PaymentRow> = payments::table
            .find(id)
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn set_status(&self, id: Uuid, status: PaymentStatus) -> Result<(), PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(payments::table.find(id))
            .set(payments::status.eq(status.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(PaymentStoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), PaymentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(payments::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if deleted == 0 {
            return Err(PaymentStoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn date(s: &str) -> chrono::NaiveDate {
        s.parse().expect("valid test date")
    }

    fn payment_row() -> PaymentRow {
        PaymentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            route_name: Some("North Loop".to_owned()),
            installment_number: Some(2),
            amount: Decimal::from(150),
            due_date: date("2024-08-01"),
            payment_date: Some(date("2024-07-28")),
            status: "PAID".to_owned(),
            is_full_payment: false,
        }
    }

    #[rstest]
    fn row_converts_to_domain_record() {
        let record = row_to_record(payment_row()).expect("valid row converts");
        assert_eq!(record.installment, Some(InstallmentNumber::Two));
        assert_eq!(record.status, PaymentStatus::Paid);
        assert_eq!(record.amount, Decimal::from(150));
    }

    #[rstest]
    fn legacy_row_without_route_converts() {
        let mut row = payment_row();
        row.route_name = None;
        row.installment_number = None;
        let record = row_to_record(row).expect("legacy row converts");
        assert!(record.route_name.is_none());
        assert!(record.installment.is_none());
    }

    #[rstest]
    #[case(Some(4), "PAID")]
    #[case(Some(1), "SETTLED")]
    fn corrupt_row_surfaces_as_query_error(#[case] installment: Option<i32>, #[case] status: &str) {
        let mut row = payment_row();
        row.installment_number = installment;
        row.status = status.to_owned();
        let err = row_to_record(row).expect_err("corrupt row must fail");
        assert!(matches!(err, PaymentStoreError::Query { .. }));
    }

    #[rstest]
    fn paid_slot_violation_maps_to_duplicate_payment() {
        let failure = DbFailure::UniqueViolation {
            constraint: Some(PAID_SLOT_UNIQUE_INDEX.to_owned()),
            message: "duplicate key value".to_owned(),
        };
        assert_eq!(map_failure(failure), PaymentStoreError::DuplicatePayment);
    }

    #[rstest]
    fn missing_row_maps_to_not_found() {
        assert_eq!(
            map_diesel_error(diesel::result::Error::NotFound),
            PaymentStoreError::NotFound
        );
    }
}
