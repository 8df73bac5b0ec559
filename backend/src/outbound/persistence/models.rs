//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and
//! must never be exposed to the domain. Conversions to domain entities
//! live in the adapter that owns each table.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{passes, payments, route_schedules, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub password_digest: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub password_digest: &'a str,
}

/// Row struct for reading from the route_schedules table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = route_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RouteScheduleRow {
    pub id: Uuid,
    pub route_name: String,
    pub installment1_amount: Decimal,
    pub installment1_deadline: NaiveDate,
    pub installment2_amount: Decimal,
    pub installment2_deadline: NaiveDate,
    pub installment3_amount: Decimal,
    pub installment3_deadline: NaiveDate,
    pub total_fee: Decimal,
}

/// Insertable struct for creating schedule records; doubles as the
/// changeset for full-row updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = route_schedules)]
pub(crate) struct NewRouteScheduleRow<'a> {
    pub id: Uuid,
    pub route_name: &'a str,
    pub installment1_amount: Decimal,
    pub installment1_deadline: NaiveDate,
    pub installment2_amount: Decimal,
    pub installment2_deadline: NaiveDate,
    pub installment3_amount: Decimal,
    pub installment3_deadline: NaiveDate,
    pub total_fee: Decimal,
}

/// Row struct for reading from the passes table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = passes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PassRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub selected_route: Option<String>,
    pub status: String,
}

/// Insertable struct for upserting pass records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = passes)]
pub(crate) struct NewPassRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub selected_route: Option<&'a str>,
    pub status: &'a str,
}

/// Row struct for reading from the payments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub route_name: Option<String>,
    pub installment_number: Option<i32>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: String,
    pub is_full_payment: bool,
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub(crate) struct NewPaymentRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub route_name: Option<&'a str>,
    pub installment_number: Option<i32>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: &'a str,
    pub is_full_payment: bool,
}
