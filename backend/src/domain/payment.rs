//! Payment ledger records.
//!
//! The ledger is append-oriented: each successful payment action creates a
//! new record. The one exception is the legacy mark-pending-paid path kept
//! for accounts that predate route selection.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::route_schedule::{InstallmentNumber, RouteName};
use crate::domain::user::UserId;

/// Lifecycle state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl PaymentStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "OVERDUE" => Some(Self::Overdue),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// One entry in the payment ledger.
///
/// `route_name` and `installment` are `None` on legacy lump-sum records
/// created before route-based schedules existed. `is_full_payment` marks
/// the newer single-transaction full payment, which carries a route but no
/// installment number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub route_name: Option<RouteName>,
    pub installment: Option<InstallmentNumber>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub is_full_payment: bool,
}

impl PaymentRecord {
    /// A settled record for one installment slot.
    pub fn paid_installment(
        user_id: UserId,
        route_name: RouteName,
        installment: InstallmentNumber,
        amount: Decimal,
        due_date: NaiveDate,
        paid_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            route_name: Some(route_name),
            installment: Some(installment),
            amount,
            due_date,
            payment_date: Some(paid_on),
            status: PaymentStatus::Paid,
            is_full_payment: false,
        }
    }

    /// A settled record covering the whole route fee in one transaction.
    pub fn paid_in_full(
        user_id: UserId,
        route_name: RouteName,
        amount: Decimal,
        due_date: NaiveDate,
        paid_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            route_name: Some(route_name),
            installment: None,
            amount,
            due_date,
            payment_date: Some(paid_on),
            status: PaymentStatus::Paid,
            is_full_payment: true,
        }
    }

    /// A legacy lump-sum settlement with no route attribution.
    pub fn legacy_lump_sum(user_id: UserId, amount: Decimal, paid_on: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            route_name: None,
            installment: None,
            amount,
            due_date: paid_on,
            payment_date: Some(paid_on),
            status: PaymentStatus::Paid,
            is_full_payment: false,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }
}

/// Read-only snapshot of a user's settlement progress on their selected
/// route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusSummary {
    pub has_full_payment: bool,
    pub has_installment1: bool,
    pub has_installment2: bool,
    pub has_installment3: bool,
    pub pass_active: bool,
}

impl PaymentStatusSummary {
    /// Derive the slot flags from a set of PAID records for one route.
    pub fn from_paid_records(records: &[PaymentRecord], pass_active: bool) -> Self {
        let has_slot = |slot: InstallmentNumber| {
            records
                .iter()
                .any(|record| record.is_paid() && record.installment == Some(slot))
        };
        Self {
            has_full_payment: records
                .iter()
                .any(|record| record.is_paid() && record.is_full_payment),
            has_installment1: has_slot(InstallmentNumber::One),
            has_installment2: has_slot(InstallmentNumber::Two),
            has_installment3: has_slot(InstallmentNumber::Three),
            pass_active,
        }
    }

    /// Whether the route is fully settled: every slot paid individually,
    /// or one full-payment record.
    pub fn is_settled(&self) -> bool {
        self.has_full_payment
            || (self.has_installment1 && self.has_installment2 && self.has_installment3)
    }
}
