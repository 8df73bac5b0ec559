//! Route installment schedule model.
//!
//! An administrator configures three (amount, deadline) pairs per route.
//! The derived `total_fee` is never stored independently of the parts: it
//! is recomputed on every save.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised while building a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteScheduleValidationError {
    BlankRouteName,
    NegativeAmount { slot: InstallmentNumber },
    InvalidInstallment { value: i32 },
}

impl fmt::Display for RouteScheduleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankRouteName => write!(f, "route name must not be blank"),
            Self::NegativeAmount { slot } => {
                write!(f, "installment {slot} amount must be zero or positive")
            }
            Self::InvalidInstallment { value } => {
                write!(f, "invalid installment number {value}; must be 1, 2, or 3")
            }
        }
    }
}

impl std::error::Error for RouteScheduleValidationError {}

/// Trimmed, non-blank route identifier shared by schedules, passes, and
/// payment records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub struct RouteName(String);

impl RouteName {
    /// Validate and construct a [`RouteName`].
    pub fn new(name: impl Into<String>) -> Result<Self, RouteScheduleValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RouteScheduleValidationError::BlankRouteName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RouteName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RouteName> for String {
    fn from(value: RouteName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RouteName {
    type Error = RouteScheduleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One of the three scheduled installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstallmentNumber {
    One,
    Two,
    Three,
}

impl InstallmentNumber {
    /// All slots in payment order.
    pub const ALL: [Self; 3] = [Self::One, Self::Two, Self::Three];

    /// Parse a caller-supplied installment number; anything outside 1..=3
    /// is rejected.
    pub fn from_i32(value: i32) -> Result<Self, RouteScheduleValidationError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(RouteScheduleValidationError::InvalidInstallment { value }),
        }
    }

    /// Numeric form used by storage and wire payloads.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl fmt::Display for InstallmentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// A single (amount, deadline) pair within a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub amount: Decimal,
    pub deadline: NaiveDate,
}

/// Unsaved schedule as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteScheduleDraft {
    pub route_name: RouteName,
    pub installments: [Installment; 3],
}

impl RouteScheduleDraft {
    /// Validate amounts and produce a schedule with a freshly computed
    /// total fee.
    pub fn into_schedule(self, id: Uuid) -> Result<RouteSchedule, RouteScheduleValidationError> {
        for (slot, installment) in InstallmentNumber::ALL.iter().zip(self.installments.iter()) {
            if installment.amount < Decimal::ZERO {
                return Err(RouteScheduleValidationError::NegativeAmount { slot: *slot });
            }
        }
        Ok(RouteSchedule {
            id,
            route_name: self.route_name,
            installments: self.installments,
            total_fee: self
                .installments
                .iter()
                .map(|installment| installment.amount)
                .sum(),
        })
    }
}

/// Persisted route installment schedule.
///
/// ## Invariants
/// - `route_name` is unique across schedules (enforced by storage).
/// - `total_fee` equals the sum of the three installment amounts; the only
///   constructor recomputes it, so a stale stored value cannot survive a
///   save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteSchedule {
    pub id: Uuid,
    pub route_name: RouteName,
    pub installments: [Installment; 3],
    pub total_fee: Decimal,
}

impl RouteSchedule {
    /// Amount and deadline for one slot.
    pub fn installment(&self, slot: InstallmentNumber) -> Installment {
        match slot {
            InstallmentNumber::One => self.installments[0],
            InstallmentNumber::Two => self.installments[1],
            InstallmentNumber::Three => self.installments[2],
        }
    }

    /// Deadline of the final installment, used as the due date of a
    /// full payment.
    pub fn final_deadline(&self) -> NaiveDate {
        self.installments[2].deadline
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid test date")
    }

    pub(crate) fn draft(route: &str, amounts: [i64; 3]) -> RouteScheduleDraft {
        let deadlines = ["2024-01-01", "2024-02-01", "2024-03-01"];
        let installments = [0, 1, 2].map(|i| Installment {
            amount: Decimal::from(amounts[i]),
            deadline: date(deadlines[i]),
        });
        RouteScheduleDraft {
            route_name: RouteName::new(route).expect("valid route name"),
            installments,
        }
    }

    #[rstest]
    fn total_fee_is_recomputed_from_parts() {
        let schedule = draft("R1", [100, 150, 250])
            .into_schedule(Uuid::new_v4())
            .expect("valid draft");
        assert_eq!(schedule.total_fee, Decimal::from(500));
    }

    #[rstest]
    fn negative_amount_is_rejected_with_slot() {
        let mut d = draft("R1", [100, 100, 100]);
        d.installments[1].amount = Decimal::from(-1);
        let err = d.into_schedule(Uuid::new_v4()).expect_err("negative amount");
        assert_eq!(
            err,
            RouteScheduleValidationError::NegativeAmount {
                slot: InstallmentNumber::Two
            }
        );
    }

    #[rstest]
    #[case("", RouteScheduleValidationError::BlankRouteName)]
    #[case("   ", RouteScheduleValidationError::BlankRouteName)]
    fn blank_route_names_are_rejected(
        #[case] raw: &str,
        #[case] expected: RouteScheduleValidationError,
    ) {
        assert_eq!(RouteName::new(raw).expect_err("blank name"), expected);
    }

    #[rstest]
    fn route_names_are_trimmed() {
        let name = RouteName::new("  North Loop  ").expect("valid name");
        assert_eq!(name.as_ref(), "North Loop");
    }

    #[rstest]
    #[case(1, InstallmentNumber::One)]
    #[case(2, InstallmentNumber::Two)]
    #[case(3, InstallmentNumber::Three)]
    fn installment_numbers_parse(#[case] raw: i32, #[case] expected: InstallmentNumber) {
        assert_eq!(InstallmentNumber::from_i32(raw).expect("valid"), expected);
        assert_eq!(expected.as_i32(), raw);
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(-1)]
    fn out_of_range_installment_numbers_fail(#[case] raw: i32) {
        let err = InstallmentNumber::from_i32(raw).expect_err("out of range");
        assert_eq!(
            err,
            RouteScheduleValidationError::InvalidInstallment { value: raw }
        );
    }

    #[rstest]
    fn slot_lookup_returns_matching_installment() {
        let schedule = draft("R1", [100, 200, 300])
            .into_schedule(Uuid::new_v4())
            .expect("valid draft");
        assert_eq!(
            schedule.installment(InstallmentNumber::Two).amount,
            Decimal::from(200)
        );
        assert_eq!(schedule.final_deadline(), date("2024-03-01"));
    }
}
