//! Authorization decision table.
//!
//! Every role check lives here, consulted once at the HTTP boundary. The
//! domain services themselves are role-agnostic: by the time a workflow
//! method runs, the caller has already been admitted.

use serde_json::json;

use crate::domain::error::Error;
use crate::domain::user::Role;

/// Actions a caller may attempt against the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create, edit, or delete route installment schedules.
    ManageSchedules,
    /// Read route installment schedules.
    ViewSchedules,
    /// Pay an installment or the full route fee for one's own account.
    PayFees,
    /// Read one's own payment history and status.
    ViewOwnPayments,
    /// Read every user's payment records.
    ViewAllPayments,
    /// Delete a payment record.
    DeletePayment,
    /// Mark a pending payment record as paid on a user's behalf.
    MarkPaymentPaid,
    /// View one's own bus pass.
    ViewOwnPass,
    /// Choose or change the route on one's own pass.
    SelectRoute,
}

/// Whether `role` is permitted to perform `action`.
pub fn permits(role: Role, action: Action) -> bool {
    match action {
        Action::ManageSchedules
        | Action::ViewAllPayments
        | Action::DeletePayment
        | Action::MarkPaymentPaid => role == Role::Admin,
        Action::PayFees | Action::ViewOwnPass | Action::SelectRoute => role == Role::User,
        Action::ViewSchedules | Action::ViewOwnPayments => true,
    }
}

/// Admit `role` for `action` or fail with a `403 Forbidden` domain error.
pub fn require(role: Role, action: Action) -> Result<(), Error> {
    if permits(role, action) {
        return Ok(());
    }
    Err(
        Error::forbidden("you are not permitted to perform this action").with_details(json!({
            "code": "action_not_permitted",
            "role": role.as_str(),
        })),
    )
}
