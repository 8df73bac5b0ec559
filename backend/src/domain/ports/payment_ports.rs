//! Driving ports for the payment workflow.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::error::Error;
use crate::domain::payment::{PaymentRecord, PaymentStatusSummary};
use crate::domain::route_schedule::{InstallmentNumber, RouteName};
use crate::domain::user::UserId;

/// Mutations against the payment ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Record payment of one installment slot, activating the pass once
    /// the schedule is settled.
    async fn pay_installment(
        &self,
        user_id: &UserId,
        route: &RouteName,
        installment: InstallmentNumber,
    ) -> Result<(), Error>;

    /// Record payment of the whole schedule in one transaction and
    /// activate the pass.
    async fn pay_all_installments(&self, user_id: &UserId, route: &RouteName)
        -> Result<(), Error>;

    /// Collapse a user's pending dues into one paid record, returning the
    /// amount settled. Does not activate the pass.
    async fn settle_outstanding(&self, user_id: &UserId) -> Result<Decimal, Error>;

    /// Administrative: mark an arbitrary ledger record paid.
    async fn mark_paid(&self, payment_id: Uuid) -> Result<(), Error>;

    /// Administrative: remove a ledger record.
    async fn delete_payment(&self, payment_id: Uuid) -> Result<(), Error>;
}

/// Read-only ledger queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentQuery: Send + Sync {
    /// Settlement progress for the user's selected route.
    async fn payment_status(&self, user_id: &UserId) -> Result<PaymentStatusSummary, Error>;

    /// All ledger records for one user, newest first.
    async fn payments_for_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, Error>;

    /// Administrative: the whole ledger.
    async fn all_payments(&self) -> Result<Vec<PaymentRecord>, Error>;
}

/// Fixture command: every mutation succeeds and settles nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentCommand;

#[async_trait]
impl PaymentCommand for FixturePaymentCommand {
    async fn pay_installment(
        &self,
        _user_id: &UserId,
        _route: &RouteName,
        _installment: InstallmentNumber,
    ) -> Result<(), Error> {
        Ok(())
    }

    async fn pay_all_installments(
        &self,
        _user_id: &UserId,
        _route: &RouteName,
    ) -> Result<(), Error> {
        Ok(())
    }

    async fn settle_outstanding(&self, _user_id: &UserId) -> Result<Decimal, Error> {
        Ok(Decimal::ZERO)
    }

    async fn mark_paid(&self, _payment_id: Uuid) -> Result<(), Error> {
        Ok(())
    }

    async fn delete_payment(&self, _payment_id: Uuid) -> Result<(), Error> {
        Ok(())
    }
}

/// Fixture query: an empty ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentQuery;

#[async_trait]
impl PaymentQuery for FixturePaymentQuery {
    async fn payment_status(&self, _user_id: &UserId) -> Result<PaymentStatusSummary, Error> {
        Ok(PaymentStatusSummary::default())
    }

    async fn payments_for_user(&self, _user_id: &UserId) -> Result<Vec<PaymentRecord>, Error> {
        Ok(Vec::new())
    }

    async fn all_payments(&self) -> Result<Vec<PaymentRecord>, Error> {
        Ok(Vec::new())
    }
}
