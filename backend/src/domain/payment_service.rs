//! Payment workflow.
//!
//! The write paths follow a fixed shape: refuse duplicates, resolve the
//! route's schedule, append the ledger record, then pin the route on the
//! pass and activate it once the schedule is settled. The ledger insert is
//! the commit point; a crash afterwards leaves the pass un-pinned or
//! inactive, which the next successful payment repairs.
//!
//! Authorization happens at the HTTP boundary; nothing here inspects
//! roles.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::bus_pass::BusPass;
use crate::domain::error::Error;
use crate::domain::payment::{PaymentRecord, PaymentStatus, PaymentStatusSummary};
use crate::domain::ports::{
    BusPassRepository, Clock, PassStoreError, PaymentCommand, PaymentQuery, PaymentRepository,
    PaymentStoreError, RouteScheduleRepository, ScheduleStoreError,
};
use crate::domain::route_schedule::{InstallmentNumber, RouteName, RouteSchedule};
use crate::domain::user::UserId;

fn already_paid(message: impl Into<String>) -> Error {
    Error::conflict(message).with_details(json!({ "code": "already_paid" }))
}

fn route_locked(locked: &RouteName) -> Error {
    Error::conflict(format!("route {locked} is locked by completed payments"))
        .with_details(json!({ "code": "route_locked", "route": locked.as_ref() }))
}

/// The route a paid ledger entry locks the user to, if any. Legacy
/// lump-sum records carry no route and lock nothing.
fn paid_route(record: &PaymentRecord) -> Option<&RouteName> {
    record.is_paid().then_some(record.route_name.as_ref()).flatten()
}

fn map_payment_store_error(err: PaymentStoreError) -> Error {
    match err {
        PaymentStoreError::Connection { .. } => {
            Error::service_unavailable("payment store unavailable")
        }
        PaymentStoreError::NotFound => Error::not_found("payment record not found"),
        PaymentStoreError::DuplicatePayment => {
            already_paid("this installment has already been paid")
        }
        PaymentStoreError::Query { message } => {
            Error::internal(format!("payment store failure: {message}"))
        }
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

fn map_schedule_store_error(err: ScheduleStoreError) -> Error {
    match err {
        ScheduleStoreError::Connection { .. } => {
            Error::service_unavailable("schedule store unavailable")
        }
        other => Error::internal(format!("schedule store failure: {other}")),
    }
}

/// Application service behind [`PaymentCommand`] and [`PaymentQuery`].
pub struct PaymentWorkflow {
    payments: Arc<dyn PaymentRepository>,
    passes: Arc<dyn BusPassRepository>,
    schedules: Arc<dyn RouteScheduleRepository>,
    clock: Arc<dyn Clock>,
}

impl PaymentWorkflow {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        passes: Arc<dyn BusPassRepository>,
        schedules: Arc<dyn RouteScheduleRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            payments,
            passes,
            schedules,
            clock,
        }
    }

    async fn schedule_for(&self, route: &RouteName) -> Result<RouteSchedule, Error> {
        self.schedules
            .find_by_route_name(route)
            .await
            .map_err(map_schedule_store_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no installment schedule configured for route {route}"))
                    .with_details(json!({ "code": "config_missing", "route": route.as_ref() }))
            })
    }

    /// Reject the payment when any PAID record pins the user to a
    /// different route. Mirrors the selection lock on the pass itself.
    async fn assert_route_unlocked(
        &self,
        user_id: &UserId,
        route: &RouteName,
    ) -> Result<(), Error> {
        let ledger = self
            .payments
            .list_by_user(user_id)
            .await
            .map_err(map_payment_store_error)?;
        match ledger
            .iter()
            .filter_map(paid_route)
            .find(|locked| *locked != route)
        {
            Some(locked) => Err(route_locked(locked)),
            None => Ok(()),
        }
    }

    /// Pin `route` on the user's pass and activate it when the paid
    /// records settle the schedule. The route lock was checked before the
    /// ledger insert, so the overwrite here cannot strand a paid route.
    /// Runs after the insert; a failure leaves the payment recorded and
    /// the pass repairable.
    async fn pin_route_and_refresh(&self, user_id: &UserId, route: &RouteName) -> Result<(), Error> {
        let mut pass = self
            .passes
            .find_by_user(user_id)
            .await
            .map_err(map_pass_store_error)?
            .unwrap_or_else(|| BusPass::new_inactive(user_id.clone()));
        pass.selected_route = Some(route.clone());
        let paid = self
            .payments
            .list_paid_for_route(user_id, route)
            .await
            .map_err(map_payment_store_error)?;
        if PaymentStatusSummary::from_paid_records(&paid, pass.is_active()).is_settled() {
            pass.activate();
        }
        self.passes.save(&pass).await.map_err(map_pass_store_error)
    }
}

#[async_trait]
impl PaymentCommand for PaymentWorkflow {
    async fn pay_installment(
        &self,
        user_id: &UserId,
        route: &RouteName,
        installment: InstallmentNumber,
    ) -> Result<(), Error> {
        self.assert_route_unlocked(user_id, route).await?;
        let paid = self
            .payments
            .list_paid_for_route(user_id, route)
            .await
            .map_err(map_payment_store_error)?;
        if paid
            .iter()
            .any(|record| record.installment == Some(installment) || record.is_full_payment)
        {
            return Err(already_paid("this installment has already been paid"));
        }

        let schedule = self.schedule_for(route).await?;
        let slot = schedule.installment(installment);
        let record = PaymentRecord::paid_installment(
            user_id.clone(),
            route.clone(),
            installment,
            slot.amount,
            slot.deadline,
            self.clock.today(),
        );
        self.payments
            .insert(&record)
            .await
            .map_err(map_payment_store_error)?;

        self.pin_route_and_refresh(user_id, route).await
    }

    async fn pay_all_installments(
        &self,
        user_id: &UserId,
        route: &RouteName,
    ) -> Result<(), Error> {
        self.assert_route_unlocked(user_id, route).await?;
        let paid = self
            .payments
            .list_paid_for_route(user_id, route)
            .await
            .map_err(map_payment_store_error)?;
        if !paid.is_empty() {
            return Err(already_paid(
                "payments already exist for this route; pay the remaining installments individually",
            ));
        }

        let schedule = self.schedule_for(route).await?;
        let record = PaymentRecord::paid_in_full(
            user_id.clone(),
            route.clone(),
            schedule.total_fee,
            schedule.final_deadline(),
            self.clock.today(),
        );
        self.payments
            .insert(&record)
            .await
            .map_err(map_payment_store_error)?;

        self.pin_route_and_refresh(user_id, route).await
    }

    async fn settle_outstanding(&self, user_id: &UserId) -> Result<Decimal, Error> {
        let pending: Vec<PaymentRecord> = self
            .payments
            .list_by_user(user_id)
            .await
            .map_err(map_payment_store_error)?
            .into_iter()
            .filter(PaymentRecord::is_pending)
            .collect();
        if pending.is_empty() {
            return Err(Error::conflict("no outstanding fees to settle")
                .with_details(json!({ "code": "no_outstanding_fees" })));
        }

        let total: Decimal = pending.iter().map(|record| record.amount).sum();
        let settlement =
            PaymentRecord::legacy_lump_sum(user_id.clone(), total, self.clock.today());
        self.payments
            .insert(&settlement)
            .await
            .map_err(map_payment_store_error)?;
        for record in &pending {
            // A concurrent settlement may have removed the row already.
            match self.payments.delete(record.id).await {
                Ok(()) | Err(PaymentStoreError::NotFound) => {}
                Err(err) => return Err(map_payment_store_error(err)),
            }
        }
        Ok(total)
    }

    async fn mark_paid(&self, payment_id: Uuid) -> Result<(), Error> {
        self.payments
            .set_status(payment_id, PaymentStatus::Paid)
            .await
            .map_err(map_payment_store_error)
    }

    async fn delete_payment(&self, payment_id: Uuid) -> Result<(), Error> {
        self.payments
            .delete(payment_id)
            .await
            .map_err(map_payment_store_error)
    }
}

#[async_trait]
impl PaymentQuery for PaymentWorkflow {
    async fn payment_status(&self, user_id: &UserId) -> Result<PaymentStatusSummary, Error> {
        let Some(pass) = self
            .passes
            .find_by_user(user_id)
            .await
            .map_err(map_pass_store_error)?
        else {
            return Ok(PaymentStatusSummary::default());
        };
        let Some(route) = pass.selected_route.clone() else {
            return Ok(PaymentStatusSummary {
                pass_active: pass.is_active(),
                ..PaymentStatusSummary::default()
            });
        };
        let paid = self
            .payments
            .list_paid_for_route(user_id, &route)
            .await
            .map_err(map_payment_store_error)?;
        Ok(PaymentStatusSummary::from_paid_records(
            &paid,
            pass.is_active(),
        ))
    }

    async fn payments_for_user(&self, user_id: &UserId) -> Result<Vec<PaymentRecord>, Error> {
        self.payments
            .list_by_user(user_id)
            .await
            .map_err(map_payment_store_error)
    }

    async fn all_payments(&self) -> Result<Vec<PaymentRecord>, Error> {
        self.payments.list_all().await.map_err(map_payment_store_error)
    }
}
