//! Bus pass service.
//!
//! Owns pass creation, route selection, and the pass view. Passes are
//! created lazily: the first selection or view materialises an inactive
//! pass for the user.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::bus_pass::BusPass;
use crate::domain::error::Error;
use crate::domain::payment::PaymentStatusSummary;
use crate::domain::ports::{
    BusPassRepository, PassCommand, PassQuery, PassStoreError, PassView, PaymentRepository,
    PaymentStoreError, UserPersistenceError, UserRepository,
};
use crate::domain::route_schedule::RouteName;
use crate::domain::user::UserId;

fn map_pass_store_error(err: PassStoreError) -> Error {
    match err {
        PassStoreError::Connection { .. } => Error::service_unavailable("pass store unavailable"),
        PassStoreError::Query { message } => {
            Error::internal(format!("pass store failure: {message}"))
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

fn map_user_store_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { .. } => {
            Error::service_unavailable("user store unavailable")
        }
        other => Error::internal(format!("user store failure: {other}")),
    }
}

/// Application service behind [`PassCommand`] and [`PassQuery`].
pub struct BusPassService {
    passes: Arc<dyn BusPassRepository>,
    payments: Arc<dyn PaymentRepository>,
    users: Arc<dyn UserRepository>,
}

impl BusPassService {
    pub fn new(
        passes: Arc<dyn BusPassRepository>,
        payments: Arc<dyn PaymentRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            passes,
            payments,
            users,
        }
    }

    /// Fetch the user's pass, creating an inactive one on first touch.
    async fn get_or_create(&self, user_id: &UserId) -> Result<BusPass, Error> {
        if let Some(pass) = self
            .passes
            .find_by_user(user_id)
            .await
            .map_err(map_pass_store_error)?
        {
            return Ok(pass);
        }
        let pass = BusPass::new_inactive(user_id.clone());
        self.passes.save(&pass).await.map_err(map_pass_store_error)?;
        Ok(pass)
    }
}

#[async_trait]
impl PassCommand for BusPassService {
    async fn select_route(&self, user_id: &UserId, route: RouteName) -> Result<(), Error> {
        let mut pass = self.get_or_create(user_id).await?;
        // Any PAID record pins the user to its route, whether or not the
        // pass currently points there. Legacy lump-sum records carry no
        // route and lock nothing.
        let ledger = self
            .payments
            .list_by_user(user_id)
            .await
            .map_err(map_payment_store_error)?;
        let locked = ledger.iter().find_map(|record| {
            record
                .route_name
                .as_ref()
                .filter(|name| record.is_paid() && **name != route)
        });
        if let Some(locked) = locked {
            return Err(Error::conflict(format!(
                "route {locked} is locked by completed payments"
            ))
            .with_details(json!({ "code": "route_locked", "route": locked.as_ref() })));
        }
        pass.selected_route = Some(route);
        self.passes.save(&pass).await.map_err(map_pass_store_error)
    }
}

#[async_trait]
impl PassQuery for BusPassService {
    async fn pass_view(&self, user_id: &UserId) -> Result<PassView, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("no account for this session"))?;
        let pass = self.get_or_create(user_id).await?;
        let summary = match &pass.selected_route {
            Some(route) => {
                let paid = self
                    .payments
                    .list_paid_for_route(user_id, route)
                    .await
                    .map_err(map_payment_store_error)?;
                PaymentStatusSummary::from_paid_records(&paid, pass.is_active())
            }
            None => PaymentStatusSummary {
                pass_active: pass.is_active(),
                ..PaymentStatusSummary::default()
            },
        };
        Ok(PassView {
            holder_name: user.name().to_owned(),
            holder_email: user.email().to_string(),
            selected_route: pass.selected_route,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::payment::PaymentRecord;
    use crate::domain::ports::{
        MockBusPassRepository, MockPaymentRepository, MockUserRepository,
    };
    use crate::domain::route_schedule::InstallmentNumber;
    use crate::domain::user::{Email, Role, User};
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn route(name: &str) -> RouteName {
        RouteName::new(name).expect("valid route")
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid test date")
    }

    fn paid_record(user_id: &UserId, route_name: &str) -> PaymentRecord {
        PaymentRecord::paid_installment(
            user_id.clone(),
            route(route_name),
            InstallmentNumber::One,
            Decimal::from(100),
            date("2024-01-01"),
            date("2024-01-01"),
        )
    }

    fn pass_with_route(user_id: &UserId, route_name: &str) -> BusPass {
        let mut pass = BusPass::new_inactive(user_id.clone());
        pass.selected_route = Some(route(route_name));
        pass
    }

    fn service(
        passes: MockBusPassRepository,
        payments: MockPaymentRepository,
        users: MockUserRepository,
    ) -> BusPassService {
        BusPassService::new(Arc::new(passes), Arc::new(payments), Arc::new(users))
    }

    #[tokio::test]
    async fn first_selection_creates_an_inactive_pass() {
        let user_id = UserId::random();
        let mut passes = MockBusPassRepository::new();
        passes
            .expect_find_by_user()
            .times(1)
            .returning(|_| Ok(None));
        // One save for creation, one for the selection itself.
        passes
            .expect_save()
            .times(2)
            .returning(|_| Ok(()));
        let mut payments = MockPaymentRepository::new();
        payments.expect_list_by_user().returning(|_| Ok(Vec::new()));
        let svc = service(passes, payments, MockUserRepository::new());

        svc.select_route(&user_id, route("North Loop"))
            .await
            .expect("selection succeeds");
    }

    #[tokio::test]
    async fn switching_away_from_a_paid_route_is_rejected() {
        let user_id = UserId::random();
        let existing = pass_with_route(&user_id, "North Loop");
        let mut passes = MockBusPassRepository::new();
        passes
            .expect_find_by_user()
            .returning(move |_| Ok(Some(existing.clone())));
        passes.expect_save().never();
        let mut payments = MockPaymentRepository::new();
        let record_owner = user_id.clone();
        payments
            .expect_list_by_user()
            .returning(move |_| Ok(vec![paid_record(&record_owner, "North Loop")]));
        let svc = service(passes, payments, MockUserRepository::new());

        let err = svc
            .select_route(&user_id, route("South Loop"))
            .await
            .expect_err("locked route");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.details().expect("details")["code"], "route_locked");
    }

    #[tokio::test]
    async fn paid_route_locks_selection_even_when_the_pass_points_elsewhere() {
        // The pass was repointed (or never pointed) but a PAID record on
        // another route still pins the user.
        let user_id = UserId::random();
        let mut passes = MockBusPassRepository::new();
        passes.expect_find_by_user().returning(|_| Ok(None));
        // get_or_create saves the fresh pass; the selection itself must not.
        passes.expect_save().times(1).returning(|_| Ok(()));
        let mut payments = MockPaymentRepository::new();
        let record_owner = user_id.clone();
        payments
            .expect_list_by_user()
            .returning(move |_| Ok(vec![paid_record(&record_owner, "North Loop")]));
        let svc = service(passes, payments, MockUserRepository::new());

        let err = svc
            .select_route(&user_id, route("South Loop"))
            .await
            .expect_err("locked route");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.details().expect("details")["route"], "North Loop");
    }

    #[tokio::test]
    async fn switching_routes_before_any_payment_is_allowed() {
        let user_id = UserId::random();
        let existing = pass_with_route(&user_id, "North Loop");
        let mut passes = MockBusPassRepository::new();
        passes
            .expect_find_by_user()
            .returning(move |_| Ok(Some(existing.clone())));
        passes
            .expect_save()
            .withf(|pass| pass.selected_route.as_ref().map(AsRef::as_ref) == Some("South Loop"))
            .times(1)
            .returning(|_| Ok(()));
        let mut payments = MockPaymentRepository::new();
        payments.expect_list_by_user().returning(|_| Ok(Vec::new()));
        let svc = service(passes, payments, MockUserRepository::new());

        svc.select_route(&user_id, route("South Loop"))
            .await
            .expect("switch succeeds");
    }

    #[tokio::test]
    async fn reselecting_the_paid_route_stays_allowed() {
        let user_id = UserId::random();
        let existing = pass_with_route(&user_id, "North Loop");
        let mut passes = MockBusPassRepository::new();
        passes
            .expect_find_by_user()
            .returning(move |_| Ok(Some(existing.clone())));
        passes.expect_save().times(1).returning(|_| Ok(()));
        let mut payments = MockPaymentRepository::new();
        let record_owner = user_id.clone();
        payments
            .expect_list_by_user()
            .returning(move |_| Ok(vec![paid_record(&record_owner, "North Loop")]));
        let svc = service(passes, payments, MockUserRepository::new());

        svc.select_route(&user_id, route("North Loop"))
            .await
            .expect("reselection succeeds");
    }

    #[tokio::test]
    async fn pass_view_reports_holder_and_settlement() {
        let user_id = UserId::random();
        let account = User::new(
            user_id.clone(),
            Email::new("ada@campus.edu").expect("email"),
            "Ada Lovelace",
            None,
            Role::User,
            "digest",
        )
        .expect("valid user");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(account.clone())));
        let mut existing = pass_with_route(&user_id, "North Loop");
        existing.activate();
        let mut passes = MockBusPassRepository::new();
        passes
            .expect_find_by_user()
            .returning(move |_| Ok(Some(existing.clone())));
        let record_owner = user_id.clone();
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_list_paid_for_route()
            .returning(move |_, _| Ok(vec![paid_record(&record_owner, "North Loop")]));
        let svc = service(passes, payments, users);

        let view = svc.pass_view(&user_id).await.expect("view succeeds");
        assert_eq!(view.holder_name, "Ada Lovelace");
        assert_eq!(view.holder_email, "ada@campus.edu");
        assert_eq!(view.selected_route, Some(route("North Loop")));
        assert!(view.summary.pass_active);
        assert!(view.summary.has_installment1);
        assert!(!view.summary.is_settled());
    }

    #[tokio::test]
    async fn pass_view_for_unknown_account_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let svc = service(
            MockBusPassRepository::new(),
            MockPaymentRepository::new(),
            users,
        );

        let err = svc
            .pass_view(&UserId::random())
            .await
            .expect_err("missing account");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(
        PassStoreError::connection("refused"),
        ErrorCode::ServiceUnavailable
    )]
    #[case(PassStoreError::query("syntax"), ErrorCode::InternalError)]
    fn pass_store_errors_map_to_stable_codes(
        #[case] err: PassStoreError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_pass_store_error(err).code(), expected);
    }
}
