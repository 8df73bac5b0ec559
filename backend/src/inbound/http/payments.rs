//! Payment ledger handlers.
//!
//! ```text
//! POST   /api/v1/payments/installment {"routeName":"North Loop","installment":1}
//! POST   /api/v1/payments/full {"routeName":"North Loop"}
//! POST   /api/v1/payments/settle
//! GET    /api/v1/payments/status
//! GET    /api/v1/payments
//! GET    /api/v1/payments/all
//! POST   /api/v1/payments/{id}/mark-paid
//! DELETE /api/v1/payments/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::authorization::Action;
use crate::domain::payment::{PaymentRecord, PaymentStatusSummary};
use crate::domain::route_schedule::{InstallmentNumber, RouteName};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/payments/installment`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayInstallmentRequest {
    pub route_name: String,
    pub installment: i32,
}

/// Body for `POST /api/v1/payments/full`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayAllRequest {
    pub route_name: String,
}

/// One ledger entry as returned to clients.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: Uuid,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment: Option<i32>,
    pub amount: Decimal,
    pub due_date: chrono::NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<chrono::NaiveDate>,
    pub status: String,
    pub is_full_payment: bool,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.to_string(),
            route_name: record.route_name.map(String::from),
            installment: record.installment.map(InstallmentNumber::as_i32),
            amount: record.amount,
            due_date: record.due_date,
            payment_date: record.payment_date,
            status: record.status.as_str().to_owned(),
            is_full_payment: record.is_full_payment,
        }
    }
}

fn parse_route(raw: String) -> Result<RouteName, Error> {
    RouteName::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "routeName", "code": "blank_route_name" }))
    })
}

fn parse_installment(raw: i32) -> Result<InstallmentNumber, Error> {
    InstallmentNumber::from_i32(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "installment",
            "value": raw,
            "code": "invalid_installment",
        }))
    })
}

/// Pay one installment slot on a route.
#[utoipa::path(
    post,
    path = "/api/v1/payments/installment",
    request_body = PayInstallmentRequest,
    responses(
        (status = 204, description = "Installment recorded"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No schedule for route", body = Error),
        (status = 409, description = "Already paid", body = Error)
    ),
    tags = ["payments"],
    operation_id = "payInstallment"
)]
#[post("/payments/installment")]
pub async fn pay_installment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PayInstallmentRequest>,
) -> ApiResult<HttpResponse> {
    let who = session.require(Action::PayFees)?;
    let payload = payload.into_inner();
    let route = parse_route(payload.route_name)?;
    let installment = parse_installment(payload.installment)?;
    state
        .payment_commands
        .pay_installment(&who.user_id, &route, installment)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Pay the whole route fee in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/payments/full",
    request_body = PayAllRequest,
    responses(
        (status = 204, description = "Full payment recorded"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No schedule for route", body = Error),
        (status = 409, description = "Payments already exist", body = Error)
    ),
    tags = ["payments"],
    operation_id = "payAllInstallments"
)]
#[post("/payments/full")]
pub async fn pay_all(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PayAllRequest>,
) -> ApiResult<HttpResponse> {
    let who = session.require(Action::PayFees)?;
    let route = parse_route(payload.into_inner().route_name)?;
    state
        .payment_commands
        .pay_all_installments(&who.user_id, &route)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Collapse pending dues into one settled record (legacy path).
#[utoipa::path(
    post,
    path = "/api/v1/payments/settle",
    responses(
        (status = 200, description = "Dues settled"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "No outstanding fees", body = Error)
    ),
    tags = ["payments"],
    operation_id = "settleOutstanding"
)]
#[post("/payments/settle")]
pub async fn settle_outstanding(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let who = session.require(Action::PayFees)?;
    let total = state.payment_commands.settle_outstanding(&who.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "settledAmount": total })))
}

/// Settlement snapshot for the caller's selected route.
#[utoipa::path(
    get,
    path = "/api/v1/payments/status",
    responses(
        (status = 200, description = "Snapshot", body = PaymentStatusSummary),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["payments"],
    operation_id = "paymentStatus"
)]
#[get("/payments/status")]
pub async fn payment_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PaymentStatusSummary>> {
    let who = session.require(Action::ViewOwnPayments)?;
    let summary = state.payment_queries.payment_status(&who.user_id).await?;
    Ok(web::Json(summary))
}

/// The caller's own ledger entries.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    responses(
        (status = 200, description = "Payments", body = [PaymentResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["payments"],
    operation_id = "listOwnPayments"
)]
#[get("/payments")]
pub async fn list_own_payments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PaymentResponse>>> {
    let who = session.require(Action::ViewOwnPayments)?;
    let records = state.payment_queries.payments_for_user(&who.user_id).await?;
    Ok(web::Json(records.into_iter().map(Into::into).collect()))
}

/// Every ledger entry across all users (administrators).
#[utoipa::path(
    get,
    path = "/api/v1/payments/all",
    responses(
        (status = 200, description = "Payments", body = [PaymentResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["payments"],
    operation_id = "listAllPayments"
)]
#[get("/payments/all")]
pub async fn list_all_payments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PaymentResponse>>> {
    session.require(Action::ViewAllPayments)?;
    let records = state.payment_queries.all_payments().await?;
    Ok(web::Json(records.into_iter().map(Into::into).collect()))
}

/// Mark a pending record paid on a user's behalf (administrators).
#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/mark-paid",
    params(("id" = Uuid, Path, description = "Payment record id")),
    responses(
        (status = 204, description = "Record updated"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such record", body = Error)
    ),
    tags = ["payments"],
    operation_id = "markPaymentPaid"
)]
#[post("/payments/{id}/mark-paid")]
pub async fn mark_paid(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require(Action::MarkPaymentPaid)?;
    state.payment_commands.mark_paid(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a ledger record (administrators).
#[utoipa::path(
    delete,
    path = "/api/v1/payments/{id}",
    params(("id" = Uuid, Path, description = "Payment record id")),
    responses(
        (status = 204, description = "Record removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such record", body = Error)
    ),
    tags = ["payments"],
    operation_id = "deletePayment"
)]
#[delete("/payments/{id}")]
pub async fn delete_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require(Action::DeletePayment)?;
    state.payment_commands.delete_payment(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockPaymentCommand, MockPaymentQuery};
    use crate::domain::user::{Role, UserId};
    use crate::inbound::http::test_utils;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_utils::test_session_middleware())
            .route(
                "/test-login/{role}",
                web::get().to(test_utils::grant_session),
            )
            .service(
                web::scope("/api/v1")
                    .service(pay_installment)
                    .service(pay_all)
                    .service(settle_outstanding)
                    .service(payment_status)
                    .service(list_all_payments)
                    .service(list_own_payments)
                    .service(mark_paid)
                    .service(delete_payment),
            )
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(-2)]
    #[actix_web::test]
    async fn pay_installment_rejects_out_of_range_slots(#[case] slot: i32) {
        let app = actix_test::init_service(test_app(HttpState::fixture())).await;
        let cookie = test_utils::login_as(&app, Role::User).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/payments/installment")
                .cookie(cookie)
                .set_json(&PayInstallmentRequest {
                    route_name: "North Loop".into(),
                    installment: slot,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["details"]["code"], "invalid_installment");
        assert_eq!(value["details"]["value"], slot);
    }

    #[actix_web::test]
    async fn pay_installment_is_user_only() {
        let app = actix_test::init_service(test_app(HttpState::fixture())).await;
        let cookie = test_utils::login_as(&app, Role::Admin).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/payments/installment")
                .cookie(cookie)
                .set_json(&PayInstallmentRequest {
                    route_name: "North Loop".into(),
                    installment: 1,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn pay_installment_passes_parsed_values_to_the_workflow() {
        let mut commands = MockPaymentCommand::new();
        commands
            .expect_pay_installment()
            .withf(|_, route, slot| {
                route.as_ref() == "North Loop" && *slot == InstallmentNumber::Two
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let state = HttpState {
            payment_commands: Arc::new(commands),
            ..HttpState::fixture()
        };
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = test_utils::login_as(&app, Role::User).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/payments/installment")
                .cookie(cookie)
                .set_json(&PayInstallmentRequest {
                    route_name: "North Loop".into(),
                    installment: 2,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn duplicate_payment_maps_to_conflict() {
        let mut commands = MockPaymentCommand::new();
        commands.expect_pay_installment().returning(|_, _, _| {
            Err(Error::conflict("this installment has already been paid")
                .with_details(json!({ "code": "already_paid" })))
        });
        let state = HttpState {
            payment_commands: Arc::new(commands),
            ..HttpState::fixture()
        };
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = test_utils::login_as(&app, Role::User).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/payments/installment")
                .cookie(cookie)
                .set_json(&PayInstallmentRequest {
                    route_name: "North Loop".into(),
                    installment: 1,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["details"]["code"], "already_paid");
    }

    #[actix_web::test]
    async fn settle_returns_the_settled_amount() {
        let mut commands = MockPaymentCommand::new();
        commands
            .expect_settle_outstanding()
            .returning(|_| Ok(Decimal::from(200)));
        let state = HttpState {
            payment_commands: Arc::new(commands),
            ..HttpState::fixture()
        };
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = test_utils::login_as(&app, Role::User).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/payments/settle")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(response).await;
        assert_eq!(value["settledAmount"], "200");
    }

    #[actix_web::test]
    async fn own_payments_are_serialised_camel_case() {
        let owner = UserId::random();
        let record = PaymentRecord::paid_installment(
            owner,
            RouteName::new("North Loop").expect("route"),
            InstallmentNumber::One,
            Decimal::from(100),
            "2024-01-15".parse().expect("date"),
            "2024-01-10".parse().expect("date"),
        );
        let mut queries = MockPaymentQuery::new();
        let ledger = vec![record];
        queries
            .expect_payments_for_user()
            .returning(move |_| Ok(ledger.clone()));
        let state = HttpState {
            payment_queries: Arc::new(queries),
            ..HttpState::fixture()
        };
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = test_utils::login_as(&app, Role::User).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/payments")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(response).await;
        let first = &value.as_array().expect("array")[0];
        assert_eq!(first["routeName"], "North Loop");
        assert_eq!(first["installment"], 1);
        assert_eq!(first["status"], "PAID");
        assert_eq!(first["isFullPayment"], false);
        assert!(first.get("is_full_payment").is_none());
    }

    #[rstest]
    #[case::list_all("/api/v1/payments/all")]
    #[actix_web::test]
    async fn admin_listing_rejects_plain_users(#[case] uri: &str) {
        let app = actix_test::init_service(test_app(HttpState::fixture())).await;
        let cookie = test_utils::login_as(&app, Role::User).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(uri)
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn delete_requires_admin() {
        let app = actix_test::init_service(test_app(HttpState::fixture())).await;
        let cookie = test_utils::login_as(&app, Role::User).await;

        let uri = format!("/api/v1/payments/{}", Uuid::new_v4());
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&uri)
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn mark_paid_reports_missing_records() {
        let mut commands = MockPaymentCommand::new();
        commands
            .expect_mark_paid()
            .returning(|_| Err(Error::not_found("payment record not found")));
        let state = HttpState {
            payment_commands: Arc::new(commands),
            ..HttpState::fixture()
        };
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = test_utils::login_as(&app, Role::Admin).await;

        let uri = format!("/api/v1/payments/{}/mark-paid", Uuid::new_v4());
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&uri)
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
