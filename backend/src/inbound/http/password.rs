//! Password reset handlers.
//!
//! ```text
//! POST /api/v1/password/forgot {"email":"ada@campus.edu"}
//! POST /api/v1/password/verify {"email":"ada@campus.edu","code":"123456"}
//! POST /api/v1/password/reset  {"email":"...","code":"...","newPassword":"..."}
//! ```
//!
//! A reset code is six digits, lives for five minutes, and is delivered
//! through the notifier port. Verification and reset both check the live
//! code; reset clears it on success so a code cannot be replayed.

use std::time::Duration;

use actix_web::{HttpResponse, post, web};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{NotifierError, OtpStoreError};
use crate::domain::user::Email;
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::map_user_store_error;

const RESET_CODE_TTL: Duration = Duration::from_secs(5 * 60);

/// Body for `POST /api/v1/password/forgot`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body for `POST /api/v1/password/verify`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

/// Body for `POST /api/v1/password/reset`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

fn parse_email(raw: String) -> Result<Email, Error> {
    Email::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" }))
    })
}

fn map_otp_store_error(err: OtpStoreError) -> Error {
    match err {
        OtpStoreError::Unavailable { .. } => Error::service_unavailable("reset code store unavailable"),
    }
}

fn map_notifier_error(err: NotifierError) -> Error {
    match err {
        NotifierError::Delivery { .. } => {
            Error::service_unavailable("could not deliver the reset code")
        }
    }
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// Issue a reset code to a registered email address.
#[utoipa::path(
    post,
    path = "/api/v1/password/forgot",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 202, description = "Reset code sent"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown email", body = Error),
        (status = 503, description = "Delivery unavailable", body = Error)
    ),
    tags = ["password"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/password/forgot")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let email = parse_email(payload.into_inner().email)?;
    state
        .users
        .find_by_email(&email)
        .await
        .map_err(map_user_store_error)?
        .ok_or_else(|| Error::not_found("no account for that email"))?;

    let code = generate_code();
    state
        .otp
        .put(&email, &code, RESET_CODE_TTL)
        .await
        .map_err(map_otp_store_error)?;
    state
        .notifier
        .send_reset_code(&email, &code)
        .await
        .map_err(map_notifier_error)?;
    Ok(HttpResponse::Accepted().finish())
}

/// Check a reset code without consuming it.
#[utoipa::path(
    post,
    path = "/api/v1/password/verify",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Verification result"),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["password"],
    operation_id = "verifyResetCode",
    security([])
)]
#[post("/password/verify")]
pub async fn verify_reset_code(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyCodeRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = parse_email(payload.email)?;
    let valid = state
        .otp
        .verify(&email, &payload.code)
        .await
        .map_err(map_otp_store_error)?;
    Ok(HttpResponse::Ok().json(json!({ "valid": valid })))
}

/// Replace the password after verifying the reset code.
#[utoipa::path(
    post,
    path = "/api/v1/password/reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Invalid request or code", body = Error),
        (status = 404, description = "Unknown email", body = Error)
    ),
    tags = ["password"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/password/reset")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = parse_email(payload.email)?;
    if payload.new_password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "newPassword", "code": "empty_password" })));
    }
    let valid = state
        .otp
        .verify(&email, &payload.code)
        .await
        .map_err(map_otp_store_error)?;
    if !valid {
        return Err(Error::invalid_request("invalid or expired reset code")
            .with_details(json!({ "code": "invalid_otp" })));
    }
    state.login.reset_password(&email, &payload.new_password).await?;
    state.otp.clear(&email).await.map_err(map_otp_store_error)?;
    Ok(HttpResponse::NoContent().finish())
}
