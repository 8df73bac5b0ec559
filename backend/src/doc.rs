//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every HTTP endpoint and the DTO schemas they
//! reference. The generated JSON document is exported through
//! `cargo run --bin openapi_dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::bus_pass::PassStatus;
use crate::domain::payment::{PaymentStatus, PaymentStatusSummary};
use crate::domain::route_schedule::{Installment, RouteName, RouteSchedule};
use crate::domain::user::Role;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::passes::{PassResponse, SelectRouteRequest};
use crate::inbound::http::payments::{PayAllRequest, PayInstallmentRequest, PaymentResponse};
use crate::inbound::http::password::{
    ForgotPasswordRequest, ResetPasswordRequest, VerifyCodeRequest,
};
use crate::inbound::http::schedules::ScheduleRequest;
use crate::inbound::http::users::{AccountResponse, LoginRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bus pass backend API",
        description = "Session-authenticated HTTP interface for route installment \
                       schedules, bus passes, and the payment ledger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::password::forgot_password,
        crate::inbound::http::password::verify_reset_code,
        crate::inbound::http::password::reset_password,
        crate::inbound::http::schedules::list_schedules,
        crate::inbound::http::schedules::find_schedule,
        crate::inbound::http::schedules::create_schedule,
        crate::inbound::http::schedules::update_schedule,
        crate::inbound::http::schedules::delete_schedule,
        crate::inbound::http::passes::view_pass,
        crate::inbound::http::passes::select_route,
        crate::inbound::http::payments::pay_installment,
        crate::inbound::http::payments::pay_all,
        crate::inbound::http::payments::settle_outstanding,
        crate::inbound::http::payments::payment_status,
        crate::inbound::http::payments::list_own_payments,
        crate::inbound::http::payments::list_all_payments,
        crate::inbound::http::payments::mark_paid,
        crate::inbound::http::payments::delete_payment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        PassStatus,
        PaymentStatus,
        PaymentStatusSummary,
        RouteName,
        Installment,
        RouteSchedule,
        ScheduleRequest,
        LoginRequest,
        AccountResponse,
        SelectRouteRequest,
        PassResponse,
        PayInstallmentRequest,
        PayAllRequest,
        PaymentResponse,
        ForgotPasswordRequest,
        VerifyCodeRequest,
        ResetPasswordRequest,
    )),
    tags(
        (name = "auth", description = "Login, logout, and account lookup"),
        (name = "password", description = "OTP-based password reset"),
        (name = "schedules", description = "Route installment schedule administration"),
        (name = "passes", description = "Bus pass view and route selection"),
        (name = "payments", description = "Payment ledger and workflow"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn document_registers_every_endpoint_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/v1/login",
            "/api/v1/password/reset",
            "/api/v1/schedules",
            "/api/v1/pass",
            "/api/v1/payments/installment",
            "/healthz/ready",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("Error"));
        assert!(schemas.contains_key("PaymentStatusSummary"));
    }
}
