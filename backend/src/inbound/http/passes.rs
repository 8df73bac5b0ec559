//! Bus pass handlers.
//!
//! ```text
//! GET /api/v1/pass
//! PUT /api/v1/pass/route {"routeName":"North Loop"}
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::authorization::Action;
use crate::domain::payment::PaymentStatusSummary;
use crate::domain::ports::PassView;
use crate::domain::route_schedule::RouteName;
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Route selection body for `PUT /api/v1/pass/route`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectRouteRequest {
    pub route_name: String,
}

/// Pass payload rendered by clients, QR text included.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassResponse {
    pub holder_name: String,
    pub holder_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_route: Option<String>,
    pub active: bool,
    pub summary: PaymentStatusSummary,
    pub qr_payload: String,
}

impl From<PassView> for PassResponse {
    fn from(view: PassView) -> Self {
        let qr_payload = view.qr_payload();
        Self {
            holder_name: view.holder_name,
            holder_email: view.holder_email,
            selected_route: view.selected_route.map(String::from),
            active: view.summary.pass_active,
            summary: view.summary,
            qr_payload,
        }
    }
}

/// The caller's pass with settlement progress.
#[utoipa::path(
    get,
    path = "/api/v1/pass",
    responses(
        (status = 200, description = "Pass", body = PassResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["passes"],
    operation_id = "viewPass"
)]
#[get("/pass")]
pub async fn view_pass(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PassResponse>> {
    let who = session.require(Action::ViewOwnPass)?;
    let view = state.pass_queries.pass_view(&who.user_id).await?;
    Ok(web::Json(PassResponse::from(view)))
}

/// Select or change the route on the caller's pass.
#[utoipa::path(
    put,
    path = "/api/v1/pass/route",
    request_body = SelectRouteRequest,
    responses(
        (status = 204, description = "Route selected"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Route locked by payments", body = Error)
    ),
    tags = ["passes"],
    operation_id = "selectRoute"
)]
#[put("/pass/route")]
pub async fn select_route(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SelectRouteRequest>,
) -> ApiResult<HttpResponse> {
    let who = session.require(Action::SelectRoute)?;
    let route = RouteName::new(payload.into_inner().route_name).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "routeName", "code": "blank_route_name" }))
    })?;
    state.pass_commands.select_route(&who.user_id, route).await?;
    Ok(HttpResponse::NoContent().finish())
}
