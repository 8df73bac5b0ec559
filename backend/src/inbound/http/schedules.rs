//! Route schedule administration handlers.
//!
//! ```text
//! GET    /api/v1/schedules
//! GET    /api/v1/schedules/{route}
//! POST   /api/v1/schedules
//! PUT    /api/v1/schedules/{id}
//! DELETE /api/v1/schedules/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::authorization::Action;
use crate::domain::route_schedule::{Installment, RouteName, RouteSchedule, RouteScheduleDraft};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body for schedule create and update.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub route_name: String,
    /// Exactly three (amount, deadline) pairs in installment order.
    pub installments: Vec<Installment>,
}

impl TryFrom<ScheduleRequest> for RouteScheduleDraft {
    type Error = Error;

    fn try_from(value: ScheduleRequest) -> Result<Self, Self::Error> {
        let route_name = RouteName::new(value.route_name).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "routeName", "code": "blank_route_name" }))
        })?;
        let count = value.installments.len();
        let installments: [Installment; 3] = value.installments.try_into().map_err(|_| {
            Error::invalid_request("exactly three installments are required").with_details(json!({
                "field": "installments",
                "count": count,
                "code": "wrong_installment_count",
            }))
        })?;
        Ok(Self {
            route_name,
            installments,
        })
    }
}

/// Every configured schedule.
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    responses(
        (status = 200, description = "Schedules", body = [RouteSchedule]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "listSchedules"
)]
#[get("/schedules")]
pub async fn list_schedules(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RouteSchedule>>> {
    session.require(Action::ViewSchedules)?;
    Ok(web::Json(state.schedule_queries.list().await?))
}

/// The schedule for one route.
#[utoipa::path(
    get,
    path = "/api/v1/schedules/{route}",
    params(("route" = String, Path, description = "Route name")),
    responses(
        (status = 200, description = "Schedule", body = RouteSchedule),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No schedule for route", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "findSchedule"
)]
#[get("/schedules/{route}")]
pub async fn find_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    route: web::Path<String>,
) -> ApiResult<web::Json<RouteSchedule>> {
    session.require(Action::ViewSchedules)?;
    let route = RouteName::new(route.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(web::Json(
        state.schedule_queries.find_by_route(&route).await?,
    ))
}

/// Create a schedule (administrators).
#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    request_body = ScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = RouteSchedule),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Route already configured", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "createSchedule"
)]
#[post("/schedules")]
pub async fn create_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ScheduleRequest>,
) -> ApiResult<HttpResponse> {
    session.require(Action::ManageSchedules)?;
    let draft = RouteScheduleDraft::try_from(payload.into_inner())?;
    let schedule = state.schedule_commands.create(draft).await?;
    Ok(HttpResponse::Created().json(schedule))
}

/// Replace a schedule's installments (administrators).
#[utoipa::path(
    put,
    path = "/api/v1/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule id")),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Schedule updated", body = RouteSchedule),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such schedule", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "updateSchedule"
)]
#[put("/schedules/{id}")]
pub async fn update_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
    payload: web::Json<ScheduleRequest>,
) -> ApiResult<web::Json<RouteSchedule>> {
    session.require(Action::ManageSchedules)?;
    let draft = RouteScheduleDraft::try_from(payload.into_inner())?;
    Ok(web::Json(
        state.schedule_commands.update(id.into_inner(), draft).await?,
    ))
}

/// Remove a schedule (administrators).
#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{id}",
    params(("id" = Uuid, Path, description = "Schedule id")),
    responses(
        (status = 204, description = "Schedule removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such schedule", body = Error),
        (status = 409, description = "Route still referenced", body = Error)
    ),
    tags = ["schedules"],
    operation_id = "deleteSchedule"
)]
#[delete("/schedules/{id}")]
pub async fn delete_schedule(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    session.require(Action::ManageSchedules)?;
    state.schedule_commands.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
