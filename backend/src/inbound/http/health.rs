//! Liveness and readiness probes.

use actix_web::{HttpResponse, get};
use serde_json::json;

/// Process is up.
#[utoipa::path(
    get,
    path = "/healthz/live",
    responses((status = 200, description = "Alive")),
    tags = ["health"],
    operation_id = "liveness",
    security([])
)]
#[get("/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Process is ready to serve traffic.
#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses((status = 200, description = "Ready")),
    tags = ["health"],
    operation_id = "readiness",
    security([])
)]
#[get("/ready")]
pub async fn ready() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test, web};

    #[actix_web::test]
    async fn probes_answer_ok() {
        let app = actix_test::init_service(
            App::new().service(web::scope("/healthz").service(live).service(ready)),
        )
        .await;
        for uri in ["/healthz/live", "/healthz/ready"] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert!(res.status().is_success());
        }
    }
}
