//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
    SessionMiddleware,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use actix_web::{HttpResponse, Responder};
#[cfg(debug_assertions)]
use utoipa::OpenApi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    BusPassRepository, FixtureLoginService, FixturePassCommand, FixturePassQuery,
    FixturePaymentCommand, FixturePaymentQuery, FixtureScheduleCommand, FixtureScheduleQuery,
    FixtureUserRepository, LoginService, Notifier, OtpStore, PaymentRepository,
    RouteScheduleRepository, SystemClock, UserRepository,
};
use crate::domain::{BusPassService, PaymentWorkflow, RouteScheduleService};
use crate::inbound::http::health::{live, ready};
use crate::inbound::http::passes::{select_route, view_pass};
use crate::inbound::http::password::{forgot_password, reset_password, verify_reset_code};
use crate::inbound::http::payments::{
    delete_payment, list_all_payments, list_own_payments, mark_paid, pay_all, pay_installment,
    payment_status, settle_outstanding,
};
use crate::inbound::http::schedules::{
    create_schedule, delete_schedule, find_schedule, list_schedules, update_schedule,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{current_user, login, logout};
use crate::outbound::memory::InMemoryOtpStore;
use crate::outbound::notify::LogNotifier;
use crate::outbound::persistence::{
    DieselBusPassRepository, DieselLoginService, DieselPaymentRepository,
    DieselRouteScheduleRepository, DieselUserRepository,
};
use crate::outbound::security::Sha256PasswordHasher;

/// Build the shared HTTP state: database-backed services when a pool is
/// configured, fixture ports otherwise.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let otp: Arc<dyn OtpStore> = Arc::new(InMemoryOtpStore::default());
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    match &config.db_pool {
        Some(pool) => {
            let users: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool.clone()));
            let passes: Arc<dyn BusPassRepository> =
                Arc::new(DieselBusPassRepository::new(pool.clone()));
            let payments: Arc<dyn PaymentRepository> =
                Arc::new(DieselPaymentRepository::new(pool.clone()));
            let schedules: Arc<dyn RouteScheduleRepository> =
                Arc::new(DieselRouteScheduleRepository::new(pool.clone()));

            let schedule_service = Arc::new(RouteScheduleService::new(
                schedules.clone(),
                payments.clone(),
                passes.clone(),
            ));
            let pass_service = Arc::new(BusPassService::new(
                passes.clone(),
                payments.clone(),
                users.clone(),
            ));
            let workflow = Arc::new(PaymentWorkflow::new(
                payments,
                passes,
                schedules,
                Arc::new(SystemClock),
            ));
            // `login` would shadow the handler imported above.
            let login_service: Arc<dyn LoginService> = Arc::new(DieselLoginService::new(
                users.clone(),
                Arc::new(Sha256PasswordHasher),
            ));

            web::Data::new(HttpState {
                login: login_service,
                users,
                schedule_commands: schedule_service.clone(),
                schedule_queries: schedule_service,
                pass_commands: pass_service.clone(),
                pass_queries: pass_service,
                payment_commands: workflow.clone(),
                payment_queries: workflow,
                otp,
                notifier,
            })
        }
        None => web::Data::new(HttpState {
            login: Arc::new(FixtureLoginService),
            users: Arc::new(FixtureUserRepository),
            schedule_commands: Arc::new(FixtureScheduleCommand),
            schedule_queries: Arc::new(FixtureScheduleQuery),
            pass_commands: Arc::new(FixturePassCommand),
            pass_queries: Arc::new(FixturePassQuery),
            payment_commands: Arc::new(FixturePaymentCommand),
            payment_queries: Arc::new(FixturePaymentQuery),
            otp,
            notifier,
        }),
    }
}

#[cfg(debug_assertions)]
async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(logout)
        .service(current_user)
        .service(forgot_password)
        .service(verify_reset_code)
        .service(reset_password)
        .service(list_schedules)
        .service(create_schedule)
        .service(find_schedule)
        .service(update_schedule)
        .service(delete_schedule)
        .service(view_pass)
        .service(select_route)
        .service(pay_installment)
        .service(pay_all)
        .service(settle_outstanding)
        .service(payment_status)
        .service(list_all_payments)
        .service(list_own_payments)
        .service(mark_paid)
        .service(delete_payment);

    let app = App::new()
        .app_data(http_state)
        .service(api)
        .service(web::scope("/healthz").service(live).service(ready));

    #[cfg(debug_assertions)]
    let app = app.route("/api-docs/openapi.json", web::get().to(openapi_json));

    app
}

/// Construct an Actix HTTP server from the given configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Smoke coverage for the app wiring.
    use super::*;
    use actix_web::{test as actix_test, web::Data};
    use serde_json::json;

    fn fixture_deps() -> AppDependencies {
        AppDependencies {
            http_state: Data::new(HttpState::fixture()),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[actix_web::test]
    async fn health_probes_are_mounted() {
        let app = actix_test::init_service(build_app(fixture_deps())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/healthz/live")
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
    }

    #[actix_web::test]
    async fn login_route_is_mounted_behind_the_session_scope() {
        let app = actix_test::init_service(build_app(fixture_deps())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({"email": "ada@campus.edu", "password": "pw"}))
                .to_request(),
        )
        .await;
        // Fixture login rejects every credential.
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn protected_routes_require_a_session() {
        let app = actix_test::init_service(build_app(fixture_deps())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/pass").to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
