//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::ports::AuthenticatedUser;
use crate::domain::user::{Email, Role, UserId};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Fixture identity for session round trips in handler tests.
pub fn test_identity(role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
        role,
        name: "Ada Lovelace".to_owned(),
        email: Email::new("ada@campus.edu").expect("fixture email"),
    }
}

/// Handler that grants a session for `{role}` without touching the login
/// service. Tests mount it as `/test-login/{role}`.
pub async fn grant_session(
    session: crate::inbound::http::session::SessionContext,
    path: actix_web::web::Path<String>,
) -> Result<actix_web::HttpResponse, crate::domain::Error> {
    let role = Role::parse(&path.into_inner())
        .map_err(|err| crate::domain::Error::invalid_request(err.to_string()))?;
    session.persist(&test_identity(role))?;
    Ok(actix_web::HttpResponse::Ok().finish())
}

/// Call the `/test-login/{role}` route and return the session cookie.
pub async fn login_as(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    role: Role,
) -> actix_web::cookie::Cookie<'static> {
    let uri = format!("/test-login/{}", role.as_str());
    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::get().uri(&uri).to_request(),
    )
    .await;
    assert!(res.status().is_success());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
