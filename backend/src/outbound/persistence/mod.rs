//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL through `diesel-async` with `bb8` pooling. Adapters are
//! thin: they translate between Diesel rows and domain entities and map
//! database failures to port error types. No business logic lives here.

use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

mod diesel_bus_pass_repository;
pub(crate) mod diesel_helpers;
mod diesel_login_service;
mod diesel_payment_repository;
mod diesel_route_schedule_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_bus_pass_repository::DieselBusPassRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_route_schedule_repository::DieselRouteScheduleRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply any pending migrations over a blocking connection.
///
/// Runs before the async pool is built, so it uses a plain synchronous
/// `PgConnection`; call it from `spawn_blocking` in async contexts.
///
/// # Errors
///
/// Returns a message when the connection or a migration fails.
pub fn run_pending_migrations(database_url: &str) -> Result<(), String> {
    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|err| format!("failed to connect for migrations: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| format!("migration failed: {err}"))
}
