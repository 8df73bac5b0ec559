//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, Notifier, OtpStore, PassCommand, PassQuery, PaymentCommand, PaymentQuery,
    ScheduleCommand, ScheduleQuery, UserRepository,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserRepository>,
    pub schedule_commands: Arc<dyn ScheduleCommand>,
    pub schedule_queries: Arc<dyn ScheduleQuery>,
    pub pass_commands: Arc<dyn PassCommand>,
    pub pass_queries: Arc<dyn PassQuery>,
    pub payment_commands: Arc<dyn PaymentCommand>,
    pub payment_queries: Arc<dyn PaymentQuery>,
    pub otp: Arc<dyn OtpStore>,
    pub notifier: Arc<dyn Notifier>,
}

#[cfg(test)]
impl HttpState {
    /// State with every port stubbed by its fixture; tests override the
    /// ports they exercise.
    pub fn fixture() -> Self {
        use crate::domain::ports::{
            FixtureLoginService, FixtureNotifier, FixtureOtpStore, FixturePassCommand,
            FixturePassQuery, FixturePaymentCommand, FixturePaymentQuery, FixtureScheduleCommand,
            FixtureScheduleQuery, FixtureUserRepository,
        };
        Self {
            login: Arc::new(FixtureLoginService),
            users: Arc::new(FixtureUserRepository),
            schedule_commands: Arc::new(FixtureScheduleCommand),
            schedule_queries: Arc::new(FixtureScheduleQuery),
            pass_commands: Arc::new(FixturePassCommand),
            pass_queries: Arc::new(FixturePassQuery),
            payment_commands: Arc::new(FixturePaymentCommand),
            payment_queries: Arc::new(FixturePaymentQuery),
            otp: Arc::new(FixtureOtpStore),
            notifier: Arc::new(FixtureNotifier),
        }
    }
}
