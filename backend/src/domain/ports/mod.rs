//! Ports connecting the domain to the outside world.
//!
//! Driven ports (repositories, OTP store, notifier, clock) are implemented
//! by outbound adapters; driving ports (commands and queries) are
//! implemented by the domain services and consumed by the HTTP adapter.
//! Each port ships a fixture implementation so handlers and wiring can be
//! exercised without I/O.

pub mod bus_pass_repository;
pub mod clock;
pub mod login_service;
pub mod notifier;
pub mod otp_store;
pub mod pass_ports;
pub mod password_hasher;
pub mod payment_ports;
pub mod payment_repository;
pub mod route_schedule_repository;
pub mod schedule_ports;
pub mod user_repository;

pub use bus_pass_repository::{BusPassRepository, FixtureBusPassRepository, PassStoreError};
pub use clock::{Clock, SystemClock};
pub use login_service::{AuthenticatedUser, FixtureLoginService, LoginService};
pub use notifier::{FixtureNotifier, Notifier, NotifierError};
pub use otp_store::{FixtureOtpStore, OtpStore, OtpStoreError};
pub use pass_ports::{FixturePassCommand, FixturePassQuery, PassCommand, PassQuery, PassView};
pub use password_hasher::PasswordHasher;
pub use payment_ports::{
    FixturePaymentCommand, FixturePaymentQuery, PaymentCommand, PaymentQuery,
};
pub use payment_repository::{FixturePaymentRepository, PaymentRepository, PaymentStoreError};
pub use route_schedule_repository::{
    FixtureRouteScheduleRepository, RouteScheduleRepository, ScheduleStoreError,
};
pub use schedule_ports::{
    FixtureScheduleCommand, FixtureScheduleQuery, ScheduleCommand, ScheduleQuery,
};
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};

#[cfg(test)]
pub use bus_pass_repository::MockBusPassRepository;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use otp_store::MockOtpStore;
#[cfg(test)]
pub use pass_ports::{MockPassCommand, MockPassQuery};
#[cfg(test)]
pub use payment_ports::{MockPaymentCommand, MockPaymentQuery};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
#[cfg(test)]
pub use route_schedule_repository::MockRouteScheduleRepository;
#[cfg(test)]
pub use schedule_ports::{MockScheduleCommand, MockScheduleQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
