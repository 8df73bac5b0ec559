//! Domain entities, services, and ports.
//!
//! Types here are transport and storage agnostic. Inbound adapters parse
//! requests into these types; outbound adapters persist them. Each type
//! documents its invariants and serde contract in its own Rustdoc.

pub mod auth;
pub mod authorization;
pub mod bus_pass;
pub mod error;
pub mod pass_service;
pub mod payment;
pub mod payment_service;
pub mod ports;
pub mod route_schedule;
pub mod schedule_service;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::authorization::Action;
pub use self::bus_pass::{BusPass, PassStatus};
pub use self::error::{Error, ErrorCode};
pub use self::pass_service::BusPassService;
pub use self::payment::{PaymentRecord, PaymentStatus, PaymentStatusSummary};
pub use self::payment_service::PaymentWorkflow;
pub use self::route_schedule::{
    Installment, InstallmentNumber, RouteName, RouteSchedule, RouteScheduleDraft,
    RouteScheduleValidationError,
};
pub use self::schedule_service::RouteScheduleService;
pub use self::user::{Email, Role, User, UserId, UserValidationError};

/// Convenient result alias for fallible domain and handler code.
pub type ApiResult<T> = Result<T, Error>;
