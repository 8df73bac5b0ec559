//! Bus-pass management backend.
//!
//! Hexagonal layout: `domain` holds entities, services, and ports;
//! `inbound` exposes the REST adapter; `outbound` implements the driven
//! ports (PostgreSQL via Diesel, in-memory OTP store); `server` wires the
//! pieces into an Actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

pub use domain::ApiResult;
