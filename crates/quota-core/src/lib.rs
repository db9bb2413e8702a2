//! # Quota Core
//!
//! The domain layer of the usage-quota service.
//! Identity keys, feature kinds, limits and usage arithmetic live here,
//! together with the ports that infrastructure implements.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
