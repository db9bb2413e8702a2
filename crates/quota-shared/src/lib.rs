//! # Quota Shared
//!
//! Wire types shared by the quota API and its clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
