//! Identity resolver implementations.

mod header;

pub use header::HeaderIdentityResolver;
