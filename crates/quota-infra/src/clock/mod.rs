//! Clock implementations - wall clock and a manually driven one for tests.

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;
