//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod identity;
mod ledger;

pub use clock::Clock;
pub use identity::{IdentityError, IdentityHints, IdentityResolver};
pub use ledger::{
    Admission, Reservation, ReservationTicket, ReserveOutcome, UsageLedger, admit,
};
