//! Usage ledger port.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{AttemptId, FeatureKind, IdentityKey, RecordOutcome, UsageStatus};

/// Usage ledger - per-identity, per-kind, per-UTC-day consumption counts
/// with attempt-id deduplication.
///
/// All methods are synchronous and never wait on I/O, so they are safe to
/// call from async handlers without `spawn_blocking`.
///
/// # Caller contract
///
/// [`record_attempt`](UsageLedger::record_attempt) does not enforce the limit.
/// A handler must check [`usage`](UsageLedger::usage) (or
/// [`is_blocked`](UsageLedger::is_blocked)) *before* performing the metered
/// action, and record only *after* the action succeeded. Callers that want the
/// check and the record to be one atomic step use
/// [`reserve`](UsageLedger::reserve) through [`admit`].
pub trait UsageLedger: Send + Sync {
    /// Today's status. Creates an empty entry on first access.
    fn usage(&self, identity: &IdentityKey, kind: &FeatureKind) -> UsageStatus;

    /// Record one consumption event. Recording an already-seen attempt id is
    /// a no-op that reports `was_new = false`.
    fn record_attempt(
        &self,
        identity: &IdentityKey,
        attempt: &AttemptId,
        kind: &FeatureKind,
    ) -> RecordOutcome;

    fn is_blocked(&self, identity: &IdentityKey, kind: &FeatureKind) -> bool {
        self.usage(identity, kind).blocked
    }

    /// Atomically check the limit and hold a slot for `attempt`.
    fn reserve(
        &self,
        identity: &IdentityKey,
        attempt: &AttemptId,
        kind: &FeatureKind,
    ) -> ReserveOutcome;

    /// Turn a held slot into an accepted attempt on the ticket's day.
    fn commit(&self, ticket: &ReservationTicket) -> RecordOutcome;

    /// Give a held slot back without counting it.
    fn release(&self, ticket: &ReservationTicket);

    /// Drop entries that fell out of the retention window.
    /// Returns the number of entries removed.
    fn sweep(&self) -> usize;
}

/// Identifies a held slot. The day is fixed when the slot is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationTicket {
    pub day: NaiveDate,
    pub identity: IdentityKey,
    pub kind: FeatureKind,
    pub attempt: AttemptId,
}

/// Verdict of [`UsageLedger::reserve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// A slot is held; commit or release the ticket.
    Reserved(ReservationTicket, UsageStatus),
    /// The attempt was already accepted earlier; nothing to do.
    Replayed(UsageStatus),
    /// The same attempt currently holds a slot.
    InFlight(UsageStatus),
    /// Accepted plus held attempts already reach the limit. `used` counts
    /// accepted attempts only; `remaining` and `blocked` also count held slots.
    LimitReached(UsageStatus),
}

/// Result of [`admit`].
pub enum Admission {
    Granted(Reservation),
    Replayed(UsageStatus),
    InFlight(UsageStatus),
    LimitReached(UsageStatus),
}

/// Reserve a slot and wrap it in a guard that releases on drop.
pub fn admit(
    ledger: &Arc<dyn UsageLedger>,
    identity: &IdentityKey,
    attempt: &AttemptId,
    kind: &FeatureKind,
) -> Admission {
    match ledger.reserve(identity, attempt, kind) {
        ReserveOutcome::Reserved(ticket, status) => Admission::Granted(Reservation {
            ledger: Arc::clone(ledger),
            ticket,
            status,
            settled: false,
        }),
        ReserveOutcome::Replayed(status) => Admission::Replayed(status),
        ReserveOutcome::InFlight(status) => Admission::InFlight(status),
        ReserveOutcome::LimitReached(status) => Admission::LimitReached(status),
    }
}

/// A held ledger slot. Dropping it without [`commit`](Reservation::commit)
/// releases the slot, so a failed action never consumes quota.
pub struct Reservation {
    ledger: Arc<dyn UsageLedger>,
    ticket: ReservationTicket,
    status: UsageStatus,
    settled: bool,
}

impl Reservation {
    /// Status observed when the slot was taken.
    pub fn status(&self) -> UsageStatus {
        self.status
    }

    pub fn commit(mut self) -> RecordOutcome {
        self.settled = true;
        self.ledger.commit(&self.ticket)
    }

    /// Give the slot back now instead of at drop.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(
                identity = %self.ticket.identity,
                kind = %self.ticket.kind,
                attempt_id = %self.ticket.attempt,
                "Releasing uncommitted reservation"
            );
            self.ledger.release(&self.ticket);
        }
    }
}

impl std::fmt::Debug for Reservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reservation")
            .field("ticket", &self.ticket)
            .field("status", &self.status)
            .field("settled", &self.settled)
            .finish()
    }
}
