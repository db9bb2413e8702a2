//! In-memory usage ledger.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Days, NaiveDate};

use quota_core::domain::{
    Allowance, AttemptId, FeatureKind, IdentityKey, LimitPolicy, RecordOutcome, UsageStatus,
};
use quota_core::ports::{Clock, ReservationTicket, ReserveOutcome, UsageLedger};

use super::LedgerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKey {
    day: NaiveDate,
    identity: IdentityKey,
    kind: FeatureKind,
}

impl EntryKey {
    fn new(day: NaiveDate, identity: &IdentityKey, kind: &FeatureKind) -> Self {
        Self {
            day,
            identity: identity.clone(),
            kind: kind.clone(),
        }
    }
}

/// Invariant: `used == attempt_ids.len()`.
#[derive(Debug, Default)]
struct LedgerEntry {
    used: u64,
    attempt_ids: HashSet<AttemptId>,
    pending: HashSet<AttemptId>,
}

impl LedgerEntry {
    fn accept(&mut self, attempt: &AttemptId) -> bool {
        let was_new = self.attempt_ids.insert(attempt.clone());
        if was_new {
            self.used += 1;
        }
        was_new
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: HashMap<EntryKey, LedgerEntry>,
    swept_on: Option<NaiveDate>,
    unknown_kinds: HashSet<FeatureKind>,
}

/// In-memory usage ledger guarded by a single mutex.
///
/// State lives for the process lifetime only; a restart resets every count.
/// Entries for past days are dropped once they fall out of the retention
/// window, either lazily on the first access of a new day or via
/// [`UsageLedger::sweep`].
pub struct InMemoryUsageLedger {
    state: Mutex<LedgerState>,
    policy: LimitPolicy,
    retention_days: u32,
    clock: Arc<dyn Clock>,
}

impl InMemoryUsageLedger {
    pub fn new(config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            policy: config.policy,
            retention_days: config.retention_days,
            clock,
        }
    }

    /// Number of live entries across all days.
    pub fn entry_count(&self) -> usize {
        self.lock().entries.len()
    }

    // Every critical section leaves the map consistent, so a poisoned lock
    // is safe to keep using.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current UTC day; sweeps first when the day changed since the last sweep.
    fn today(&self, state: &mut LedgerState) -> NaiveDate {
        let today = self.clock.today();
        if state.swept_on != Some(today) {
            self.sweep_locked(state, today);
        }
        today
    }

    fn sweep_locked(&self, state: &mut LedgerState, today: NaiveDate) -> usize {
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(self.retention_days)))
            .unwrap_or(NaiveDate::MIN);

        let before = state.entries.len();
        state
            .entries
            .retain(|key, entry| key.day >= cutoff || !entry.pending.is_empty());
        state.swept_on = Some(today);

        let removed = before - state.entries.len();
        if removed > 0 {
            tracing::info!(removed, cutoff = %cutoff, "Swept expired ledger entries");
        }
        removed
    }

    fn limit_for(&self, state: &mut LedgerState, kind: &FeatureKind) -> Allowance {
        if let Some(limit) = self.policy.configured(kind) {
            return limit;
        }

        let default_limit = self.policy.default_limit();
        if state.unknown_kinds.insert(kind.clone()) {
            tracing::warn!(
                kind = %kind,
                default_limit = %default_limit,
                "Unconfigured feature kind, applying default limit"
            );
        } else {
            tracing::debug!(kind = %kind, "Unconfigured feature kind, applying default limit");
        }
        default_limit
    }
}

impl UsageLedger for InMemoryUsageLedger {
    fn usage(&self, identity: &IdentityKey, kind: &FeatureKind) -> UsageStatus {
        let mut state = self.lock();
        let today = self.today(&mut state);
        let limit = self.limit_for(&mut state, kind);

        let entry = state
            .entries
            .entry(EntryKey::new(today, identity, kind))
            .or_default();

        UsageStatus::evaluate(entry.used, limit)
    }

    fn record_attempt(
        &self,
        identity: &IdentityKey,
        attempt: &AttemptId,
        kind: &FeatureKind,
    ) -> RecordOutcome {
        let mut state = self.lock();
        let today = self.today(&mut state);
        let limit = self.limit_for(&mut state, kind);

        let entry = state
            .entries
            .entry(EntryKey::new(today, identity, kind))
            .or_default();
        let was_new = entry.accept(attempt);
        let status = UsageStatus::evaluate(entry.used, limit);

        if was_new {
            tracing::info!(
                identity = %identity,
                kind = %kind,
                attempt_id = %attempt,
                used = status.used,
                limit = %limit,
                "Attempt recorded"
            );
        } else {
            tracing::debug!(
                identity = %identity,
                kind = %kind,
                attempt_id = %attempt,
                used = status.used,
                "Attempt already recorded"
            );
        }

        RecordOutcome { status, was_new }
    }

    fn reserve(
        &self,
        identity: &IdentityKey,
        attempt: &AttemptId,
        kind: &FeatureKind,
    ) -> ReserveOutcome {
        let mut state = self.lock();
        let today = self.today(&mut state);
        let limit = self.limit_for(&mut state, kind);

        let entry = state
            .entries
            .entry(EntryKey::new(today, identity, kind))
            .or_default();
        let status = UsageStatus::evaluate(entry.used, limit);

        if entry.attempt_ids.contains(attempt) {
            return ReserveOutcome::Replayed(status);
        }
        if entry.pending.contains(attempt) {
            return ReserveOutcome::InFlight(status);
        }
        if let Allowance::Limited(max) = limit {
            let held = entry.used + entry.pending.len() as u64;
            if held >= max {
                tracing::info!(
                    identity = %identity,
                    kind = %kind,
                    used = entry.used,
                    pending = entry.pending.len(),
                    limit = max,
                    "Reservation refused, daily limit reached"
                );
                return ReserveOutcome::LimitReached(UsageStatus {
                    remaining: Allowance::Limited(0),
                    blocked: true,
                    ..status
                });
            }
        }

        entry.pending.insert(attempt.clone());
        ReserveOutcome::Reserved(
            ReservationTicket {
                day: today,
                identity: identity.clone(),
                kind: kind.clone(),
                attempt: attempt.clone(),
            },
            status,
        )
    }

    fn commit(&self, ticket: &ReservationTicket) -> RecordOutcome {
        let mut state = self.lock();
        let limit = self.limit_for(&mut state, &ticket.kind);

        let entry = state
            .entries
            .entry(EntryKey::new(ticket.day, &ticket.identity, &ticket.kind))
            .or_default();
        entry.pending.remove(&ticket.attempt);
        let was_new = entry.accept(&ticket.attempt);
        let status = UsageStatus::evaluate(entry.used, limit);

        tracing::info!(
            identity = %ticket.identity,
            kind = %ticket.kind,
            attempt_id = %ticket.attempt,
            day = %ticket.day,
            used = status.used,
            was_new,
            "Reservation committed"
        );

        RecordOutcome { status, was_new }
    }

    fn release(&self, ticket: &ReservationTicket) {
        let mut state = self.lock();
        let key = EntryKey::new(ticket.day, &ticket.identity, &ticket.kind);
        if let Some(entry) = state.entries.get_mut(&key) {
            entry.pending.remove(&ticket.attempt);
        }
    }

    fn sweep(&self) -> usize {
        let mut state = self.lock();
        let today = self.clock.today();
        self.sweep_locked(&mut state, today)
    }
}
