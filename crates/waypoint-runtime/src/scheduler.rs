#![forbid(unsafe_code)]

//! Deterministic timer queue.
//!
//! The scheduler stores messages rather than closures: the owner schedules a
//! value of its own message type and receives it back once the virtual clock
//! passes the deadline. Time only moves when the owner asks, which keeps
//! every delayed action in the tour reproducible under test.
//!
//! # Invariants
//!
//! 1. Due messages are returned in deadline order; ties fire in scheduling
//!    order.
//! 2. `now` never decreases.
//! 3. A cancelled timer is never returned.
//! 4. Cancelling a [`CancelToken`] removes every timer scheduled under it,
//!    including ones scheduled later with the same token.
//! 5. Bookkeeping is bounded by the number of live scopes: tokens are
//!    allocated in increasing order, so any issued token that is not live
//!    is cancelled.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Cancel an unknown or fired timer | Returns `false`, no effect |
//! | Schedule under a cancelled token | Dropped, returns the timer id anyway |
//! | Handler schedules a zero-delay timer | Fires within the same `pop_due` loop |

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Cancellation scope shared by a group of timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CancelToken(u64);

#[derive(Debug)]
struct Entry<M> {
    token: Option<CancelToken>,
    message: M,
}

/// Virtual-time timer queue.
#[derive(Debug)]
pub struct Scheduler<M> {
    now: Duration,
    next_seq: u64,
    next_token: u64,
    queue: BTreeMap<(Duration, u64), Entry<M>>,
    live: BTreeSet<CancelToken>,
}

impl<M> Default for Scheduler<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Scheduler<M> {
    /// Create an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            next_token: 0,
            queue: BTreeMap::new(),
            live: BTreeSet::new(),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of tokens issued and not yet cancelled.
    #[must_use]
    pub fn live_scopes(&self) -> usize {
        self.live.len()
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Allocate a fresh cancellation token.
    pub fn token(&mut self) -> CancelToken {
        let token = CancelToken(self.next_token);
        self.next_token += 1;
        self.live.insert(token);
        token
    }

    /// Whether `token` has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self, token: CancelToken) -> bool {
        token.0 < self.next_token && !self.live.contains(&token)
    }

    /// Schedule `message` to fire `delay` after now.
    pub fn schedule(&mut self, delay: Duration, message: M) -> TimerId {
        self.insert(delay, None, message)
    }

    /// Schedule `message` under `token`.
    pub fn schedule_scoped(&mut self, delay: Duration, token: CancelToken, message: M) -> TimerId {
        if self.is_cancelled(token) {
            let id = TimerId(self.next_seq);
            self.next_seq += 1;
            tracing::trace!(?token, "timer dropped: scope already cancelled");
            return id;
        }
        self.insert(delay, Some(token), message)
    }

    fn insert(&mut self, delay: Duration, token: Option<CancelToken>, message: M) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = self.now.saturating_add(delay);
        self.queue.insert((deadline, seq), Entry { token, message });
        TimerId(seq)
    }

    /// Cancel a single timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.queue.keys().find(|(_, seq)| *seq == id.0).copied();
        key.is_some_and(|key| self.queue.remove(&key).is_some())
    }

    /// Cancel every timer under `token`, now and in the future.
    ///
    /// Returns the number of pending timers removed.
    pub fn cancel_scope(&mut self, token: CancelToken) -> usize {
        self.live.remove(&token);
        let before = self.queue.len();
        self.queue.retain(|_, entry| entry.token != Some(token));
        let removed = before - self.queue.len();
        if removed > 0 {
            tracing::trace!(?token, removed, "cancelled scoped timers");
        }
        removed
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    /// Pop the earliest message due at or before `until`.
    ///
    /// The clock moves to the fired timer's deadline, so timers scheduled
    /// by the handler are measured from the moment this one fired.
    pub fn pop_due(&mut self, until: Duration) -> Option<M> {
        let (&(deadline, _), _) = self.queue.first_key_value()?;
        if deadline > until {
            return None;
        }
        let (_, entry) = self.queue.pop_first()?;
        self.now = self.now.max(deadline);
        Some(entry.message)
    }

    /// Move the clock to `until` without firing anything.
    ///
    /// Call after draining [`pop_due`](Self::pop_due).
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Advance by `dt` and collect every message that fell due.
    ///
    /// Suitable when handling a message never schedules new work; owners
    /// that reschedule from handlers should loop on `pop_due` instead.
    pub fn advance(&mut self, dt: Duration) -> Vec<M> {
        let until = self.now.saturating_add(dt);
        let mut due = Vec::new();
        while let Some(message) = self.pop_due(until) {
            due.push(message);
        }
        self.settle(until);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(300), "c");
        s.schedule(ms(100), "a");
        s.schedule(ms(200), "b");
        assert_eq!(s.advance(ms(1000)), vec!["a", "b", "c"]);
        assert_eq!(s.now(), ms(1000));
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), 1);
        s.schedule(ms(0), 2);
        s.schedule(ms(0), 3);
        assert_eq!(s.advance(ms(0)), vec![1, 2, 3]);
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut s = Scheduler::new();
        s.schedule(ms(100), ());
        assert!(s.advance(ms(99)).is_empty());
        assert_eq!(s.pending(), 1);
        assert_eq!(s.advance(ms(1)).len(), 1);
    }

    #[test]
    fn cancel_single_timer() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(10), 'a');
        s.schedule(ms(10), 'b');
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        assert_eq!(s.advance(ms(10)), vec!['b']);
    }

    #[test]
    fn cancel_scope_removes_current_and_future_timers() {
        let mut s = Scheduler::new();
        let step = s.token();
        let other = s.token();
        s.schedule_scoped(ms(10), step, 1);
        s.schedule_scoped(ms(10), other, 2);
        assert_eq!(s.cancel_scope(step), 1);
        assert!(s.is_cancelled(step));

        s.schedule_scoped(ms(5), step, 3);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.advance(ms(20)), vec![2]);
    }

    #[test]
    fn cancelled_scopes_are_not_retained() {
        let mut s = Scheduler::new();
        let mut previous = None;
        for i in 0..1000 {
            if let Some(token) = previous.take() {
                s.cancel_scope(token);
            }
            let token = s.token();
            s.schedule_scoped(ms(10), token, i);
            previous = Some(token);
        }
        assert_eq!(s.live_scopes(), 1);
        assert_eq!(s.pending(), 1);
        assert_eq!(s.advance(ms(10)), vec![999]);
    }

    #[test]
    fn old_tokens_stay_cancelled() {
        let mut s = Scheduler::new();
        let first = s.token();
        let second = s.token();
        s.cancel_scope(second);
        assert!(s.is_cancelled(second));
        assert!(!s.is_cancelled(first));

        s.cancel_scope(first);
        assert_eq!(s.live_scopes(), 0);
        s.schedule_scoped(ms(1), first, 'x');
        s.schedule_scoped(ms(1), second, 'y');
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn pop_due_moves_clock_to_deadline() {
        let mut s = Scheduler::new();
        s.schedule(ms(100), "first");
        assert_eq!(s.pop_due(ms(500)), Some("first"));
        assert_eq!(s.now(), ms(100));

        s.schedule(ms(50), "chained");
        assert_eq!(s.next_deadline(), Some(ms(150)));
        assert_eq!(s.pop_due(ms(500)), Some("chained"));
        assert_eq!(s.pop_due(ms(500)), None);
        s.settle(ms(500));
        assert_eq!(s.now(), ms(500));
    }

    #[test]
    fn settle_never_moves_backwards() {
        let mut s: Scheduler<()> = Scheduler::new();
        s.settle(ms(100));
        s.settle(ms(50));
        assert_eq!(s.now(), ms(100));
    }

    #[test]
    fn cancel_all_clears_queue() {
        let mut s = Scheduler::new();
        s.schedule(ms(1), 0);
        s.schedule(ms(2), 0);
        s.cancel_all();
        assert_eq!(s.pending(), 0);
        assert_eq!(s.next_deadline(), None);
    }
}
