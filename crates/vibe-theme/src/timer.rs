//! Virtual timer queue
//!
//! Page time only moves when the host advances it, which keeps flush
//! scheduling deterministic. Cancelling is synchronous: a cancelled timer
//! can never be returned as due.

use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Timers ordered by deadline, then by scheduling order
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    pending: BTreeSet<(Duration, TimerId)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }
    
    /// Schedule a timer `delay` from now
    pub fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now + delay, id));
        id
    }
    
    /// Cancel a timer; returns false if it was not pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let entry = self.pending.iter().find(|(_, t)| *t == id).copied();
        entry.is_some_and(|entry| self.pending.remove(&entry))
    }
    
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(_, t)| *t == id)
    }
    
    pub fn len(&self) -> usize {
        self.pending.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
    
    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first().map(|(deadline, _)| *deadline)
    }
    
    /// Pop the next timer due at or before `until`, moving time to its deadline
    pub fn next_due(&mut self, until: Duration) -> Option<TimerId> {
        let (deadline, id) = *self.pending.first()?;
        if deadline > until {
            return None;
        }
        self.pending.remove(&(deadline, id));
        self.now = self.now.max(deadline);
        Some(id)
    }
    
    /// Move time forward by `by`, returning every timer that came due
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        let until = self.now + by;
        let fired = std::iter::from_fn(|| self.next_due(until)).collect();
        self.now = until;
        fired
    }
    
    /// Move time to `until` without firing anything
    pub fn set_now(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
