//! Keyed debounce scheduler.
//!
//! One pending action per key. Scheduling again for the same key replaces the
//! pending action and restarts its quiet period; different keys never
//! coalesce. The scheduler does not run anything itself: the owner polls it
//! from its event loop and executes what comes back.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};

#[derive(Debug)]
struct Pending<A> {
    due: Instant,
    action: A,
}

#[derive(Debug)]
pub struct DebounceScheduler<K, A, C: Clock = SystemClock> {
    clock: C,
    pending: HashMap<K, Pending<A>>,
}

impl<K: Eq + Hash + Clone, A> DebounceScheduler<K, A, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K: Eq + Hash + Clone, A> Default for DebounceScheduler<K, A, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, A, C: Clock> DebounceScheduler<K, A, C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock, pending: HashMap::new() }
    }

    /// Schedule `action` to become due after `delay`.
    ///
    /// Returns the action it superseded, if one was still pending for `key`.
    pub fn schedule(&mut self, key: K, delay: Duration, action: A) -> Option<A> {
        let due = self.clock.now() + delay;
        self.pending
            .insert(key, Pending { due, action })
            .map(|old| old.action)
    }

    /// Drop the pending action for `key` without running it.
    pub fn cancel(&mut self, key: &K) -> Option<A> {
        self.pending.remove(key).map(|p| p.action)
    }

    /// Take the pending action for `key` now, regardless of its deadline.
    ///
    /// Same removal as `cancel`; the difference is the caller's intent to run
    /// what comes back.
    pub fn flush(&mut self, key: &K) -> Option<A> {
        self.pending.remove(key).map(|p| p.action)
    }

    /// Take every pending action, earliest deadline first.
    pub fn flush_all(&mut self) -> Vec<(K, A)> {
        let mut all: Vec<(K, Pending<A>)> = self.pending.drain().collect();
        all.sort_by_key(|(_, p)| p.due);
        all.into_iter().map(|(k, p)| (k, p.action)).collect()
    }

    /// Remove and return the actions whose quiet period has elapsed,
    /// earliest deadline first.
    pub fn poll_due(&mut self) -> Vec<(K, A)> {
        let now = self.clock.now();
        let due_keys: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(k, _)| k.clone())
            .collect();

        let mut due: Vec<(K, Pending<A>)> = due_keys
            .into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p)))
            .collect();
        due.sort_by_key(|(_, p)| p.due);
        due.into_iter().map(|(k, p)| (k, p.action)).collect()
    }

    /// Earliest pending deadline, for sizing the host's poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.due).min()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending(&self, key: &K) -> Option<&A> {
        self.pending.get(key).map(|p| &p.action)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
