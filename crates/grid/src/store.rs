//! In-memory mirror of the poll with optimistic local writes.
//!
//! Every mutation lands in `state` immediately and hands back a
//! `WriteRequest` for the host to send. The store remembers enough about each
//! in-flight ticket to undo a failed toggle.
//!
//! There is no per-cell version: a failed toggle restores its remembered
//! value even if a newer toggle on the same cell has happened since.

use std::collections::HashMap;

use duudl_core::{CellKey, Day, GridState, ParticipantId, ResponseValue};

use crate::persist::{Completion, Ticket, WriteKind, WriteRequest};

#[derive(Debug, Clone)]
struct InFlight {
    key: CellKey,
    kind: WriteKind,
    previous: ResponseValue,
}

/// What a completion did to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Write succeeded.
    Settled,
    /// Toggle failed; the pre-toggle value is back.
    RolledBack(CellKey),
    /// Non-toggle write failed; local state kept as is.
    Swallowed(CellKey),
    /// Ticket not known (already completed, or issued before a reset).
    Unknown,
}

#[derive(Debug)]
pub struct ResponseStateStore {
    state: GridState,
    viewer: ParticipantId,
    next_ticket: Ticket,
    in_flight: HashMap<Ticket, InFlight>,
}

impl ResponseStateStore {
    pub fn new(state: GridState, viewer: ParticipantId) -> Self {
        Self {
            state,
            viewer,
            next_ticket: 1,
            in_flight: HashMap::new(),
        }
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn viewer(&self) -> ParticipantId {
        self.viewer
    }

    /// Only the owner edits a cell, and only cells inside the grid.
    pub fn can_edit(&self, key: &CellKey) -> bool {
        key.participant == self.viewer && self.state.contains(key)
    }

    pub fn can_edit_cell(&self, participant: ParticipantId, day: &Day) -> bool {
        participant == self.viewer && self.state.has_day(day) && self.state.has_participant(participant)
    }

    /// Cycle the cell's value and return the write to send.
    pub fn toggle(&mut self, key: &CellKey) -> Option<WriteRequest> {
        if !self.can_edit(key) {
            log::debug!("toggle ignored for {}", key);
            return None;
        }
        let previous = self.state.value(key);
        self.write_value(key, previous.next())?;
        Some(self.issue(*key, WriteKind::Toggle, previous))
    }

    /// Pick a value directly. Picking the current value clears it.
    pub fn choose(&mut self, key: &CellKey, value: ResponseValue) -> Option<WriteRequest> {
        if !self.can_edit(key) {
            return None;
        }
        let previous = self.state.value(key);
        let next = if previous == value { ResponseValue::Unset } else { value };
        self.write_value(key, next)?;
        Some(self.issue(*key, WriteKind::Choice, previous))
    }

    /// Replace the cell's comment locally. Returns false when not allowed.
    pub fn set_comment(&mut self, key: &CellKey, comment: &str) -> bool {
        if !self.can_edit(key) {
            return false;
        }
        self.state.set_comment(*key, comment).is_ok()
    }

    /// The value + comment a commit for `key` would carry right now.
    pub fn snapshot(&self, key: &CellKey) -> (ResponseValue, String) {
        (self.state.value(key), self.state.comment(key).to_string())
    }

    /// Commit the cell's current value + comment.
    pub fn commit_request(&mut self, key: &CellKey, kind: WriteKind) -> Option<WriteRequest> {
        let (value, comment) = self.snapshot(key);
        self.commit_captured(key, value, comment, kind)
    }

    /// Commit a payload captured earlier (the debounce keeps the last
    /// keystroke's payload, not whatever the cell holds when it fires).
    pub fn commit_captured(
        &mut self,
        key: &CellKey,
        value: ResponseValue,
        comment: String,
        kind: WriteKind,
    ) -> Option<WriteRequest> {
        if !self.can_edit(key) {
            return None;
        }
        let ticket = self.next_ticket();
        self.in_flight.insert(ticket, InFlight { key: *key, kind, previous: value });
        Some(WriteRequest { ticket, key: *key, value, comment, kind })
    }

    /// Apply the result of a write.
    pub fn complete(&mut self, completion: &Completion) -> CompletionOutcome {
        let Some(flight) = self.in_flight.remove(&completion.ticket) else {
            return CompletionOutcome::Unknown;
        };
        let Err(error) = &completion.result else {
            return CompletionOutcome::Settled;
        };

        match flight.kind {
            WriteKind::Toggle => match self.state.set_value(flight.key, flight.previous) {
                Ok(_) => {
                    log::warn!("toggle of {} failed, rolled back to {}: {}", flight.key, flight.previous, error);
                    CompletionOutcome::RolledBack(flight.key)
                }
                Err(e) => {
                    log::warn!("toggle of {} failed and could not roll back: {}", flight.key, e);
                    CompletionOutcome::Unknown
                }
            },
            _ => {
                log::warn!("{:?} write for {} failed, keeping local state: {}", flight.kind, flight.key, error);
                CompletionOutcome::Swallowed(flight.key)
            }
        }
    }

    /// Swap in a freshly fetched state. Tickets still in flight stay known.
    pub fn replace_state(&mut self, state: GridState) {
        self.state = state;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn write_value(&mut self, key: &CellKey, value: ResponseValue) -> Option<ResponseValue> {
        match self.state.set_value(*key, value) {
            Ok(previous) => Some(previous),
            Err(e) => {
                log::debug!("write refused: {}", e);
                None
            }
        }
    }

    fn issue(&mut self, key: CellKey, kind: WriteKind, previous: ResponseValue) -> WriteRequest {
        let ticket = self.next_ticket();
        self.in_flight.insert(ticket, InFlight { key, kind, previous });
        let (value, comment) = self.snapshot(&key);
        WriteRequest { ticket, key, value, comment, kind }
    }

    fn next_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }
}
