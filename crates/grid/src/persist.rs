//! Outgoing writes and their completions.
//!
//! The editor never performs I/O. It queues `WriteRequest`s in an `Outbox`;
//! the host executes them against a persistence client and reports each
//! result back as a `Completion` carrying the same ticket. Completions may
//! arrive in any order.

use std::collections::VecDeque;

use duudl_core::{CellKey, ResponseValue};
use duudl_protocol::ResponseUpdate;

pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// Value cycled by a grid click. Rolled back on failure.
    Toggle,
    /// Value picked in the day panel. Failure ignored.
    Choice,
    /// Comment text. `flushed` is true when a session exit bypassed the debounce.
    CommentCommit { flushed: bool },
}

impl WriteKind {
    pub fn is_comment(self) -> bool {
        matches!(self, WriteKind::CommentCommit { .. })
    }
}

/// One self-service update: the cell's full value + comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub ticket: Ticket,
    pub key: CellKey,
    pub value: ResponseValue,
    pub comment: String,
    pub kind: WriteKind,
}

impl WriteRequest {
    pub fn to_update(&self) -> ResponseUpdate {
        ResponseUpdate::new(&self.key.day, self.value, Some(&self.comment))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<(), String>,
}

impl Completion {
    pub fn ok(ticket: Ticket) -> Self {
        Self { ticket, result: Ok(()) }
    }

    pub fn failed(ticket: Ticket, error: impl Into<String>) -> Self {
        Self { ticket, result: Err(error.into()) }
    }
}

/// FIFO of writes waiting for the host.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<WriteRequest>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: WriteRequest) {
        log::debug!("queue write #{} {} {:?}", request.ticket, request.key, request.kind);
        self.queue.push_back(request);
    }

    pub fn drain(&mut self) -> Vec<WriteRequest> {
        self.queue.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteRequest> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duudl_core::{Day, ParticipantId};

    #[test]
    fn test_request_to_update() {
        let key = CellKey::new(ParticipantId(3), Day::parse("2026-02-03").unwrap());
        let req = WriteRequest {
            ticket: 1,
            key,
            value: ResponseValue::Inconvenient,
            comment: "sent".into(),
            kind: WriteKind::Toggle,
        };
        let json = serde_json::to_value(req.to_update()).unwrap();
        assert_eq!(json, serde_json::json!({"day": "2026-02-03", "value": "inconvenient", "comment": "sent"}));
    }

    #[test]
    fn test_outbox_is_fifo() {
        let key = CellKey::new(ParticipantId(1), Day::parse("2026-02-03").unwrap());
        let mut outbox = Outbox::new();
        for ticket in 1..=3 {
            outbox.push(WriteRequest {
                ticket,
                key,
                value: ResponseValue::Yes,
                comment: String::new(),
                kind: WriteKind::Choice,
            });
        }
        let tickets: Vec<Ticket> = outbox.drain().iter().map(|r| r.ticket).collect();
        assert_eq!(tickets, vec![1, 2, 3]);
        assert!(outbox.is_empty());
    }
}
