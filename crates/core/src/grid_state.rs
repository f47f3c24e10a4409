//! The aggregate grid: participants × days with values and comments.
//!
//! INVARIANT: every key stored in `values` or `comments` names a participant
//! in `participants` and a day in `days`. Absent keys read as `Unset` with an
//! empty comment; writing `Unset` or an empty comment removes the entry.

use std::collections::HashMap;

use crate::cell_key::CellKey;
use crate::day::Day;
use crate::error::CoreError;
use crate::participant::{Participant, ParticipantId};
use crate::response::ResponseValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridState {
    participants: Vec<Participant>,
    days: Vec<Day>,
    values: HashMap<CellKey, ResponseValue>,
    comments: HashMap<CellKey, String>,
}

impl GridState {
    /// Create an empty grid. Participant order is kept as given; days are
    /// sorted ascending and de-duplicated.
    pub fn new(participants: Vec<Participant>, mut days: Vec<Day>) -> Self {
        days.sort();
        days.dedup();
        Self {
            participants,
            days,
            values: HashMap::new(),
            comments: HashMap::new(),
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn has_participant(&self, id: ParticipantId) -> bool {
        self.participant(id).is_some()
    }

    pub fn has_day(&self, day: &Day) -> bool {
        self.days.binary_search(day).is_ok()
    }

    /// Whether the key addresses a cell inside this grid.
    pub fn contains(&self, key: &CellKey) -> bool {
        self.has_participant(key.participant) && self.has_day(&key.day)
    }

    pub fn value(&self, key: &CellKey) -> ResponseValue {
        self.values.get(key).copied().unwrap_or_default()
    }

    pub fn comment(&self, key: &CellKey) -> &str {
        self.comments.get(key).map(|s| s.as_str()).unwrap_or("")
    }

    /// Set a cell's value, returning the previous one.
    pub fn set_value(&mut self, key: CellKey, value: ResponseValue) -> Result<ResponseValue, CoreError> {
        self.check(&key)?;
        let previous = if value.is_set() {
            self.values.insert(key, value)
        } else {
            self.values.remove(&key)
        };
        Ok(previous.unwrap_or_default())
    }

    /// Set a cell's comment, returning the previous one.
    pub fn set_comment(&mut self, key: CellKey, comment: impl Into<String>) -> Result<String, CoreError> {
        self.check(&key)?;
        let comment = comment.into();
        let previous = if comment.is_empty() {
            self.comments.remove(&key)
        } else {
            self.comments.insert(key, comment)
        };
        Ok(previous.unwrap_or_default())
    }

    /// Number of cells with a stored value.
    pub fn answered_count(&self) -> usize {
        self.values.len()
    }

    /// Stored values, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = (&CellKey, &ResponseValue)> {
        self.values.iter()
    }

    /// Stored comments, in no particular order.
    pub fn comments(&self) -> impl Iterator<Item = (&CellKey, &str)> {
        self.comments.iter().map(|(k, v)| (k, v.as_str()))
    }

    fn check(&self, key: &CellKey) -> Result<(), CoreError> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(CoreError::UnknownCell(key.to_string()))
        }
    }
}
