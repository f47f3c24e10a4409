//! Cell identity.
//!
//! A `CellKey` names one (participant, day) cell. Its string form
//! `<participantId>:<day>` is the key used by the wire payloads.

use crate::day::Day;
use crate::error::CoreError;
use crate::participant::ParticipantId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub participant: ParticipantId,
    pub day: Day,
}

impl CellKey {
    #[inline]
    pub fn new(participant: ParticipantId, day: Day) -> Self {
        Self { participant, day }
    }

    /// Build a key from the raw attributes of an interaction target.
    ///
    /// Returns `None` when either attribute is missing or unparsable; callers
    /// treat that as a no-op.
    pub fn from_attrs(participant: Option<&str>, day: Option<&str>) -> Option<Self> {
        let participant = ParticipantId::parse(participant?).ok()?;
        let day = Day::parse(day?).ok()?;
        Some(Self { participant, day })
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.participant, self.day)
    }
}

impl std::str::FromStr for CellKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (participant, day) = s
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidKey(s.to_string()))?;
        let participant =
            ParticipantId::parse(participant).map_err(|_| CoreError::InvalidKey(s.to_string()))?;
        let day = Day::parse(day).map_err(|_| CoreError::InvalidKey(s.to_string()))?;
        Ok(Self { participant, day })
    }
}
