use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Server-assigned participant id. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub i64);

impl ParticipantId {
    /// Parse a participant id attribute. Zero, negative and non-numeric ids are rejected.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().parse::<i64>() {
            Ok(n) if n > 0 => Ok(ParticipantId(n)),
            _ => Err(CoreError::InvalidParticipant(s.to_string())),
        }
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A row in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
}

impl Participant {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self { id: ParticipantId(id), display_name: display_name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_participant_id() {
        assert_eq!(ParticipantId::parse("7").unwrap(), ParticipantId(7));
        assert!(ParticipantId::parse("0").is_err());
        assert!(ParticipantId::parse("-3").is_err());
        assert!(ParticipantId::parse("abc").is_err());
        assert!(ParticipantId::parse("").is_err());
    }
}
