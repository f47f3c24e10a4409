/// Error type for model construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Day string is not a strict `YYYY-MM-DD` date
    InvalidDay(String),
    /// Participant id is missing, non-numeric or not positive
    InvalidParticipant(String),
    /// Cell key is not of the form `<participantId>:<day>`
    InvalidKey(String),
    /// Response value is not one of the known wire names
    InvalidValue(String),
    /// Key refers to a participant or day that is not part of the grid
    UnknownCell(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidDay(s) => write!(f, "Invalid day {:?} (expected YYYY-MM-DD)", s),
            CoreError::InvalidParticipant(s) => write!(f, "Invalid participant id {:?}", s),
            CoreError::InvalidKey(s) => write!(f, "Invalid cell key {:?}", s),
            CoreError::InvalidValue(s) => write!(f, "Invalid response value {:?}", s),
            CoreError::UnknownCell(s) => write!(f, "Cell {} is not part of this grid", s),
        }
    }
}

impl std::error::Error for CoreError {}
