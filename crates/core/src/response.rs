//! Tri-state availability answers.

use crate::error::CoreError;

/// A participant's answer for one day.
///
/// `Unset` is the absent case: it travels as `null` and is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ResponseValue {
    #[default]
    Unset,
    Yes,
    No,
    Inconvenient,
}

impl ResponseValue {
    /// Click order: unset → yes → no → inconvenient → unset.
    pub const CYCLE: [ResponseValue; 4] = [
        ResponseValue::Unset,
        ResponseValue::Yes,
        ResponseValue::No,
        ResponseValue::Inconvenient,
    ];

    /// Successor in the click cycle.
    pub fn next(self) -> Self {
        match self {
            ResponseValue::Unset => ResponseValue::Yes,
            ResponseValue::Yes => ResponseValue::No,
            ResponseValue::No => ResponseValue::Inconvenient,
            ResponseValue::Inconvenient => ResponseValue::Unset,
        }
    }

    pub fn is_set(self) -> bool {
        !matches!(self, ResponseValue::Unset)
    }

    /// Wire name, `None` for unset.
    pub fn as_wire(self) -> Option<&'static str> {
        match self {
            ResponseValue::Unset => None,
            ResponseValue::Yes => Some("yes"),
            ResponseValue::No => Some("no"),
            ResponseValue::Inconvenient => Some("inconvenient"),
        }
    }

    /// Parse the wire form. `None` means unset.
    pub fn from_wire(value: Option<&str>) -> Result<Self, CoreError> {
        match value {
            None => Ok(ResponseValue::Unset),
            Some("yes") => Ok(ResponseValue::Yes),
            Some("no") => Ok(ResponseValue::No),
            Some("inconvenient") => Ok(ResponseValue::Inconvenient),
            Some(other) => Err(CoreError::InvalidValue(other.to_string())),
        }
    }
}

impl std::fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire().unwrap_or("unset"))
    }
}

impl std::str::FromStr for ResponseValue {
    type Err = CoreError;

    /// Accepts the wire names plus `unset`/`none`/empty for clearing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "unset" | "none" | "null" => Ok(ResponseValue::Unset),
            other => ResponseValue::from_wire(Some(other)),
        }
    }
}
